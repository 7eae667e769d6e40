use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use voting_rules::*;

use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::election::config_reader::*;

pub mod config_reader;
mod io_csv;

#[derive(Debug, Snafu)]
pub enum TallyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing the summary"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Missing parent directory"))]
    MissingParentDir {},
    #[snafu(display("Voting error: {source}"))]
    Voting { source: RuleError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TallyResult<T> = Result<T, TallyError>;

/// A ballot, as read from a file, before it is parsed into the ballot of a profile.
#[derive(PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub weight: f64,
    pub ballot: String,
    pub voter: Option<String>,
}

fn read_profile(config: &ElectionConfig, root_p: &Path) -> TallyResult<Profile> {
    let mut builder = match &config.candidates {
        Some(cands) => builder::Builder::new()
            .candidates(cands)
            .context(VotingSnafu {})?,
        None => builder::Builder::new(),
    };

    for entry in config.ballots.iter() {
        let item = entry.to_item(builder.declared_candidates())?;
        builder.add_item(item).context(VotingSnafu {})?;
    }

    if let Some(lpath) = &config.ballots_file {
        let p = root_p.join(lpath);
        let p2 = p.as_path().display().to_string();
        info!("Attempting to read ballots file {:?}", p2);
        for pb in io_csv::read_csv_ballots(&p2)? {
            let order = parse_weak_order(&pb.ballot).context(VotingSnafu {})?;
            let ballot = BallotOrder::new(order, builder.declared_candidates().cloned())
                .context(VotingSnafu {})?;
            builder
                .add_item(ProfileItem {
                    ballot: Ballot::Order(ballot),
                    weight: pb.weight,
                    voter: pb.voter,
                })
                .context(VotingSnafu {})?;
        }
    }

    let profile = builder.build().context(VotingSnafu {})?;
    if profile.is_empty() {
        whatever!("No ballots found: use the ballots or ballotsFile options");
    }
    debug!("profile: {:?}", profile);
    Ok(profile)
}

fn scores_to_json(scores: &Scores) -> JSValue {
    let mut res: JSMap<String, JSValue> = JSMap::new();
    for (name, score) in scores.iter() {
        res.insert(name.clone(), json!(score));
    }
    JSValue::Object(res)
}

/// The outcome of the rule.
///
/// Composite rules have no scores. When the tie-break cannot resolve a tie, the strict order
/// and the winner are null.
fn build_summary_js(rule: &dyn Rule) -> TallyResult<JSValue> {
    let candidates: Vec<&Candidate> = rule.candidates().context(VotingSnafu {})?.iter().collect();
    let scores = match rule.scores() {
        Ok(scores) => scores_to_json(scores),
        Err(RuleError::Configuration { reason }) => {
            debug!("build_summary_js: no scores: {}", reason);
            JSValue::Null
        }
        Err(e) => return Err(e).context(VotingSnafu {}),
    };
    let order = format_weak_order(rule.order().context(VotingSnafu {})?);
    let cowinners: Vec<&Candidate> = rule.cowinners().context(VotingSnafu {})?.iter().collect();
    let (strict_order, winner) = match rule.strict_order() {
        Ok(strict) => (json!(strict), json!(strict.first())),
        Err(RuleError::AmbiguousTie { candidates }) => {
            warn!(
                "The tie between {:?} is not resolved, use a tieBreak to break it",
                candidates
            );
            (JSValue::Null, JSValue::Null)
        }
        Err(e) => return Err(e).context(VotingSnafu {}),
    };
    Ok(json!({
        "rule": rule.name(),
        "candidates": candidates,
        "scores": scores,
        "order": order,
        "strictOrder": strict_order,
        "winner": winner,
        "cowinners": cowinners,
    }))
}

/// Reads an election and evaluates its rule.
pub fn compute_summary(config_path: &str) -> TallyResult<JSValue> {
    let config_p = Path::new(config_path);
    let config_str = fs::read_to_string(config_path).context(OpeningFileSnafu {
        path: config_path.to_string(),
    })?;
    let config: ElectionConfig = serde_json::from_str(&config_str).context(ParsingJsonSnafu {
        path: config_path.to_string(),
    })?;
    info!("config: {:?}", config);

    // The rule is validated before the ballots are read.
    let mut rule = config.rule.build()?;

    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
    let profile = read_profile(&config, root_p)?;

    let candidates: Option<CandidateSet> = config
        .candidates
        .as_ref()
        .map(|cands| cands.iter().cloned().collect());
    rule.load(std::sync::Arc::new(profile), candidates)
        .context(VotingSnafu {})?;

    let summary = build_summary_js(rule.as_ref())?;
    info!("summary: {:?}", summary);
    Ok(summary)
}

pub fn run_election(
    config_path: &str,
    out_path: Option<String>,
    check_summary_path: Option<String>,
) -> TallyResult<()> {
    let result_js = compute_summary(config_path)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(WritingJsonSnafu {})?;

    match out_path.as_deref() {
        None | Some("stdout") | Some("") => println!("{}", pretty_js_stats),
        Some(p) => {
            info!("Writing summary to {:?}", p);
            fs::write(p, &pretty_js_stats).context(OpeningFileSnafu {
                path: p.to_string(),
            })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(&summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(WritingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_election(name: &str, config: &str, ballots_csv: Option<&str>) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tally-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        if let Some(content) = ballots_csv {
            fs::write(dir.join("ballots.csv"), content).unwrap();
        }
        let p = dir.join("config.json");
        fs::write(&p, config).unwrap();
        p
    }

    #[test]
    fn instant_runoff_from_json_ballots() {
        let p = write_election(
            "irv",
            r#"{
              "ballots": [
                {"ballot": "a > b > c", "weight": 2},
                {"ballot": "b > a > c", "weight": 3},
                {"ballot": "c > a > b", "weight": 4}
              ],
              "rule": {
                "type": "iteratedElimination",
                "baseRule": {"type": "plurality"},
                "elimination": {"type": "last", "k": 1},
                "tieBreak": {"type": "ascending"}
              }
            }"#,
            None,
        );
        let summary = compute_summary(p.to_str().unwrap()).unwrap();
        assert_eq!(summary["winner"], json!("b"));
        assert_eq!(summary["order"], json!("b > c > a"));
        assert_eq!(summary["scores"], JSValue::Null);
        assert_eq!(summary["rule"], json!("iterated_elimination"));
    }

    #[test]
    fn borda_from_csv_ballots() {
        let p = write_election(
            "borda",
            r#"{
              "candidates": ["a", "b", "c"],
              "ballotsFile": "ballots.csv",
              "rule": {"type": "borda"}
            }"#,
            Some("weight,ballot,voter\n4,a > b > c,v1\n3,b > c > a,\n"),
        );
        let summary = compute_summary(p.to_str().unwrap()).unwrap();
        assert_eq!(summary["scores"]["a"], json!(8.0));
        assert_eq!(summary["scores"]["b"], json!(10.0));
        assert_eq!(summary["scores"]["c"], json!(3.0));
        assert_eq!(summary["winner"], json!("b"));
        assert_eq!(summary["strictOrder"], json!(["b", "a", "c"]));
    }

    #[test]
    fn unresolved_tie_has_no_winner() {
        let p = write_election(
            "tie",
            r#"{
              "ballots": [{"ballot": "a > b"}, {"ballot": "b > a"}],
              "rule": {"type": "plurality"}
            }"#,
            None,
        );
        let summary = compute_summary(p.to_str().unwrap()).unwrap();
        assert_eq!(summary["winner"], JSValue::Null);
        assert_eq!(summary["cowinners"], json!(["a", "b"]));
        assert_eq!(summary["order"], json!("a ~ b"));
    }

    #[test]
    fn no_ballots_is_an_error() {
        let p = write_election("empty", r#"{"rule": {"type": "borda"}}"#, None);
        let res = compute_summary(p.to_str().unwrap());
        assert!(matches!(res, Err(TallyError::Whatever { .. })));
    }

    #[test]
    fn undeclared_candidate_is_an_error() {
        let p = write_election(
            "undeclared",
            r#"{
              "candidates": ["a", "b"],
              "ballots": [{"ballot": "a > z"}],
              "rule": {"type": "borda"}
            }"#,
            None,
        );
        let res = compute_summary(p.to_str().unwrap());
        assert!(matches!(
            res,
            Err(TallyError::Voting {
                source: RuleError::Validation { .. }
            })
        ));
    }

    #[test]
    fn reference_summary_mismatch_is_reported() {
        let p = write_election(
            "reference",
            r#"{
              "ballots": [{"ballot": "a > b"}],
              "rule": {"type": "plurality"}
            }"#,
            None,
        );
        let dir = p.parent().unwrap();
        let out = dir.join("out.json");
        let reference = dir.join("reference.json");
        fs::write(&reference, r#"{"winner": "b"}"#).unwrap();
        let res = run_election(
            p.to_str().unwrap(),
            Some(out.display().to_string()),
            Some(reference.display().to_string()),
        );
        assert!(res.is_err());
        let written = read_summary(out.to_str().unwrap()).unwrap();
        assert_eq!(written["winner"], json!("a"));
    }
}
