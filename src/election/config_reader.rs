use crate::election::*;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The tie-break of a rule.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PriorityConfig {
    Unambiguous,
    Ascending,
    Descending,
    Random { seed: u32 },
    Given { order: Vec<String> },
}

impl From<&PriorityConfig> for Priority {
    fn from(config: &PriorityConfig) -> Priority {
        match config {
            PriorityConfig::Unambiguous => Priority::Unambiguous,
            PriorityConfig::Ascending => Priority::Ascending,
            PriorityConfig::Descending => Priority::Descending,
            PriorityConfig::Random { seed } => Priority::Random(*seed),
            PriorityConfig::Given { order } => Priority::Given(order.clone()),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EliminationConfig {
    Last { k: i64 },
    BelowAverage,
}

impl EliminationConfig {
    pub fn build(&self) -> TallyResult<Elimination> {
        match self {
            EliminationConfig::Last { k: 0 } => {
                whatever!("last elimination with k = 0 eliminates nobody")
            }
            EliminationConfig::Last { k } => Ok(Elimination::last(*k)),
            EliminationConfig::BelowAverage => Ok(Elimination::below_average()),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RuleKind {
    Plurality,
    Veto,
    Borda,
    Approval,
    RangeVoting {
        low: i64,
        high: i64,
    },
    Maximin,
    IteratedElimination {
        #[serde(rename = "baseRule")]
        base_rule: Box<RuleConfig>,
        elimination: EliminationConfig,
        #[serde(rename = "propagateTieBreak")]
        propagate_tie_break: Option<bool>,
    },
    /// A single rule is repeated in every round, a single elimination after every round but the
    /// last.
    SequentialElimination {
        rules: Vec<RuleConfig>,
        eliminations: Vec<EliminationConfig>,
        #[serde(rename = "propagateTieBreak")]
        propagate_tie_break: Option<bool>,
    },
    TwoRound {
        #[serde(rename = "firstRule")]
        first_rule: Option<Box<RuleConfig>>,
        #[serde(rename = "secondRule")]
        second_rule: Option<Box<RuleConfig>>,
        elimination: Option<EliminationConfig>,
        #[serde(rename = "propagateTieBreak")]
        propagate_tie_break: Option<bool>,
    },
    SequentialTieBreak {
        rules: Vec<RuleConfig>,
    },
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(flatten)]
    pub kind: RuleKind,
    #[serde(rename = "tieBreak")]
    pub tie_break: Option<PriorityConfig>,
}

impl RuleConfig {
    /// Checks the configuration and builds the rule it describes.
    pub fn build(&self) -> TallyResult<Box<dyn Rule>> {
        let mut rule: Box<dyn Rule> = match &self.kind {
            RuleKind::Plurality => Box::new(RuleScoreNum::plurality()),
            RuleKind::Veto => Box::new(RuleScoreNum::veto()),
            RuleKind::Borda => Box::new(RuleScoreNum::borda()),
            RuleKind::Approval => Box::new(RuleScoreNum::approval()),
            RuleKind::RangeVoting { low, high } => {
                if low >= high {
                    whatever!("range voting needs low < high, got {} and {}", low, high);
                }
                Box::new(RuleScoreNum::range_voting(*low, *high))
            }
            RuleKind::Maximin => Box::new(RuleMaximin::new()),
            RuleKind::IteratedElimination {
                base_rule,
                elimination,
                propagate_tie_break,
            } => Box::new(
                RuleIteratedElimination::new(base_rule.build()?, elimination.build()?)
                    .with_propagate_tie_break(propagate_tie_break.unwrap_or(true)),
            ),
            RuleKind::SequentialElimination {
                rules,
                eliminations,
                propagate_tie_break,
            } => {
                let built_rules = build_all(rules)?;
                let built_elims = eliminations
                    .iter()
                    .map(|e| e.build())
                    .collect::<TallyResult<Vec<Elimination>>>()?;
                let rule = match (built_rules.len(), built_elims.len()) {
                    (0, _) => whatever!("sequential elimination needs at least one rule"),
                    (1, n) if n >= 1 => {
                        let mut built_rules = built_rules;
                        let template = built_rules.remove(0);
                        RuleSequentialElimination::with_repeated_rule(template, built_elims)
                    }
                    (n, 1) if n > 2 => {
                        let mut built_elims = built_elims;
                        let template = built_elims.remove(0);
                        RuleSequentialElimination::with_repeated_elimination(built_rules, template)
                    }
                    (n, m) if n == m + 1 => RuleSequentialElimination::new(built_rules, built_elims),
                    (n, m) => whatever!(
                        "sequential elimination with {} rules needs {} eliminations, got {}",
                        n,
                        n - 1,
                        m
                    ),
                };
                Box::new(rule.with_propagate_tie_break(propagate_tie_break.unwrap_or(true)))
            }
            RuleKind::TwoRound {
                first_rule,
                second_rule,
                elimination,
                propagate_tie_break,
            } => {
                let first = match first_rule {
                    Some(r) => r.build()?,
                    None => Box::new(RuleScoreNum::plurality()),
                };
                let second = match second_rule {
                    Some(r) => r.build()?,
                    None => Box::new(RuleScoreNum::plurality()),
                };
                let elimination = match elimination {
                    Some(e) => e.build()?,
                    None => Elimination::last(-2),
                };
                Box::new(
                    RuleTwoRound::with_rounds(first, second, elimination)
                        .with_propagate_tie_break(propagate_tie_break.unwrap_or(true)),
                )
            }
            RuleKind::SequentialTieBreak { rules } => {
                if rules.is_empty() {
                    whatever!("sequential tie-break needs at least one rule");
                }
                Box::new(RuleSequentialTieBreak::new(build_all(rules)?))
            }
        };
        if let Some(tb) = &self.tie_break {
            rule.set_tie_break(tb.into());
        }
        debug!("built rule {:?}", rule);
        Ok(rule)
    }
}

fn build_all(configs: &[RuleConfig]) -> TallyResult<Vec<Box<dyn Rule>>> {
    configs.iter().map(|c| c.build()).collect()
}

/// The content of a ballot in the election file: a weak order or grades.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BallotConfig {
    Order(String),
    Levels(BTreeMap<String, f64>),
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BallotEntry {
    pub ballot: BallotConfig,
    pub weight: Option<f64>,
    pub voter: Option<String>,
}

impl BallotEntry {
    pub fn to_item(&self, candidates: Option<&CandidateSet>) -> TallyResult<ProfileItem> {
        let ballot = match &self.ballot {
            BallotConfig::Order(s) => {
                let order = parse_weak_order(s).context(VotingSnafu {})?;
                Ballot::Order(BallotOrder::new(order, candidates.cloned()).context(VotingSnafu {})?)
            }
            BallotConfig::Levels(grades) => Ballot::Levels(grades.clone()),
        };
        Ok(ProfileItem {
            ballot,
            weight: self.weight.unwrap_or(1.0),
            voter: self.voter.clone(),
        })
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    pub candidates: Option<Vec<String>>,
    #[serde(default)]
    pub ballots: Vec<BallotEntry>,
    #[serde(rename = "ballotsFile")]
    pub ballots_file: Option<String>,
    pub rule: RuleConfig,
}

pub fn read_summary(path: &str) -> TallyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}
