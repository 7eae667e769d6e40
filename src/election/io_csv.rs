// Primitives for reading CSV files.

use std::io;

use serde::Deserialize;

use crate::election::*;

#[derive(Debug, Deserialize)]
struct CsvRow {
    weight: Option<f64>,
    ballot: String,
    voter: Option<String>,
}

/// Reads the ballots of a CSV file with a header row and the columns `weight`, `ballot` and
/// optionally `voter`. A missing weight counts as 1.
pub fn read_csv_ballots(path: &str) -> TallyResult<Vec<ParsedBallot>> {
    let rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    read_records(rdr)
}

fn read_records<R: io::Read>(mut rdr: csv::Reader<R>) -> TallyResult<Vec<ParsedBallot>> {
    let mut res: Vec<ParsedBallot> = Vec::new();
    for (idx, line_r) in rdr.deserialize::<CsvRow>().enumerate() {
        // The header is the first line.
        let lineno = idx + 2;
        let row = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_ballots: lineno: {:?} row: {:?}", lineno, row);
        res.push(ParsedBallot {
            weight: row.weight.unwrap_or(1.0),
            ballot: row.ballot,
            voter: row.voter.filter(|v| !v.is_empty()),
        });
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(content: &str) -> TallyResult<Vec<ParsedBallot>> {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        read_records(rdr)
    }

    #[test]
    fn weights_and_voters() {
        let res = read_str("weight,ballot,voter\n4,a > b ~ c,v1\n,b > a,\n2.5, c ,v3\n").unwrap();
        assert_eq!(
            res,
            vec![
                ParsedBallot {
                    weight: 4.0,
                    ballot: "a > b ~ c".to_string(),
                    voter: Some("v1".to_string()),
                },
                ParsedBallot {
                    weight: 1.0,
                    ballot: "b > a".to_string(),
                    voter: None,
                },
                ParsedBallot {
                    weight: 2.5,
                    ballot: "c".to_string(),
                    voter: Some("v3".to_string()),
                },
            ]
        );
    }

    #[test]
    fn voter_column_is_optional() {
        let res = read_str("ballot,weight\na > b,3\n").unwrap();
        assert_eq!(res[0].weight, 3.0);
        assert_eq!(res[0].voter, None);
    }

    #[test]
    fn bad_weight_reports_the_line() {
        let res = read_str("weight,ballot\n1,a > b\nmany,b > a\n");
        assert!(matches!(res, Err(TallyError::CsvLineParse { lineno: 3, .. })));
    }

    #[test]
    fn missing_file() {
        let res = read_csv_ballots("/nonexistent/ballots.csv");
        assert!(matches!(res, Err(TallyError::CsvOpen { .. })));
    }
}
