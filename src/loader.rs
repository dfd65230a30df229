use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Attempt, Catalog, ProblemSet};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct LogRow {
    date: String,
    name: String,
    sequence: String,
    #[serde(default, deserialize_with = "outcome_count")]
    correct: Option<u32>,
    #[serde(default, deserialize_with = "outcome_count")]
    incorrect: Option<u32>,
}

// Blank cells are None. Whole-number floats such as `1.0` are accepted, since
// spreadsheet exports write integer columns with blanks that way.
fn outcome_count<'de, D>(d: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(d)? {
        Some(raw) => parse_count(&raw).map_err(de::Error::custom),
        None => Ok(None),
    }
}

fn parse_count(raw: &str) -> std::result::Result<Option<u32>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(n) = raw.parse::<u32>() {
        return Ok(Some(n));
    }
    match raw.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&v) => {
            Ok(Some(v as u32))
        }
        _ => Err(format!("invalid outcome count '{raw}'")),
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path = path.as_ref();
    let catalog = read_catalog(BufReader::new(open(path)?), path)?;
    info!(path = %path.display(), sets = catalog.len(), "loaded catalog");
    Ok(catalog)
}

pub fn load_log<P: AsRef<Path>>(path: P) -> Result<Vec<Attempt>> {
    let path = path.as_ref();
    let attempts = read_log(open(path)?, path)?;
    info!(path = %path.display(), rows = attempts.len(), "loaded exercise log");
    Ok(attempts)
}

/// Parses a JSON array of `{name, amount}` records.
pub fn read_catalog<R: Read>(reader: R, origin: &Path) -> Result<Catalog> {
    let sets: Vec<ProblemSet> =
        serde_json::from_reader(reader).map_err(|source| Error::Catalog {
            path: origin.to_path_buf(),
            source,
        })?;
    Ok(Catalog::new(sets))
}

/// Parses a headed CSV log. Columns are matched by header name, extra
/// columns are ignored and empty outcome cells count as 0.
pub fn read_log<R: Read>(reader: R, origin: &Path) -> Result<Vec<Attempt>> {
    let csv_err = |source| Error::Log {
        path: origin.to_path_buf(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers().map_err(csv_err)?.clone();

    let mut attempts = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: LogRow = record.deserialize(Some(&headers)).map_err(csv_err)?;

        let date = parse_date(&row.date).ok_or_else(|| Error::InvalidDate {
            line,
            value: row.date.clone(),
        })?;

        attempts.push(Attempt::new(
            date,
            row.name,
            row.sequence,
            row.correct.unwrap_or(0),
            row.incorrect.unwrap_or(0),
        ));
    }

    debug!(rows = attempts.len(), "parsed exercise log");
    Ok(attempts)
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn origin() -> PathBuf {
        PathBuf::from("test-input")
    }

    mod catalog_tests {
        use super::*;

        #[test]
        fn reads_sets_in_order() {
            let json = r#"[{"name":"Algebra","amount":120},{"name":"Geometry","amount":80}]"#;
            let catalog = read_catalog(json.as_bytes(), &origin()).unwrap();
            assert_eq!(
                catalog.names().collect::<Vec<_>>(),
                vec!["Algebra", "Geometry"]
            );
            assert_eq!(catalog.amount("Geometry"), Some(80));
        }

        #[test]
        fn null_amount_loads_as_no_target() {
            let json = r#"[{"name":"A","amount":null},{"name":"B"}]"#;
            let catalog = read_catalog(json.as_bytes(), &origin()).unwrap();
            assert_eq!(catalog.amount("A"), Some(0));
            assert_eq!(catalog.amount("B"), Some(0));
        }

        #[test]
        fn extra_fields_are_ignored() {
            let json = r#"[{"name":"A","amount":3,"publisher":"x"}]"#;
            let catalog = read_catalog(json.as_bytes(), &origin()).unwrap();
            assert_eq!(catalog.amount("A"), Some(3));
        }

        #[test]
        fn missing_name_is_an_error() {
            let json = r#"[{"amount":3}]"#;
            let err = read_catalog(json.as_bytes(), &origin()).unwrap_err();
            assert!(matches!(err, Error::Catalog { .. }));
        }

        #[test]
        fn missing_file_is_an_io_error() {
            let dir = tempfile::tempdir().unwrap();
            let err = load_catalog(dir.path().join("info.json")).unwrap_err();
            assert!(matches!(err, Error::Io { .. }));
        }

        #[test]
        fn loads_from_disk() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(file, r#"[{{"name":"A","amount":4}}]"#).unwrap();
            let catalog = load_catalog(file.path()).unwrap();
            assert_eq!(catalog.amount("A"), Some(4));
        }
    }

    mod log_tests {
        use super::*;

        #[test]
        fn reads_rows_with_parsed_dates() {
            let csv = "date,name,sequence,correct,incorrect\n\
                       2024-01-01,A,1,1,0\n\
                       2024-01-02,B,7,0,1\n";
            let attempts = read_log(csv.as_bytes(), &origin()).unwrap();
            assert_eq!(attempts.len(), 2);
            assert_eq!(
                attempts[1],
                Attempt::new(parse_date("2024-01-02").unwrap(), "B", "7", 0, 1)
            );
        }

        #[test]
        fn columns_match_by_header_name() {
            let csv = "name,incorrect,date,correct,sequence,memo\n\
                       A,2,2024-03-05,1,q12,hard\n";
            let attempts = read_log(csv.as_bytes(), &origin()).unwrap();
            assert_eq!(attempts[0].sequence, "q12");
            assert_eq!(attempts[0].correct, 1);
            assert_eq!(attempts[0].incorrect, 2);
        }

        #[test]
        fn empty_outcomes_read_as_zero() {
            let csv = "date,name,sequence,correct,incorrect\n2024-01-01,A,1,,\n";
            let attempts = read_log(csv.as_bytes(), &origin()).unwrap();
            assert_eq!(attempts[0].correct, 0);
            assert_eq!(attempts[0].incorrect, 0);
        }

        #[test]
        fn whitespace_is_trimmed() {
            let csv = "date,name,sequence,correct,incorrect\n 2024-01-01 , A , 1 ,1,0\n";
            let attempts = read_log(csv.as_bytes(), &origin()).unwrap();
            assert_eq!(attempts[0].name, "A");
            assert_eq!(attempts[0].sequence, "1");
        }

        #[test]
        fn bad_date_reports_line() {
            let csv = "date,name,sequence,correct,incorrect\n\
                       2024-01-01,A,1,1,0\n\
                       01/02/2024,A,2,1,0\n";
            let err = read_log(csv.as_bytes(), &origin()).unwrap_err();
            match err {
                Error::InvalidDate { line, value } => {
                    assert_eq!(line, 3);
                    assert_eq!(value, "01/02/2024");
                }
                other => panic!("Expected InvalidDate, got {other:?}"),
            }
        }

        #[test]
        fn whole_number_floats_are_counts() {
            let csv = "date,name,sequence,correct,incorrect\n2024-01-01,A,1,1.0,0.0\n";
            let attempts = read_log(csv.as_bytes(), &origin()).unwrap();
            assert_eq!(attempts[0].correct, 1);
            assert_eq!(attempts[0].incorrect, 0);
        }

        #[test]
        fn fractional_outcome_is_an_error() {
            let csv = "date,name,sequence,correct,incorrect\n2024-01-01,A,1,0.5,0\n";
            let err = read_log(csv.as_bytes(), &origin()).unwrap_err();
            assert!(matches!(err, Error::Log { .. }));
        }

        #[test]
        fn missing_outcome_columns_read_as_zero() {
            let csv = "date,name,sequence\n2024-01-01,A,1\n";
            let attempts = read_log(csv.as_bytes(), &origin()).unwrap();
            assert_eq!(attempts[0].correct, 0);
            assert_eq!(attempts[0].incorrect, 0);
        }

        #[test]
        fn non_numeric_outcome_is_an_error() {
            let csv = "date,name,sequence,correct,incorrect\n2024-01-01,A,1,yes,0\n";
            let err = read_log(csv.as_bytes(), &origin()).unwrap_err();
            assert!(matches!(err, Error::Log { .. }));
        }

        #[test]
        fn header_only_is_empty_log() {
            let csv = "date,name,sequence,correct,incorrect\n";
            assert!(read_log(csv.as_bytes(), &origin()).unwrap().is_empty());
        }

        #[test]
        fn loads_from_disk() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "date,name,sequence,correct,incorrect").unwrap();
            writeln!(file, "2024-01-01,A,1,1,0").unwrap();
            let attempts = load_log(file.path()).unwrap();
            assert_eq!(attempts.len(), 1);
        }
    }
}
