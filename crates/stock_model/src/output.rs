use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::merge::MergedTable;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub fn output_file_name(ticker: &str) -> String {
    format!("{}_Final.csv", ticker)
}

impl MergedTable {
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Writes `<dir>/<TICKER>_Final.csv`, replacing any previous run's file.
///
/// The table goes to a sibling `.tmp` file first and is renamed into place, so
/// a failure never leaves a truncated output behind.
pub fn write_merged(dir: &Path, ticker: &str, table: &MergedTable) -> Result<PathBuf, OutputError> {
    std::fs::create_dir_all(dir).map_err(|e| OutputError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let path = dir.join(output_file_name(ticker));
    let tmp = path.with_extension("csv.tmp");

    let file = std::fs::File::create(&tmp).map_err(|e| OutputError::Io {
        path: tmp.clone(),
        source: e,
    })?;
    if let Err(e) = table.write_csv(file) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }

    std::fs::rename(&tmp, &path).map_err(|e| OutputError::Io {
        path: path.clone(),
        source: e,
    })?;

    debug!("write_merged | path: {} | rows: {}", path.display(), table.rows.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table(rows: Vec<Vec<&str>>) -> MergedTable {
        MergedTable {
            headers: vec!["headline".to_string(), "date".to_string(), "close".to_string()],
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
            unmatched: 0,
        }
    }

    #[test]
    fn output_file_name_uses_ticker() {
        assert_eq!(output_file_name("AAPL"), "AAPL_Final.csv");
    }

    #[test]
    fn write_csv_header_only_when_empty() {
        let mut buf = Vec::new();
        table(vec![]).write_csv(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "headline,date,close\n");
    }

    #[test]
    fn write_csv_quotes_embedded_commas() {
        let mut buf = Vec::new();
        table(vec![vec!["Up, again", "2020-01-02", "10.0"]])
            .write_csv(&mut buf)
            .unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "headline,date,close\n\"Up, again\",2020-01-02,10.0\n"
        );
    }

    #[test]
    fn write_merged_overwrites_and_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let merged = table(vec![vec!["a", "2020-01-02", "10.0"]]);

        std::fs::write(dir.path().join("AAPL_Final.csv"), "stale").unwrap();
        let path = write_merged(dir.path(), "AAPL", &merged).unwrap();
        let first = std::fs::read(&path).unwrap();
        let path_again = write_merged(dir.path(), "AAPL", &merged).unwrap();
        let second = std::fs::read(&path_again).unwrap();

        assert_eq!(path, dir.path().join("AAPL_Final.csv"));
        assert_eq!(first, second);
        assert!(!dir.path().join("AAPL_Final.csv.tmp").exists());
        assert_eq!(String::from_utf8(first).unwrap(), "headline,date,close\na,2020-01-02,10.0\n");
    }

    #[test]
    fn write_merged_creates_missing_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out").join("daily");
        let path = write_merged(&nested, "MSFT", &table(vec![])).unwrap();
        assert!(path.exists());
    }
}
