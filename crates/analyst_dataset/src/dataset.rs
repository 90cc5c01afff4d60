use std::io::Read;
use std::path::PathBuf;

use log::debug;
use stock_model::{DateError, HeadlineTable, normalize_date};
use thiserror::Error;

const STOCK_COLUMN: &str = "stock";
const DATE_COLUMN: &str = "date";
const UNNAMED_PREFIX: &str = "Unnamed: ";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset has no {0:?} column")]
    MissingColumn(&'static str),
    #[error("row {row}: {source}")]
    Date { row: u64, source: DateError },
}

pub struct AnalystDataset {
    path: PathBuf,
}

impl AnalystDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        AnalystDataset { path: path.into() }
    }

    pub fn get_ticker(&self, ticker: &str) -> Result<HeadlineTable, DatasetError> {
        debug!("get_ticker | path: {} | ticker: {}", self.path.display(), ticker);

        let file = std::fs::File::open(&self.path).map_err(|e| DatasetError::Open {
            path: self.path.clone(),
            source: e,
        })?;
        read_ticker(file, ticker)
    }
}

/// Reads a headline CSV and keeps the rows whose `stock` equals `ticker`.
///
/// Only matching rows have their date parsed, so a malformed date under
/// another ticker does not fail the read.
pub fn read_ticker<R: Read>(reader: R, ticker: &str) -> Result<HeadlineTable, DatasetError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| column_name(i, h))
        .collect();

    let stock_index = column_index(&headers, STOCK_COLUMN)?;
    let date_index = column_index(&headers, DATE_COLUMN)?;

    let mut table = HeadlineTable::new(headers, date_index);
    let mut scanned: u64 = 0;
    for record in csv_reader.records() {
        let record = record?;
        scanned += 1;
        if record.get(stock_index) != Some(ticker) {
            continue;
        }

        let raw_date = record.get(date_index).unwrap_or_default();
        let date = normalize_date(raw_date).map_err(|source| DatasetError::Date {
            row: record.position().map(|p| p.line()).unwrap_or(scanned),
            source,
        })?;
        table.push(date, record.iter().map(String::from).collect());
    }
    table.sort_by_date_desc();

    debug!(
        "read_ticker | ticker: {} | scanned: {} | matched: {}",
        ticker,
        scanned,
        table.len()
    );
    Ok(table)
}

// blank headers (a saved dataframe index) get the name a dataframe reader gives them
fn column_name(index: usize, header: &str) -> String {
    if header.trim().is_empty() {
        format!("{UNNAMED_PREFIX}{index}")
    } else {
        header.to_string()
    }
}

fn column_index(headers: &[String], name: &'static str) -> Result<usize, DatasetError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or(DatasetError::MissingColumn(name))
}
