use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use analyst_dataset::dataset::{AnalystDataset, DatasetError};
use log::{info, warn};
use stock_model::{
    DateRange, HeadlineTable, JoinStrategy, MarketDataSource, OutputError, merge, write_merged,
};
use thiserror::Error;

/// Where the headline side of the merge comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewsSource {
    #[default]
    Dataset,
    Tiingo,
}

impl FromStr for NewsSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dataset" => Ok(NewsSource::Dataset),
            "tiingo" => Ok(NewsSource::Tiingo),
            other => Err(format!("unknown news source: {other} (expected dataset or tiingo)")),
        }
    }
}

impl fmt::Display for NewsSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NewsSource::Dataset => write!(f, "dataset"),
            NewsSource::Tiingo => write!(f, "tiingo"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("market data request failed: {0}")]
    Source(Box<dyn std::error::Error>),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub ticker: String,
    pub range: DateRange,
    pub join: JoinStrategy,
    pub news_source: NewsSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    pub path: PathBuf,
    pub prices: usize,
    pub news: usize,
    pub headlines: usize,
    pub rows: usize,
    pub unmatched: usize,
}

/// Fetches prices and news, selects the ticker's headlines, joins them on
/// date and writes `<TICKER>_Final.csv` into `output_dir`.
///
/// Any failure aborts before the output file is touched.
pub fn run<S: MarketDataSource>(
    source: &S,
    dataset: &AnalystDataset,
    output_dir: &Path,
    request: &MergeRequest,
) -> Result<MergeReport, PipelineError> {
    let ticker = request.ticker.as_str();

    let prices = source
        .get_prices(ticker, request.range)
        .map_err(|e| PipelineError::Source(Box::new(e)))?;
    let news = source
        .get_news(ticker)
        .map_err(|e| PipelineError::Source(Box::new(e)))?;
    info!("run | ticker: {} | prices: {} | news: {}", ticker, prices.len(), news.len());

    let outside = prices.iter().filter(|p| !request.range.contains(p.date)).count();
    if outside > 0 {
        warn!("run | {} price rows fall outside the requested range", outside);
    }

    let headlines = match request.news_source {
        NewsSource::Dataset => dataset.get_ticker(ticker)?,
        NewsSource::Tiingo => HeadlineTable::from_news(ticker, &news),
    };
    info!(
        "run | headlines: {} | source: {}",
        headlines.len(),
        request.news_source
    );

    let merged = merge(&headlines, &prices, request.join);
    let path = write_merged(output_dir, ticker, &merged)?;
    info!("run | wrote {} rows to {}", merged.rows.len(), path.display());

    Ok(MergeReport {
        path,
        prices: prices.len(),
        news: news.len(),
        headlines: headlines.len(),
        rows: merged.rows.len(),
        unmatched: merged.unmatched,
    })
}
