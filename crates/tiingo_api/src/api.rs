use log::debug;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use stock_model::{
    DATE_FORMAT, DateError, DateRange, MarketDataSource, NewsRecord, PriceRecord, normalize_date,
};
use thiserror::Error;

pub const TIINGO_BASE_API_URL: &str = "https://api.tiingo.com";

#[derive(Debug, Error)]
pub enum TiingoError {
    #[error("api token is not a valid header value")]
    InvalidToken,
    #[error("request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },
    #[error("tiingo rejected the request: {0}")]
    Rejected(String),
    #[error("unexpected response body: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Date(#[from] DateError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TiingoPriceJSON {
    date: String,
    close: f64,
    high: f64,
    low: f64,
    open: f64,
    volume: i64,
    adj_close: f64,
    adj_high: f64,
    adj_low: f64,
    adj_open: f64,
    adj_volume: i64,
    #[serde(default)]
    div_cash: f64,
    #[serde(default = "default_split_factor")]
    split_factor: f64,
}

fn default_split_factor() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TiingoNewsJSON {
    id: i64,
    title: String,
    url: String,
    #[serde(default)]
    description: String,
    published_date: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    tickers: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

// Tiingo answers auth and lookup failures with an object instead of an array
#[derive(Debug, Deserialize)]
struct TiingoDetailJSON {
    detail: String,
}

pub struct TiingoAPI {
    base_url: String,
    client: reqwest::blocking::Client,
    headers: HeaderMap,
}

impl TiingoAPI {
    pub fn new(token: &str) -> Result<Self, TiingoError> {
        let mut authorization = HeaderValue::from_str(&format!("Token {}", token))
            .map_err(|_| TiingoError::InvalidToken)?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, authorization);

        Ok(TiingoAPI {
            base_url: TIINGO_BASE_API_URL.to_string(),
            client: reqwest::blocking::Client::new(),
            headers,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn prices_url(&self, ticker: &str, range: DateRange) -> String {
        format!(
            "{}/tiingo/daily/{}/prices?startDate={}&endDate={}",
            self.base_url,
            ticker,
            range.start.format(DATE_FORMAT),
            range.end.format(DATE_FORMAT)
        )
    }

    fn news_url(&self, ticker: &str) -> String {
        format!("{}/tiingo/news?tickers={}", self.base_url, ticker)
    }

    fn get_body(&self, url: &str) -> Result<String, TiingoError> {
        let network = |source| TiingoError::Network {
            url: url.to_string(),
            source,
        };
        self.client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .map_err(network)?
            .text()
            .map_err(network)
    }
}

impl MarketDataSource for TiingoAPI {
    type Error = TiingoError;

    fn get_prices(&self, ticker: &str, range: DateRange) -> Result<Vec<PriceRecord>, TiingoError> {
        let url = self.prices_url(ticker, range);
        debug!("get_prices | url: {}", url);

        let prices = parse_prices(&self.get_body(&url)?)?;
        debug!("get_prices | ticker: {} | rows: {}", ticker, prices.len());
        Ok(prices)
    }

    fn get_news(&self, ticker: &str) -> Result<Vec<NewsRecord>, TiingoError> {
        let url = self.news_url(ticker);
        debug!("get_news | url: {}", url);

        let news = parse_news(&self.get_body(&url)?)?;
        debug!("get_news | ticker: {} | rows: {}", ticker, news.len());
        Ok(news)
    }
}

fn parse_array<T: for<'de> Deserialize<'de>>(body: &str) -> Result<Vec<T>, TiingoError> {
    match serde_json::from_str::<Vec<T>>(body) {
        Ok(entries) => Ok(entries),
        Err(e) => match serde_json::from_str::<TiingoDetailJSON>(body) {
            Ok(detail) => Err(TiingoError::Rejected(detail.detail)),
            Err(_) => Err(TiingoError::Parse(e)),
        },
    }
}

/// Parses a daily price response, reducing each timestamp to its day.
pub fn parse_prices(body: &str) -> Result<Vec<PriceRecord>, TiingoError> {
    parse_array::<TiingoPriceJSON>(body)?
        .into_iter()
        .map(|entry| {
            Ok(PriceRecord {
                date: normalize_date(&entry.date)?,
                close: entry.close,
                high: entry.high,
                low: entry.low,
                open: entry.open,
                volume: entry.volume,
                adj_close: entry.adj_close,
                adj_high: entry.adj_high,
                adj_low: entry.adj_low,
                adj_open: entry.adj_open,
                adj_volume: entry.adj_volume,
                div_cash: entry.div_cash,
                split_factor: entry.split_factor,
            })
        })
        .collect()
}

/// Parses a news response, dating each article by its publication day.
pub fn parse_news(body: &str) -> Result<Vec<NewsRecord>, TiingoError> {
    parse_array::<TiingoNewsJSON>(body)?
        .into_iter()
        .map(|entry| {
            Ok(NewsRecord {
                date: normalize_date(&entry.published_date)?,
                id: entry.id,
                title: entry.title,
                url: entry.url,
                description: entry.description,
                source: entry.source,
                tickers: entry.tickers,
                tags: entry.tags,
            })
        })
        .collect()
}
