use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct NewsRecord {
    pub date: NaiveDate,
    pub id: i64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub source: String,
    pub tickers: Vec<String>,
    pub tags: Vec<String>,
}
