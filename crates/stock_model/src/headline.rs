use chrono::NaiveDate;

use crate::date::DATE_FORMAT;
use crate::news::NewsRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlineRow {
    pub date: NaiveDate,
    /// Every cell of the source row, with the date cell already normalized.
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlineTable {
    headers: Vec<String>,
    date_index: usize,
    rows: Vec<HeadlineRow>,
}

const NEWS_COLUMNS: [&str; 6] = ["headline", "url", "publisher", "date", "stock", "description"];
const NEWS_DATE_INDEX: usize = 3;

impl HeadlineTable {
    pub fn new(headers: Vec<String>, date_index: usize) -> Self {
        HeadlineTable {
            headers,
            date_index,
            rows: Vec::new(),
        }
    }

    pub fn from_news(ticker: &str, news: &[NewsRecord]) -> Self {
        let headers = NEWS_COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut table = HeadlineTable::new(headers, NEWS_DATE_INDEX);
        for article in news {
            table.push(
                article.date,
                vec![
                    article.title.clone(),
                    article.url.clone(),
                    article.source.clone(),
                    String::new(),
                    ticker.to_string(),
                    article.description.clone(),
                ],
            );
        }
        table.sort_by_date_desc();
        table
    }

    pub fn push(&mut self, date: NaiveDate, mut fields: Vec<String>) {
        if let Some(cell) = fields.get_mut(self.date_index) {
            *cell = date.format(DATE_FORMAT).to_string();
        }
        self.rows.push(HeadlineRow { date, fields });
    }

    pub fn sort_by_date_desc(&mut self) {
        // stable: same-day rows keep source order
        self.rows.sort_by(|a, b| b.date.cmp(&a.date));
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn date_column(&self) -> &str {
        &self.headers[self.date_index]
    }

    pub fn rows(&self) -> &[HeadlineRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
