use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use log::{debug, info};

use crate::headline::HeadlineTable;
use crate::price::PriceRecord;

const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinStrategy {
    #[default]
    Inner,
    Left,
}

impl FromStr for JoinStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inner" => Ok(JoinStrategy::Inner),
            "left" => Ok(JoinStrategy::Left),
            other => Err(format!("unknown join strategy: {other} (expected inner or left)")),
        }
    }
}

impl fmt::Display for JoinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JoinStrategy::Inner => write!(f, "inner"),
            JoinStrategy::Left => write!(f, "left"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Headline rows that had no price on their date.
    pub unmatched: usize,
}

/// Joins headlines against prices on the normalized date.
///
/// Headline columns come first with the date column in place, followed by
/// every price column except `date`. Rows follow the headline order and,
/// within one headline, the order the prices were given in.
pub fn merge(
    headlines: &HeadlineTable,
    prices: &[PriceRecord],
    strategy: JoinStrategy,
) -> MergedTable {
    let headers = merged_headers(headlines);
    let price_width = PriceRecord::COLUMNS.len() - 1;
    let prices_by_date = prices.iter().into_group_map_by(|p| p.date);

    let mut rows = Vec::new();
    let mut unmatched = 0;
    for headline in headlines.rows() {
        match prices_by_date.get(&headline.date) {
            Some(matches) => {
                for price in matches {
                    let mut row = headline.fields.clone();
                    row.extend(price.values().into_iter().skip(1));
                    rows.push(row);
                }
            }
            None => {
                unmatched += 1;
                if strategy == JoinStrategy::Left {
                    let mut row = headline.fields.clone();
                    row.extend(std::iter::repeat_n(String::new(), price_width));
                    rows.push(row);
                }
            }
        }
    }

    if unmatched > 0 {
        info!(
            "merge | {} of {} headline rows have no price on their date | strategy: {}",
            unmatched,
            headlines.len(),
            strategy
        );
    }
    debug!(
        "merge | headlines: {} | prices: {} | merged: {}",
        headlines.len(),
        prices.len(),
        rows.len()
    );

    MergedTable {
        headers,
        rows,
        unmatched,
    }
}

fn merged_headers(headlines: &HeadlineTable) -> Vec<String> {
    let key = headlines.date_column();
    let price_columns: Vec<&str> = PriceRecord::COLUMNS
        .iter()
        .copied()
        .filter(|c| *c != "date")
        .collect();

    let mut headers: Vec<String> = headlines
        .headers()
        .iter()
        .map(|h| {
            if h != key && price_columns.contains(&h.as_str()) {
                format!("{h}{LEFT_SUFFIX}")
            } else {
                h.clone()
            }
        })
        .collect();

    headers.extend(price_columns.iter().map(|c| {
        if *c != key && headlines.headers().iter().any(|h| h == c) {
            format!("{c}{RIGHT_SUFFIX}")
        } else {
            c.to_string()
        }
    }));
    headers
}
