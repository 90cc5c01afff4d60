use chrono::NaiveDate;

use crate::date::DATE_FORMAT;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub volume: i64,
    pub adj_close: f64,
    pub adj_high: f64,
    pub adj_low: f64,
    pub adj_open: f64,
    pub adj_volume: i64,
    pub div_cash: f64,
    pub split_factor: f64,
}

impl PriceRecord {
    /// Column names in the order the price endpoint returns them.
    pub const COLUMNS: [&'static str; 13] = [
        "date",
        "close",
        "high",
        "low",
        "open",
        "volume",
        "adjClose",
        "adjHigh",
        "adjLow",
        "adjOpen",
        "adjVolume",
        "divCash",
        "splitFactor",
    ];

    pub fn values(&self) -> Vec<String> {
        vec![
            self.date.format(DATE_FORMAT).to_string(),
            format_float(self.close),
            format_float(self.high),
            format_float(self.low),
            format_float(self.open),
            self.volume.to_string(),
            format_float(self.adj_close),
            format_float(self.adj_high),
            format_float(self.adj_low),
            format_float(self.adj_open),
            self.adj_volume.to_string(),
            format_float(self.div_cash),
            format_float(self.split_factor),
        ]
    }
}

// whole numbers keep one decimal so float columns stay recognisable
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
