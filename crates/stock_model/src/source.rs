use crate::date::DateRange;
use crate::news::NewsRecord;
use crate::price::PriceRecord;

/// Implementations return records whose dates are already normalized.
pub trait MarketDataSource {
    type Error: std::error::Error + 'static;

    fn get_prices(&self, ticker: &str, range: DateRange) -> Result<Vec<PriceRecord>, Self::Error>;

    fn get_news(&self, ticker: &str) -> Result<Vec<NewsRecord>, Self::Error>;
}
