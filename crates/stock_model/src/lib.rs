mod date;
mod headline;
mod merge;
mod news;
mod output;
mod price;
mod source;

pub use date::{DATE_FORMAT, DateError, DateRange, normalize_date};
pub use headline::{HeadlineRow, HeadlineTable};
pub use merge::{JoinStrategy, MergedTable, merge};
pub use news::NewsRecord;
pub use output::{OutputError, output_file_name, write_merged};
pub use price::PriceRecord;
pub use source::MarketDataSource;
