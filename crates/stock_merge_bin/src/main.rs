use analyst_dataset::dataset::AnalystDataset;
use chrono::NaiveDate;
use clap::Parser;
use log::{error, info};
use std::process::exit;
use stock_merge::config::Config;
use stock_merge::pipeline::{self, MergeRequest, NewsSource};
use stock_merge::utils;
use stock_model::{DateRange, JoinStrategy};
use tiingo_api::api::TiingoAPI;

#[derive(Parser)]
#[command(name = "stock_merge")]
#[command(about = "Merge analyst headlines with daily Tiingo prices for one ticker")]
struct Cli {
    /// Ticker symbol, e.g. AAPL
    #[arg(default_value = "AAPL")]
    ticker: String,

    /// First day of the price range (YYYY-MM-DD)
    #[arg(default_value = "2020-01-01")]
    start_date: NaiveDate,

    /// Last day of the price range (YYYY-MM-DD)
    #[arg(default_value = "2023-01-01")]
    end_date: NaiveDate,

    /// How headlines without a same-day price are handled: inner or left
    #[arg(short, long, default_value = "inner")]
    join: JoinStrategy,

    /// Headline source: the local dataset or Tiingo news
    #[arg(short, long, default_value = "dataset")]
    news_source: NewsSource,
}

fn fail(message: impl std::fmt::Display) -> ! {
    error!("{}", message);
    exit(1);
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let cli = Cli::parse();
    let config = Config::new();

    let ticker = utils::sanitize_ticker(cli.ticker);
    if ticker.is_empty() {
        fail("Ticker is empty after sanitizing");
    }

    let range = match DateRange::new(cli.start_date, cli.end_date) {
        Ok(range) => range,
        Err(e) => fail(format!("Invalid date range: {}", e)),
    };

    let token = match config.read_token() {
        Ok(token) => token,
        Err(e) => fail(format!("Could not read Tiingo token: {}", e)),
    };

    let tiingo_api = match TiingoAPI::new(&token) {
        Ok(api) => api.with_base_url(&config.tiingo_url),
        Err(e) => fail(format!("Could not create Tiingo client: {}", e)),
    };
    let dataset = AnalystDataset::new(&config.dataset);

    let request = MergeRequest {
        ticker,
        range,
        join: cli.join,
        news_source: cli.news_source,
    };

    match pipeline::run(&tiingo_api, &dataset, &config.output_dir, &request) {
        Ok(report) => info!(
            "Done | {} rows ({} headlines without a price) | {}",
            report.rows,
            report.unmatched,
            report.path.display()
        ),
        Err(e) => fail(format!("Merge failed for {}: {}", request.ticker, e)),
    }
}
