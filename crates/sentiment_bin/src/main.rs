use clap::Parser;
use dotenvy::dotenv;
use log::{error, info};
use sentiment_api::api::{FINBERT_MODEL, FinbertAPI, HF_INFERENCE_URL};
use sentiment_api::sentiment::{LabelMap, Sentiment, SentimentClassifier};
use std::path::PathBuf;
use std::{env, process::exit};
use stock_merge::config::{lookup_or, read_token};

const DEFAULT_SENTENCE: &str = "The stock market is not bad or good today.";
const DEFAULT_TOKEN_FILE: &str = "secretkey_hf.txt";

#[derive(Parser)]
#[command(name = "sentiment")]
#[command(about = "Classify one sentence with FinBERT")]
struct Cli {
    /// Sentence to classify
    #[arg(default_value = DEFAULT_SENTENCE)]
    sentence: String,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, PartialEq)]
struct Config {
    token_file: PathBuf,
    model: String,
    base_url: String,
    labels: LabelMap,
}

impl Config {
    fn new() -> Result<Config, String> {
        dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// `SENTIMENT_LABELS` lists the model's labels in class id order and
    /// must be set along with `SENTIMENT_MODEL` for models not ordered like FinBERT.
    fn from_lookup<F>(lookup: F) -> Result<Config, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let labels = match lookup_or(&lookup, "SENTIMENT_LABELS", "") {
            list if list.is_empty() => LabelMap::finbert(),
            list => LabelMap::parse(&list)
                .ok_or_else(|| format!("SENTIMENT_LABELS has an empty label: {:?}", list))?,
        };

        Ok(Config {
            token_file: lookup_or(&lookup, "SENTIMENT_TOKEN_FILE", DEFAULT_TOKEN_FILE).into(),
            model: lookup_or(&lookup, "SENTIMENT_MODEL", FINBERT_MODEL),
            base_url: lookup_or(&lookup, "SENTIMENT_URL", HF_INFERENCE_URL),
            labels,
        })
    }
}

fn render(sentiment: &Sentiment) -> String {
    format!(
        "Logits: {:?}\nProbabilities: {:?}\nPredicted Label ID: {}\nPredicted Label: {}",
        sentiment.logits, sentiment.probabilities, sentiment.label_id, sentiment.label
    )
}

fn fail(message: impl std::fmt::Display) -> ! {
    error!("{}", message);
    exit(1);
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let cli = Cli::parse();
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    let token = match read_token(&config.token_file) {
        Ok(token) => token,
        Err(e) => fail(e),
    };

    let classifier = match FinbertAPI::new(&token) {
        Ok(api) => api
            .with_model(&config.base_url, &config.model)
            .with_labels(config.labels),
        Err(e) => fail(format!("Could not create classifier: {}", e)),
    };
    info!("Classifying with {}", classifier.url());

    let sentiment = match classifier.classify(&cli.sentence) {
        Ok(sentiment) => sentiment,
        Err(e) => fail(format!("Classification failed: {}", e)),
    };

    if cli.json {
        match serde_json::to_string_pretty(&sentiment) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(format!("Could not serialize result: {}", e)),
        }
    } else {
        println!("{}", render(&sentiment));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_pass_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.token_file, PathBuf::from("secretkey_hf.txt"));
        assert_eq!(config.model, "ProsusAI/finbert");
        assert_eq!(config.base_url, HF_INFERENCE_URL);
        assert_eq!(config.labels, LabelMap::finbert());
    }

    #[test]
    fn config_pass_override_model() {
        let config = Config::from_lookup(|key| match key {
            "SENTIMENT_MODEL" => Some("yiyanghkust/finbert-tone".to_string()),
            _ => Some("".to_string()),
        })
        .unwrap();
        assert_eq!(config.model, "yiyanghkust/finbert-tone");
        assert_eq!(config.token_file, PathBuf::from("secretkey_hf.txt"));
        assert_eq!(config.labels, LabelMap::finbert());
    }

    #[test]
    fn config_pass_override_labels() {
        let config = Config::from_lookup(|key| match key {
            "SENTIMENT_MODEL" => Some("yiyanghkust/finbert-tone".to_string()),
            "SENTIMENT_LABELS" => Some("Neutral,Positive,Negative".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.labels, LabelMap::new(["Neutral", "Positive", "Negative"]));

        let sentiment = Sentiment::from_logits(vec![2.0, 0.5, -1.0], &config.labels).unwrap();
        assert_eq!(sentiment.label_id, 0);
        assert_eq!(sentiment.label, "Neutral");
    }

    #[test]
    fn config_fail_blank_label() {
        let result = Config::from_lookup(|key| match key {
            "SENTIMENT_LABELS" => Some("positive,,neutral".to_string()),
            _ => None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn render_lists_every_field() {
        let sentiment = Sentiment::from_logits(vec![0.0, 0.0, 1.0], &LabelMap::finbert()).unwrap();
        let rendered = render(&sentiment);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Logits: [0.0, 0.0, 1.0]");
        assert!(lines[1].starts_with("Probabilities: ["));
        assert_eq!(lines[2], "Predicted Label ID: 2");
        assert_eq!(lines[3], "Predicted Label: neutral");
    }
}
