use std::env;
use std::path::{Path, PathBuf};

use dotenvy::dotenv;
use thiserror::Error;
use tiingo_api::api::TIINGO_BASE_API_URL;

const DEFAULT_TOKEN_FILE: &str = "secretkey_tiingo.txt";
const DEFAULT_DATASET: &str = "raw_analyst_ratings.csv";
const DEFAULT_OUTPUT_DIR: &str = ".";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read token file {path}: {source}")]
    TokenFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("token file {0} is empty")]
    EmptyToken(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub token_file: PathBuf,
    pub dataset: PathBuf,
    pub output_dir: PathBuf,
    pub tiingo_url: String,
}

impl Config {
    pub fn new() -> Config {
        dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        Config {
            token_file: lookup_or(&lookup, "STOCK_MERGE_TOKEN_FILE", DEFAULT_TOKEN_FILE).into(),
            dataset: lookup_or(&lookup, "STOCK_MERGE_DATASET", DEFAULT_DATASET).into(),
            output_dir: lookup_or(&lookup, "STOCK_MERGE_OUTPUT_DIR", DEFAULT_OUTPUT_DIR).into(),
            tiingo_url: lookup_or(&lookup, "STOCK_MERGE_TIINGO_URL", TIINGO_BASE_API_URL),
        }
    }

    pub fn read_token(&self) -> Result<String, ConfigError> {
        read_token(&self.token_file)
    }
}

/// Trimmed value of `key`; unset or blank values fall back to `default`.
pub fn lookup_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Reads a plaintext secret, trimming surrounding whitespace.
pub fn read_token(path: &Path) -> Result<String, ConfigError> {
    let token = std::fs::read_to_string(path).map_err(|e| ConfigError::TokenFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    let token = token.trim();
    if token.is_empty() {
        return Err(ConfigError::EmptyToken(path.to_path_buf()));
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn from_lookup_pass_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.token_file, PathBuf::from("secretkey_tiingo.txt"));
        assert_eq!(config.dataset, PathBuf::from("raw_analyst_ratings.csv"));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.tiingo_url, "https://api.tiingo.com");
    }

    #[test]
    fn from_lookup_pass_overrides_and_blank_values() {
        let vars = HashMap::from([
            ("STOCK_MERGE_DATASET", "/data/ratings.csv"),
            ("STOCK_MERGE_OUTPUT_DIR", "   "),
            ("STOCK_MERGE_TIINGO_URL", " http://localhost:9000 "),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.dataset, PathBuf::from("/data/ratings.csv"));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.tiingo_url, "http://localhost:9000");
    }

    #[test]
    fn lookup_or_pass_trims_and_defaults() {
        let lookup = |key: &str| match key {
            "SET" => Some(" value ".to_string()),
            "BLANK" => Some("\t".to_string()),
            _ => None,
        };
        assert_eq!(lookup_or(&lookup, "SET", "d"), "value");
        assert_eq!(lookup_or(&lookup, "BLANK", "d"), "d");
        assert_eq!(lookup_or(&lookup, "UNSET", "d"), "d");
    }

    #[test]
    fn read_token_pass_trims() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"  abc123\n").unwrap();
        assert_eq!(read_token(file.path()).unwrap(), "abc123");
    }

    #[test]
    fn read_token_fail_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\n\n").unwrap();
        assert!(matches!(read_token(file.path()), Err(ConfigError::EmptyToken(_))));
    }

    #[test]
    fn read_token_fail_missing() {
        let result = read_token(Path::new("/definitely/not/here.txt"));
        assert!(matches!(result, Err(ConfigError::TokenFile { .. })));
    }
}
