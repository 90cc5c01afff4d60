use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("api token is not a valid header value")]
    InvalidToken,
    #[error("request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },
    #[error("inference service error: {0}")]
    Service(String),
    #[error("unexpected response body: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("label {0:?} is not in the model's label map")]
    UnknownLabel(String),
    #[error("no score returned for label {0:?}")]
    MissingLabel(String),
    #[error("expected {expected} logits, got {got}")]
    Shape { expected: usize, got: usize },
    #[error("logits contain a non-finite value")]
    NonFinite,
}

/// Class id to label name, in the order the model emits its logits.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap {
    names: Vec<String>,
}

impl LabelMap {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        LabelMap {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// `ProsusAI/finbert`'s `id2label`.
    pub fn finbert() -> Self {
        LabelMap::new(["positive", "negative", "neutral"])
    }

    /// Parses a comma-separated list of label names in class id order.
    pub fn parse(list: &str) -> Option<Self> {
        let names: Vec<&str> = list.split(',').map(str::trim).collect();
        if names.iter().any(|n| n.is_empty()) {
            return None;
        }
        Some(LabelMap::new(names))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Resolves a label returned by a service, accepting the generic
    /// `LABEL_<id>` form as well.
    pub fn id_of(&self, label: &str) -> Option<usize> {
        if let Some(id) = self.names.iter().position(|n| n.eq_ignore_ascii_case(label)) {
            return Some(id);
        }
        label
            .strip_prefix("LABEL_")
            .and_then(|id| id.parse::<usize>().ok())
            .filter(|id| *id < self.names.len())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentiment {
    pub logits: Vec<f64>,
    pub probabilities: Vec<f64>,
    pub label_id: usize,
    pub label: String,
}

impl Sentiment {
    pub fn from_logits(logits: Vec<f64>, labels: &LabelMap) -> Result<Self, SentimentError> {
        if logits.is_empty() || logits.len() != labels.len() {
            return Err(SentimentError::Shape {
                expected: labels.len(),
                got: logits.len(),
            });
        }
        if logits.iter().any(|l| !l.is_finite()) {
            return Err(SentimentError::NonFinite);
        }

        let probabilities = softmax(&logits);
        let label_id = argmax(&probabilities);
        let label = labels.name(label_id).unwrap_or_default().to_string();

        Ok(Sentiment {
            logits,
            probabilities,
            label_id,
            label,
        })
    }
}

/// Softmax shifted by the largest logit so large scores don't overflow.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, best_value), (i, v)| {
            if *v > best_value { (i, *v) } else { (best, best_value) }
        })
        .0
}

/// Text in, logits out. Anything that can score a sentence against a fixed
/// label set.
pub trait SentimentClassifier {
    fn labels(&self) -> &LabelMap;

    fn logits(&self, text: &str) -> Result<Vec<f64>, SentimentError>;

    fn classify(&self, text: &str) -> Result<Sentiment, SentimentError> {
        let logits = self.logits(text)?;
        Sentiment::from_logits(logits, self.labels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTENCE: &str = "The stock market is not bad or good today.";
    const TOLERANCE: f64 = 1e-9;

    struct FixedClassifier {
        labels: LabelMap,
        logits: Vec<f64>,
    }

    impl SentimentClassifier for FixedClassifier {
        fn labels(&self) -> &LabelMap {
            &self.labels
        }

        fn logits(&self, _text: &str) -> Result<Vec<f64>, SentimentError> {
            Ok(self.logits.clone())
        }
    }

    #[test]
    fn softmax_sums_to_one() {
        for logits in [vec![0.0, 0.0, 0.0], vec![-1.3, -1.6, 2.7], vec![1000.0, 999.0, -1000.0]] {
            let probabilities = softmax(&logits);
            let sum: f64 = probabilities.iter().sum();
            assert!((sum - 1.0).abs() < TOLERANCE, "sum {} for {:?}", sum, logits);
            assert!(probabilities.iter().all(|p| p.is_finite() && *p >= 0.0));
        }
    }

    #[test]
    fn softmax_uniform_for_equal_logits() {
        let probabilities = softmax(&[2.0, 2.0]);
        assert!((probabilities[0] - 0.5).abs() < TOLERANCE);
        assert!((probabilities[1] - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn argmax_first_wins_on_tie() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[0.9, 0.05, 0.05]), 0);
    }

    #[test]
    fn label_map_resolves_names() {
        let labels = LabelMap::finbert();
        assert_eq!(labels.id_of("neutral"), Some(2));
        assert_eq!(labels.id_of("Positive"), Some(0));
        assert_eq!(labels.id_of("LABEL_1"), Some(1));
        assert_eq!(labels.id_of("LABEL_3"), None);
        assert_eq!(labels.id_of("bullish"), None);
    }

    #[test]
    fn label_map_parse_list() {
        let labels = LabelMap::parse("Neutral, Positive,Negative").unwrap();
        assert_eq!(labels.id_of("neutral"), Some(0));
        assert_eq!(labels.name(2), Some("Negative"));
        assert!(LabelMap::parse("positive,,neutral").is_none());
        assert!(LabelMap::parse("").is_none());
    }

    #[test]
    fn from_logits_fail_shape() {
        let result = Sentiment::from_logits(vec![1.0, 2.0], &LabelMap::finbert());
        assert!(matches!(result, Err(SentimentError::Shape { expected: 3, got: 2 })));
    }

    #[test]
    fn from_logits_fail_non_finite() {
        let result = Sentiment::from_logits(vec![1.0, f64::NAN, 0.0], &LabelMap::finbert());
        assert!(matches!(result, Err(SentimentError::NonFinite)));
    }

    #[test]
    fn classify_fixed_sentence_is_stable() {
        let classifier = FixedClassifier {
            labels: LabelMap::finbert(),
            logits: vec![-1.2, -0.9, 2.1],
        };
        let first = classifier.classify(SENTENCE).unwrap();
        let second = classifier.classify(SENTENCE).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.label_id, 2);
        assert_eq!(first.label, "neutral");
        let sum: f64 = first.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < TOLERANCE);
    }
}
