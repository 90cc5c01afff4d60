use log::debug;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::sentiment::{LabelMap, SentimentClassifier, SentimentError};

pub const FINBERT_MODEL: &str = "ProsusAI/finbert";
pub const HF_INFERENCE_URL: &str = "https://router.huggingface.co/hf-inference/models";

#[derive(Debug, Serialize)]
struct InferenceRequestJSON<'a> {
    inputs: &'a str,
    parameters: InferenceParametersJSON,
}

#[derive(Debug, Serialize)]
struct InferenceParametersJSON {
    // "none" returns raw logits instead of probabilities
    function_to_apply: &'static str,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct LabelScoreJSON {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponseJSON {
    Batched(Vec<Vec<LabelScoreJSON>>),
    Flat(Vec<LabelScoreJSON>),
    Error { error: String },
}

/// FinBERT served by a Hugging Face text-classification endpoint.
pub struct FinbertAPI {
    url: String,
    client: reqwest::blocking::Client,
    headers: HeaderMap,
    labels: LabelMap,
}

impl FinbertAPI {
    pub fn new(token: &str) -> Result<Self, SentimentError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| SentimentError::InvalidToken)?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);

        Ok(FinbertAPI {
            url: model_url(HF_INFERENCE_URL, FINBERT_MODEL),
            client: reqwest::blocking::Client::new(),
            headers,
            labels: LabelMap::finbert(),
        })
    }

    pub fn with_model(mut self, base_url: &str, model: &str) -> Self {
        self.url = model_url(base_url, model);
        self
    }

    /// Replaces the id to label mapping; it must match the served model's
    /// `id2label`, since logits are ordered by it.
    pub fn with_labels(mut self, labels: LabelMap) -> Self {
        self.labels = labels;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn model_url(base_url: &str, model: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), model)
}

impl SentimentClassifier for FinbertAPI {
    fn labels(&self) -> &LabelMap {
        &self.labels
    }

    fn logits(&self, text: &str) -> Result<Vec<f64>, SentimentError> {
        debug!("logits | url: {}", self.url);

        let request = InferenceRequestJSON {
            inputs: text,
            parameters: InferenceParametersJSON {
                function_to_apply: "none",
                top_k: self.labels.len(),
            },
        };
        let network = |source| SentimentError::Network {
            url: self.url.clone(),
            source,
        };
        let body = self
            .client
            .post(&self.url)
            .headers(self.headers.clone())
            .json(&request)
            .send()
            .map_err(network)?
            .text()
            .map_err(network)?;

        let logits = parse_logits(&body, &self.labels)?;
        debug!("logits | values: {:?}", logits);
        Ok(logits)
    }
}

/// Orders the per-label scores of an inference response by class id.
pub fn parse_logits(body: &str, labels: &LabelMap) -> Result<Vec<f64>, SentimentError> {
    let scores = match serde_json::from_str::<InferenceResponseJSON>(body) {
        Ok(InferenceResponseJSON::Batched(mut batch)) => {
            if batch.is_empty() {
                Vec::new()
            } else {
                batch.swap_remove(0)
            }
        }
        Ok(InferenceResponseJSON::Flat(scores)) => scores,
        Ok(InferenceResponseJSON::Error { error }) => return Err(SentimentError::Service(error)),
        // untagged errors say nothing useful, report the array shape we wanted
        Err(_) => serde_json::from_str::<Vec<LabelScoreJSON>>(body)?,
    };

    let mut logits: Vec<Option<f64>> = vec![None; labels.len()];
    for entry in scores {
        let id = labels
            .id_of(&entry.label)
            .ok_or_else(|| SentimentError::UnknownLabel(entry.label.clone()))?;
        logits[id] = Some(entry.score);
    }

    logits
        .into_iter()
        .enumerate()
        .map(|(id, score)| {
            score.ok_or_else(|| {
                SentimentError::MissingLabel(labels.name(id).unwrap_or_default().to_string())
            })
        })
        .collect()
}
