//! Hosted text-classification backend.
//!
//! Posts `{"inputs": text}` to `{endpoint}/{model_id}` and reads back the
//! `[{"label": ..., "score": ...}]` list that text-classification pipelines
//! return. Responses nested one level deeper, as produced for batched
//! inputs, are accepted too. A bearer token is read from the environment
//! variable named in the configuration.
//!
//! # Examples
//!
//! ```no_run
//! use emotion_ensemble::{ApiClassifier, TextProcessor, config::ApiModelConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = ApiModelConfig::new("shri171981/genai_project_deployment");
//! config.api_key_env = Some("HF_TOKEN".into());
//! let classifier = ApiClassifier::new(&config)?;
//! let predictions = classifier.process("I feel so lonely and empty inside.")?;
//! assert!(!predictions.is_empty());
//! # Ok(())
//! # }
//! ```

use std::{env, time::Duration};

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    config::ApiModelConfig,
    providers::{RawPrediction, TextProcessor},
};

/// Error returned by [`ApiClassifier`].
#[derive(Debug, Error)]
pub enum ApiClassifierError {
    /// The configured model identifier cannot form a URL path.
    #[error("invalid model id \"{0}\"")]
    InvalidModelId(String),
    /// The configured token variable is unset or empty.
    #[error("environment variable {name} holds no API key")]
    MissingApiKey { name: String },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// The endpoint returned no predictions.
    #[error("empty prediction list")]
    Empty,
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response was not a prediction list.
    #[error("invalid response")]
    InvalidResponse,
}

impl PartialEq for ApiClassifierError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidModelId(a), Self::InvalidModelId(b)) => a == b,
            (Self::MissingApiKey { name: a }, Self::MissingApiKey { name: b }) => a == b,
            _ => matches!(
                (self, other),
                (Self::Client(_), Self::Client(_))
                    | (Self::Empty, Self::Empty)
                    | (Self::Request(_), Self::Request(_))
                    | (Self::InvalidResponse, Self::InvalidResponse)
            ),
        }
    }
}

impl Eq for ApiClassifierError {}

#[derive(Serialize)]
struct ApiRequest<'a> {
    inputs: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Parameters>,
}

#[derive(Serialize)]
struct Parameters {
    top_k: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ApiResponse {
    Batched(Vec<Vec<RawPrediction>>),
    Flat(Vec<RawPrediction>),
}

impl ApiResponse {
    fn into_predictions(self) -> Vec<RawPrediction> {
        match self {
            Self::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
            Self::Flat(predictions) => predictions,
        }
    }
}

/// Emotion classifier backed by a hosted inference endpoint.
#[derive(Debug, Clone)]
pub struct ApiClassifier {
    client: Client,
    url: String,
    api_key: Option<String>,
    top_k: Option<usize>,
}

impl ApiClassifier {
    /// Create a classifier for the configured model.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClassifierError::InvalidModelId`] for blank identifiers or
    /// ones containing whitespace, [`ApiClassifierError::MissingApiKey`] when
    /// the token variable is unset, and [`ApiClassifierError::Client`] when the
    /// HTTP client cannot be built.
    pub fn new(config: &ApiModelConfig) -> Result<Self, ApiClassifierError> {
        let model_id = config.model_id.trim();
        if model_id.is_empty() || model_id.chars().any(char::is_whitespace) {
            return Err(ApiClassifierError::InvalidModelId(config.model_id.clone()));
        }
        let api_key = config
            .api_key_env
            .as_deref()
            .map(|name| match env::var(name) {
                Ok(key) if !key.trim().is_empty() => Ok(key),
                _ => Err(ApiClassifierError::MissingApiKey { name: name.into() }),
            })
            .transpose()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ApiClassifierError::Client)?;
        Ok(Self {
            client,
            url: format!("{}/{model_id}", config.endpoint.trim_end_matches('/')),
            api_key,
            top_k: config.top_k,
        })
    }

    /// Full URL requests are sent to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TextProcessor for ApiClassifier {
    type Output = Vec<RawPrediction>;
    type Error = ApiClassifierError;

    fn process(&self, input: &str) -> Result<Self::Output, Self::Error> {
        let body = ApiRequest {
            inputs: input,
            parameters: self.top_k.map(|top_k| Parameters { top_k }),
        };
        let mut req = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send()?.error_for_status()?;
        let predictions = resp
            .json::<ApiResponse>()
            .map_err(|_| ApiClassifierError::InvalidResponse)?
            .into_predictions();

        if predictions.is_empty() {
            return Err(ApiClassifierError::Empty);
        }
        if !predictions.iter().all(|p| p.score.is_finite()) {
            return Err(ApiClassifierError::InvalidResponse);
        }
        debug!(url = %self.url, count = predictions.len(), "received predictions");
        Ok(predictions)
    }
}
