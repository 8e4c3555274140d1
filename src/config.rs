//! Ensemble configuration: the label order and the models to load.
//!
//! The configuration lives under an `[ensemble]` table so it can share a file
//! with the CLI settings:
//!
//! ```toml
//! [ensemble]
//! labels = ["Anger", "Fear", "Joy", "Sadness", "Surprise"]
//!
//! [[ensemble.models]]
//! backend = "api"
//! model_id = "shri171981/genai_project_deployment"
//! api_key_env = "HF_TOKEN"
//! ```

use std::path::Path;

use figment::{
    Figment,
    providers::{Format, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    labels::{EmotionLabel, LabelRegistry, RegistryError},
    providers::onnx::OnnxModelConfig,
};

/// Default inference endpoint for hosted models.
pub const DEFAULT_API_ENDPOINT: &str = "https://router.huggingface.co/hf-inference/models";

/// Errors raised while reading or validating the ensemble configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load ensemble configuration: {0}")]
    Load(Box<figment::Error>),
    #[error("ensemble configuration lists no models")]
    NoModels,
    #[error("invalid label order: {0}")]
    Registry(#[from] RegistryError),
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Load(Box::new(value))
    }
}

/// Top-level ensemble configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnsembleConfig {
    /// Emotion for each class index, in training order.
    #[serde(default = "canonical_labels")]
    pub labels: Vec<EmotionLabel>,
    /// Models to load, in order.
    #[serde(default)]
    pub models: Vec<ModelSpec>,
}

fn canonical_labels() -> Vec<EmotionLabel> {
    EmotionLabel::ALL.to_vec()
}

impl EnsembleConfig {
    /// Configuration with the canonical label order and the given models.
    #[must_use]
    pub fn new(models: Vec<ModelSpec>) -> Self {
        Self {
            labels: canonical_labels(),
            models,
        }
    }

    /// Reads the `[ensemble]` table of a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when the file is missing or malformed and
    /// the validation errors of [`Self::validate`].
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Toml::file_exact(path))
            .extract_inner::<Self>("ensemble")?
            .validate()
    }

    /// Parses the `[ensemble]` table from TOML text.
    ///
    /// # Errors
    ///
    /// As for [`Self::load_from_file`].
    ///
    /// # Examples
    ///
    /// ```
    /// use emotion_ensemble::config::{EnsembleConfig, ModelSpec};
    ///
    /// let config = EnsembleConfig::from_toml_str(
    ///     r#"
    ///     [[ensemble.models]]
    ///     backend = "api"
    ///     model_id = "org/emotion-model"
    ///     "#,
    /// )
    /// .unwrap();
    /// assert!(matches!(config.models.as_slice(), [ModelSpec::Api(_)]));
    /// ```
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Toml::string(toml))
            .extract_inner::<Self>("ensemble")?
            .validate()
    }

    /// Checks that at least one model is listed and the label order is a
    /// permutation of every emotion.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoModels`] or [`ConfigError::Registry`].
    #[must_use = "Validation should not be ignored"]
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.models.is_empty() {
            return Err(ConfigError::NoModels);
        }
        self.registry()?;
        Ok(self)
    }

    /// Builds the label registry from the configured order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Registry`] when the order is not a permutation
    /// of every emotion.
    pub fn registry(&self) -> Result<LabelRegistry, ConfigError> {
        LabelRegistry::new(self.labels.clone()).map_err(Into::into)
    }
}

/// One model in the ensemble, tagged by the backend that runs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum ModelSpec {
    /// Hosted text-classification endpoint.
    Api(ApiModelConfig),
    /// Local ONNX export.
    Onnx(OnnxModelConfig),
}

impl ModelSpec {
    /// Identifier used in logs and error messages.
    #[must_use]
    pub fn identifier(&self) -> String {
        match self {
            Self::Api(config) => config.model_id.clone(),
            Self::Onnx(config) => config.identifier(),
        }
    }
}

/// Hosted text-classification model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiModelConfig {
    /// Repository-style model identifier, e.g. `org/model`.
    pub model_id: String,
    /// Base URL; the model id is appended as a path.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Environment variable holding the bearer token.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Number of classes to request; the server decides when unset.
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiModelConfig {
    #[must_use]
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            endpoint: default_endpoint(),
            api_key_env: None,
            top_k: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_API_ENDPOINT.into()
}

const fn default_timeout_secs() -> u64 {
    30
}
