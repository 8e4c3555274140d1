//! Classifier backends and the uniform adapter the ensemble drives.
//!
//! Every backend implements [`TextProcessor`] with
//! `Output = Vec<RawPrediction>`. The ensemble only ever holds
//! [`ModelAdapter`] values, so backends with different error types can sit in
//! one collection.

use std::{error::Error as StdError, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ModelSpec;

pub mod onnx;

/// Boxed error produced by a backend.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Processes text to produce a structured, thread-safe output.
///
/// Backends implement this once; the ensemble wraps them in a
/// [`ModelAdapter`] to erase the concrete error type.
pub trait TextProcessor {
    /// Structured result returned by the processor.
    ///
    /// Outputs must be `Send + Sync + 'static` so they can be safely shared
    /// across threads and stored in trait objects without borrowing.
    type Output: Send + Sync + 'static;
    /// Error type returned when processing fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Process the supplied text.
    ///
    /// # Errors
    ///
    /// Returns an error if processing fails.
    fn process(&self, input: &str) -> Result<Self::Output, Self::Error>;
}

/// One `(label, score)` pair as reported by a classifier.
///
/// The label is opaque until the aggregator decodes it against the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    #[serde(rename = "label")]
    pub label_id: String,
    pub score: f32,
}

impl RawPrediction {
    #[must_use]
    pub fn new(label_id: impl Into<String>, score: f32) -> Self {
        Self {
            label_id: label_id.into(),
            score,
        }
    }
}

/// Error raised when a model fails to classify an input.
#[derive(Debug, Error)]
#[error("model {model} failed to classify input: {source}")]
pub struct InferenceError {
    pub model: String,
    #[source]
    pub source: BoxError,
}

/// Error raised while constructing a model from its [`ModelSpec`].
#[derive(Debug, Error)]
pub enum ModelLoadError {
    /// The crate was built without the feature the backend needs.
    #[error("model {model} needs the {backend} backend, which this build does not include")]
    BackendUnavailable { model: String, backend: &'static str },
    /// The backend rejected the configuration or its artefacts.
    #[error("failed to load model {model}: {source}")]
    Backend {
        model: String,
        #[source]
        source: BoxError,
    },
}

impl ModelLoadError {
    /// Identifier of the model that failed to load.
    #[must_use]
    pub fn model(&self) -> &str {
        match self {
            Self::BackendUnavailable { model, .. } | Self::Backend { model, .. } => model,
        }
    }
}

trait ErasedClassifier: Send + Sync {
    fn classify(&self, input: &str) -> Result<Vec<RawPrediction>, BoxError>;
}

impl<P> ErasedClassifier for P
where
    P: TextProcessor<Output = Vec<RawPrediction>> + Send + Sync,
{
    fn classify(&self, input: &str) -> Result<Vec<RawPrediction>, BoxError> {
        self.process(input).map_err(Into::into)
    }
}

/// A loaded classifier with a stable identifier.
pub struct ModelAdapter {
    id: String,
    inner: Box<dyn ErasedClassifier>,
}

impl ModelAdapter {
    /// Wraps any backend that yields raw predictions.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::convert::Infallible;
    /// use emotion_ensemble::providers::{ModelAdapter, RawPrediction, TextProcessor};
    ///
    /// struct AlwaysJoy;
    ///
    /// impl TextProcessor for AlwaysJoy {
    ///     type Output = Vec<RawPrediction>;
    ///     type Error = Infallible;
    ///
    ///     fn process(&self, _input: &str) -> Result<Self::Output, Self::Error> {
    ///         Ok(vec![RawPrediction::new("LABEL_2", 1.0)])
    ///     }
    /// }
    ///
    /// let adapter = ModelAdapter::new("always-joy", AlwaysJoy);
    /// assert_eq!(adapter.classify("hi").unwrap()[0].label_id, "LABEL_2");
    /// ```
    pub fn new<P>(id: impl Into<String>, classifier: P) -> Self
    where
        P: TextProcessor<Output = Vec<RawPrediction>> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            inner: Box::new(classifier),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Runs the wrapped classifier.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError`] carrying this adapter's identifier when the
    /// backend fails.
    pub fn classify(&self, input: &str) -> Result<Vec<RawPrediction>, InferenceError> {
        self.inner.classify(input).map_err(|source| InferenceError {
            model: self.id.clone(),
            source,
        })
    }
}

impl fmt::Debug for ModelAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelAdapter")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Builds the backend described by `spec`.
///
/// # Errors
///
/// Returns [`ModelLoadError::BackendUnavailable`] when the backend's feature
/// is disabled and [`ModelLoadError::Backend`] when the backend rejects its
/// configuration.
pub fn load_model(spec: &ModelSpec) -> Result<ModelAdapter, ModelLoadError> {
    let id = spec.identifier();
    match spec {
        ModelSpec::Api(config) => load_api(id, config),
        ModelSpec::Onnx(config) => load_onnx(id, config),
    }
}

#[cfg(feature = "provider-api")]
fn load_api(
    id: String,
    config: &crate::config::ApiModelConfig,
) -> Result<ModelAdapter, ModelLoadError> {
    crate::api_classifier::ApiClassifier::new(config)
        .map(|classifier| ModelAdapter::new(id.clone(), classifier))
        .map_err(|source| ModelLoadError::Backend {
            model: id,
            source: Box::new(source),
        })
}

#[cfg(not(feature = "provider-api"))]
fn load_api(
    id: String,
    _config: &crate::config::ApiModelConfig,
) -> Result<ModelAdapter, ModelLoadError> {
    Err(ModelLoadError::BackendUnavailable {
        model: id,
        backend: "provider-api",
    })
}

#[cfg(feature = "onnx")]
fn load_onnx(id: String, config: &onnx::OnnxModelConfig) -> Result<ModelAdapter, ModelLoadError> {
    onnx::OnnxTextClassifier::new(config.clone())
        .map(|classifier| ModelAdapter::new(id.clone(), classifier))
        .map_err(|source| ModelLoadError::Backend {
            model: id,
            source: Box::new(source),
        })
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(id: String, _config: &onnx::OnnxModelConfig) -> Result<ModelAdapter, ModelLoadError> {
    Err(ModelLoadError::BackendUnavailable {
        model: id,
        backend: "onnx",
    })
}
