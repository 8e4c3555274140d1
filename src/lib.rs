//! Emotion classification by averaging an ensemble of text classifiers.
//!
//! Each model returns `LABEL_<n>` scores; the [`LabelRegistry`] maps class
//! indices to [`EmotionLabel`]s and the [`ScoreAggregator`] averages scores
//! across models into one [`ScoreMapping`].

pub mod aggregation;
pub mod api;
#[cfg(feature = "provider-api")]
pub mod api_classifier;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ensemble;
pub mod error;
pub mod labels;
pub mod providers;
pub mod scores;

pub use aggregation::{ModelOutput, ScoreAggregator};
pub use api::{EmotionPredictor, Prediction};
#[cfg(feature = "provider-api")]
pub use api_classifier::{ApiClassifier, ApiClassifierError};
#[cfg(feature = "cli")]
pub use cli::EmocArgs;
pub use config::{ApiModelConfig, ConfigError, EnsembleConfig, ModelSpec};
pub use ensemble::EnsembleService;
pub use error::EnsembleError;
pub use labels::{EmotionLabel, LabelDecodeError, LabelRegistry, RegistryError};
pub use providers::{
    InferenceError, ModelAdapter, ModelLoadError, RawPrediction, TextProcessor, load_model,
};
pub use scores::ScoreMapping;

#[cfg(test)]
mod tests;
