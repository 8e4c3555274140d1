//! Local ONNX emotion classifiers with artefact verification.
//!
//! The configuration types are always available so model tables parse in
//! every build. Loading a model needs the `onnx` feature.
mod activation;
#[cfg(feature = "onnx")]
mod artefact;
#[cfg(feature = "onnx")]
mod classifier;
mod config;
#[cfg(feature = "onnx")]
mod errors;

pub use activation::ScoreActivation;
#[cfg(feature = "onnx")]
pub use artefact::compute_sha256;
#[cfg(feature = "onnx")]
pub use classifier::OnnxTextClassifier;
pub use config::{ArtefactConfig, OnnxModelConfig};
#[cfg(feature = "onnx")]
pub use errors::OnnxClassifierError;
