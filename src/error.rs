//! Errors returned by a prediction request.

use thiserror::Error;

use crate::{labels::LabelDecodeError, providers::InferenceError};

/// Reasons a prediction request fails.
///
/// None of these are recovered: the request returns no scores at all.
#[derive(Debug, Error)]
pub enum EnsembleError {
    /// A model failed while classifying the input.
    #[error(transparent)]
    Inference(#[from] InferenceError),
    /// A model reported a label the registry cannot resolve.
    #[error("label decoding failed: {0}")]
    LabelDecode(#[from] LabelDecodeError),
    /// A model reported a score outside `[0, 1]` or a non-finite score.
    #[error("model {model} reported invalid score {score} for label \"{label_id}\"")]
    InvalidScore {
        model: String,
        label_id: String,
        score: f32,
    },
    /// No model loaded, so there is nothing to average.
    #[error("no models are available to classify the input")]
    NoModelsAvailable,
}
