//! Conversion of raw logits into per-class confidences.

use serde::{Deserialize, Serialize};

/// How a model's logits become scores in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreActivation {
    /// Normalise across classes so scores sum to one.
    #[default]
    Softmax,
    /// Squash each logit independently, for multi-label heads.
    Sigmoid,
}

impl ScoreActivation {
    /// Applies the activation to `logits`.
    ///
    /// Softmax subtracts the largest logit first so large values do not
    /// overflow.
    #[must_use]
    pub fn apply(self, logits: &[f32]) -> Vec<f32> {
        match self {
            Self::Softmax => softmax(logits),
            Self::Sigmoid => logits.iter().copied().map(logistic).collect(),
        }
    }
}

#[expect(clippy::float_arithmetic, reason = "softmax requires float operations")]
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|value| (value - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|value| value / sum).collect()
}

#[expect(clippy::float_arithmetic, reason = "sigmoid requires float operations")]
fn logistic(value: f32) -> f32 {
    1.0 / (1.0 + (-value).exp())
}
