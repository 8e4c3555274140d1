//! Helpers shared by the integration tests.
#![allow(dead_code, reason = "each test binary uses a different subset")]

use emotion_ensemble::{ModelAdapter, RawPrediction, TextProcessor};
use thiserror::Error;

#[expect(clippy::float_arithmetic, reason = "tolerance comparison")]
#[must_use]
pub fn approx_eq(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() < tol
}

/// Classifier that returns the same predictions for every input.
#[derive(Debug, Clone)]
pub struct StubClassifier {
    predictions: Vec<RawPrediction>,
}

impl StubClassifier {
    /// Scores given in class-index order become `LABEL_<i>` predictions.
    #[must_use]
    pub fn from_scores(scores: &[f32]) -> Self {
        Self {
            predictions: scores
                .iter()
                .enumerate()
                .map(|(index, score)| RawPrediction::new(format!("LABEL_{index}"), *score))
                .collect(),
        }
    }

    #[must_use]
    pub fn from_predictions(predictions: Vec<RawPrediction>) -> Self {
        Self { predictions }
    }
}

impl TextProcessor for StubClassifier {
    type Output = Vec<RawPrediction>;
    type Error = StubError;

    fn process(&self, _input: &str) -> Result<Self::Output, Self::Error> {
        Ok(self.predictions.clone())
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StubError {
    #[error("stub classifier failure")]
    Failure,
}

/// Classifier that fails every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingClassifier;

impl TextProcessor for FailingClassifier {
    type Output = Vec<RawPrediction>;
    type Error = StubError;

    fn process(&self, _input: &str) -> Result<Self::Output, Self::Error> {
        Err(StubError::Failure)
    }
}

#[must_use]
pub fn stub_model(id: &str, scores: &[f32]) -> ModelAdapter {
    ModelAdapter::new(id, StubClassifier::from_scores(scores))
}

#[must_use]
pub fn failing_model(id: &str) -> ModelAdapter {
    ModelAdapter::new(id, FailingClassifier)
}
