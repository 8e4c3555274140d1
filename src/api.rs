use serde::Serialize;

use crate::{
    ensemble::EnsembleService, error::EnsembleError, labels::EmotionLabel, scores::ScoreMapping,
};

/// Diagnostic record of one prediction.
///
/// # Examples
///
/// ```
/// use emotion_ensemble::api::{EmotionPredictor, Prediction};
/// use emotion_ensemble::error::EnsembleError;
/// use emotion_ensemble::scores::ScoreMapping;
///
/// struct Nothing;
///
/// impl EmotionPredictor for Nothing {
///     type Error = EnsembleError;
///
///     fn predict(&self, _text: &str) -> Result<ScoreMapping, Self::Error> {
///         Err(EnsembleError::NoModelsAvailable)
///     }
/// }
///
/// assert!(Nothing.trace("hi").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub text: String,
    pub scores: ScoreMapping,
    /// Most confident emotion.
    pub dominant: Option<EmotionLabel>,
}

/// Anything that maps text to per-emotion scores.
pub trait EmotionPredictor {
    /// Error type returned when prediction fails.
    type Error: std::error::Error + Send + Sync;

    /// Score every emotion for `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if prediction fails.
    fn predict(&self, text: &str) -> Result<ScoreMapping, Self::Error>;

    /// Produce a diagnostic record for `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if prediction fails.
    fn trace(&self, text: &str) -> Result<Prediction, Self::Error> {
        let scores = self.predict(text)?;
        Ok(Prediction {
            text: text.to_owned(),
            dominant: scores.dominant().map(|(label, _)| label),
            scores,
        })
    }
}

impl EmotionPredictor for EnsembleService {
    type Error = EnsembleError;

    fn predict(&self, text: &str) -> Result<ScoreMapping, Self::Error> {
        EnsembleService::predict(self, text)
    }
}
