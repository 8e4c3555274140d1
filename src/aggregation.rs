//! Averaging of raw classifier outputs into one [`ScoreMapping`].
//!
//! The aggregator is the only place where classifier labels are decoded and
//! scores combined. A single model is the `N = 1` case of the same algorithm:
//! the divisor is the number of contributing outputs, which for one model
//! leaves every score unchanged.

use tracing::debug;

use crate::{
    error::EnsembleError,
    labels::LabelRegistry,
    providers::RawPrediction,
    scores::ScoreMapping,
};

/// Predictions returned by one model for one input.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    /// Identifier of the model that produced the predictions.
    pub model: String,
    pub predictions: Vec<RawPrediction>,
}

impl ModelOutput {
    #[must_use]
    pub fn new(model: impl Into<String>, predictions: Vec<RawPrediction>) -> Self {
        Self {
            model: model.into(),
            predictions,
        }
    }
}

/// Combines model outputs by averaging each emotion's score.
#[derive(Debug, Clone, Copy)]
pub struct ScoreAggregator<'a> {
    registry: &'a LabelRegistry,
}

impl<'a> ScoreAggregator<'a> {
    #[must_use]
    pub fn new(registry: &'a LabelRegistry) -> Self {
        Self { registry }
    }

    /// Averages the scores of every output per emotion.
    ///
    /// A label a model does not report counts as zero for that model, and a
    /// label it reports more than once contributes every score. Scores
    /// are summed in `f64` and narrowed once, so a single output comes back
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - [`EnsembleError::NoModelsAvailable`] when `outputs` is empty.
    /// - [`EnsembleError::LabelDecode`] when a label is malformed or outside
    ///   the registry.
    /// - [`EnsembleError::InvalidScore`] when a score is non-finite or outside
    ///   `[0, 1]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use emotion_ensemble::aggregation::{ModelOutput, ScoreAggregator};
    /// use emotion_ensemble::labels::{EmotionLabel, LabelRegistry};
    /// use emotion_ensemble::providers::RawPrediction;
    ///
    /// let registry = LabelRegistry::default();
    /// let outputs = [
    ///     ModelOutput::new("a", vec![RawPrediction::new("LABEL_2", 0.5)]),
    ///     ModelOutput::new("b", vec![RawPrediction::new("LABEL_2", 1.0)]),
    /// ];
    /// let scores = ScoreAggregator::new(&registry).aggregate(&outputs).unwrap();
    /// assert_eq!(scores.get(EmotionLabel::Joy), Some(0.75));
    /// assert_eq!(scores.get(EmotionLabel::Anger), Some(0.0));
    /// ```
    pub fn aggregate(&self, outputs: &[ModelOutput]) -> Result<ScoreMapping, EnsembleError> {
        if outputs.is_empty() {
            return Err(EnsembleError::NoModelsAvailable);
        }

        let mut totals = vec![0.0_f64; self.registry.len()];
        for output in outputs {
            self.accumulate(output, &mut totals)?;
        }

        #[expect(
            clippy::cast_precision_loss,
            reason = "model counts are far below f64 precision limits"
        )]
        let count = outputs.len() as f64;
        debug!(models = outputs.len(), "averaging model outputs");

        #[expect(
            clippy::cast_possible_truncation,
            reason = "averages of [0, 1] scores fit in f32"
        )]
        let averages = totals.into_iter().map(|total| {
            #[expect(clippy::float_arithmetic, reason = "averaging scores")]
            let mean = total / count;
            mean as f32
        });
        Ok(ScoreMapping::from_registry(self.registry, averages))
    }

    #[expect(clippy::float_arithmetic, reason = "summing scores")]
    fn accumulate(&self, output: &ModelOutput, totals: &mut [f64]) -> Result<(), EnsembleError> {
        for prediction in &output.predictions {
            let index = self.registry.decode(&prediction.label_id)?.get();
            if !(prediction.score.is_finite() && (0.0..=1.0).contains(&prediction.score)) {
                return Err(EnsembleError::InvalidScore {
                    model: output.model.clone(),
                    label_id: prediction.label_id.clone(),
                    score: prediction.score,
                });
            }
            if let Some(total) = totals.get_mut(index) {
                *total += f64::from(prediction.score);
            }
        }
        Ok(())
    }
}
