//! The ensemble service: a fixed set of loaded models behind one predict call.
//!
//! Models are loaded once. A model that fails to load is logged and left out;
//! the remaining models still serve requests. A service with no models loads
//! successfully but fails every prediction with
//! [`EnsembleError::NoModelsAvailable`].

use tracing::{debug, info, warn};

use crate::{
    aggregation::{ModelOutput, ScoreAggregator},
    config::{ConfigError, EnsembleConfig},
    error::EnsembleError,
    labels::LabelRegistry,
    providers::{ModelAdapter, ModelLoadError, load_model},
    scores::ScoreMapping,
};

/// Loaded models plus the registry used to decode their labels.
///
/// The service holds no mutable state, so one instance can serve requests
/// from many threads.
#[derive(Debug)]
pub struct EnsembleService {
    registry: LabelRegistry,
    models: Vec<ModelAdapter>,
    failures: Vec<ModelLoadError>,
}

impl EnsembleService {
    /// Loads every model in `config`.
    ///
    /// Individual load failures are kept for [`Self::load_failures`] rather
    /// than returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Registry`] when the label order is invalid.
    pub fn load(config: &EnsembleConfig) -> Result<Self, ConfigError> {
        let registry = config.registry()?;
        let outcomes = config.models.iter().map(load_model).collect();
        Ok(Self::from_outcomes(registry, outcomes))
    }

    /// Builds a service from already attempted loads.
    #[must_use]
    pub fn from_outcomes(
        registry: LabelRegistry,
        outcomes: Vec<Result<ModelAdapter, ModelLoadError>>,
    ) -> Self {
        let mut models = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(model) => {
                    info!(model = model.id(), "model ready");
                    models.push(model);
                }
                Err(err) => {
                    warn!(model = err.model(), error = %err, "model failed to load; skipping");
                    failures.push(err);
                }
            }
        }
        if models.is_empty() {
            warn!("no models loaded; every prediction will fail");
        } else {
            info!(active = models.len(), failed = failures.len(), "ensemble ready");
        }
        Self {
            registry,
            models,
            failures,
        }
    }

    /// Builds a service from adapters that are already loaded.
    #[must_use]
    pub fn from_models(registry: LabelRegistry, models: Vec<ModelAdapter>) -> Self {
        Self::from_outcomes(registry, models.into_iter().map(Ok).collect())
    }

    /// Classifies `text` with every active model and averages the scores.
    ///
    /// Empty text is passed to the models unchanged; whether it is accepted
    /// is up to each backend.
    ///
    /// # Errors
    ///
    /// - [`EnsembleError::NoModelsAvailable`] when no model loaded.
    /// - [`EnsembleError::Inference`] when any model fails. No partial result
    ///   is produced.
    /// - [`EnsembleError::LabelDecode`] or [`EnsembleError::InvalidScore`] when
    ///   a model's output cannot be aggregated.
    pub fn predict(&self, text: &str) -> Result<ScoreMapping, EnsembleError> {
        if self.models.is_empty() {
            return Err(EnsembleError::NoModelsAvailable);
        }
        let outputs = self
            .models
            .iter()
            .map(|model| {
                let predictions = model.classify(text)?;
                debug!(model = model.id(), ?predictions, "raw predictions");
                Ok(ModelOutput::new(model.id(), predictions))
            })
            .collect::<Result<Vec<_>, EnsembleError>>()?;
        ScoreAggregator::new(&self.registry).aggregate(&outputs)
    }

    #[must_use]
    pub fn active_model_count(&self) -> usize {
        self.models.len()
    }

    /// Identifiers of the models that loaded, in configuration order.
    pub fn active_models(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(ModelAdapter::id)
    }

    /// Models that were configured but failed to load.
    #[must_use]
    pub fn load_failures(&self) -> &[ModelLoadError] {
        &self.failures
    }

    #[must_use]
    pub fn registry(&self) -> &LabelRegistry {
        &self.registry
    }
}
