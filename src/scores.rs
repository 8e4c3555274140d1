//! Per-emotion confidence scores returned by a prediction.

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::labels::{EmotionLabel, LabelRegistry};

/// Confidence per emotion, in registry order.
///
/// Every label in the registry appears exactly once. Instances are built only
/// by the aggregator, so the key set cannot drift from the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMapping {
    scores: Vec<(EmotionLabel, f32)>,
}

impl ScoreMapping {
    /// Pairs each registry label with the value at the same index.
    pub(crate) fn from_registry(registry: &LabelRegistry, values: impl IntoIterator<Item = f32>) -> Self {
        Self {
            scores: registry.labels().iter().copied().zip(values).collect(),
        }
    }

    /// Confidence for `label`, if the registry holds it.
    #[must_use]
    pub fn get(&self, label: EmotionLabel) -> Option<f32> {
        self.scores
            .iter()
            .find_map(|(candidate, score)| (*candidate == label).then_some(*score))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, f32)> + '_ {
        self.scores.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Scores sorted from most to least confident. Ties keep registry order.
    #[must_use]
    pub fn ranked(&self) -> Vec<(EmotionLabel, f32)> {
        let mut ranked = self.scores.clone();
        ranked.sort_by(|(_, a), (_, b)| b.total_cmp(a));
        ranked
    }

    /// The most confident emotion.
    #[must_use]
    pub fn dominant(&self) -> Option<(EmotionLabel, f32)> {
        self.ranked().first().copied()
    }
}

impl Serialize for ScoreMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.scores.len()))?;
        for (label, score) in &self.scores {
            map.serialize_entry(label, score)?;
        }
        map.end()
    }
}
