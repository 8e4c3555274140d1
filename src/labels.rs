//! Emotion labels and the registry that maps classifier class indices onto
//! them.
//!
//! Classifiers report classes as opaque identifiers such as `LABEL_3`. The
//! [`LabelRegistry`] holds the deployment-time ordering that turns the numeric
//! suffix into an [`EmotionLabel`]. Decoding happens once, through
//! [`LabelRegistry::decode`], so the rest of the crate only sees validated
//! indices.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the fixed emotion categories reported by the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EmotionLabel {
    Anger,
    Fear,
    Joy,
    Sadness,
    Surprise,
}

impl EmotionLabel {
    /// Every label in the order the bundled classifiers were trained with.
    pub const ALL: [Self; 5] = [
        Self::Anger,
        Self::Fear,
        Self::Joy,
        Self::Sadness,
        Self::Surprise,
    ];

    /// Human-readable name of the label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anger => "Anger",
            Self::Fear => "Fear",
            Self::Joy => "Joy",
            Self::Sadness => "Sadness",
            Self::Surprise => "Surprise",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when a string names no known emotion.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("unknown emotion \"{0}\"")]
pub struct ParseEmotionError(pub String);

impl FromStr for EmotionLabel {
    type Err = ParseEmotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseEmotionError(s.to_owned()))
    }
}

/// Errors raised while turning a classifier label into a registry index.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LabelDecodeError {
    /// The label does not end in `_<n>` with `n` a non-negative integer.
    #[error("label \"{label_id}\" does not end in a class index")]
    Malformed { label_id: String },
    /// The class index is larger than the registry.
    #[error("label \"{label_id}\" has class index {index} but the registry holds {count} labels")]
    OutOfRange {
        label_id: String,
        index: usize,
        count: usize,
    },
}

/// Numeric class index parsed from a classifier label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassIndex(usize);

impl ClassIndex {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Parses the trailing `_<n>` suffix of a classifier label.
    ///
    /// Only the suffix after the final underscore is interpreted, so
    /// `LABEL_3` and `label_3` both yield index 3.
    ///
    /// # Errors
    ///
    /// Returns [`LabelDecodeError::Malformed`] when there is no underscore or
    /// the suffix is not made of ASCII digits.
    ///
    /// # Examples
    ///
    /// ```
    /// use emotion_ensemble::labels::ClassIndex;
    ///
    /// assert_eq!(ClassIndex::parse("LABEL_4").map(ClassIndex::get), Ok(4));
    /// assert!(ClassIndex::parse("LABEL_-1").is_err());
    /// ```
    pub fn parse(label_id: &str) -> Result<Self, LabelDecodeError> {
        let malformed = || LabelDecodeError::Malformed {
            label_id: label_id.to_owned(),
        };
        let (_, suffix) = label_id.rsplit_once('_').ok_or_else(malformed)?;
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        suffix.parse().map(Self).map_err(|_| malformed())
    }
}

/// Returned by [`LabelRegistry::name_of`] for an index past the end.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("class index {index} is outside the registry of {count} labels")]
pub struct IndexOutOfRange {
    pub index: usize,
    pub count: usize,
}

/// Errors raised when the configured label order is unusable.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RegistryError {
    #[error("label registry cannot be empty")]
    Empty,
    #[error("label {0} is listed more than once")]
    Duplicate(EmotionLabel),
    #[error("label {0} is missing from the registry")]
    Missing(EmotionLabel),
}

/// Ordered mapping from classifier class index to [`EmotionLabel`].
///
/// The order must match the label order the classifiers were trained with.
/// Nothing at runtime can verify that contract, so the registry is built once
/// from configuration and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRegistry {
    labels: Vec<EmotionLabel>,
}

impl LabelRegistry {
    /// Builds a registry from the training label order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the list is empty, repeats a label, or
    /// omits one of the known emotions.
    ///
    /// # Examples
    ///
    /// ```
    /// use emotion_ensemble::labels::{EmotionLabel, LabelRegistry};
    ///
    /// let registry = LabelRegistry::new(EmotionLabel::ALL.to_vec()).unwrap();
    /// assert_eq!(registry.name_of(2), Ok(EmotionLabel::Joy));
    /// ```
    pub fn new(labels: Vec<EmotionLabel>) -> Result<Self, RegistryError> {
        if labels.is_empty() {
            return Err(RegistryError::Empty);
        }
        for (position, label) in labels.iter().enumerate() {
            if labels.get(..position).is_some_and(|seen| seen.contains(label)) {
                return Err(RegistryError::Duplicate(*label));
            }
        }
        if let Some(missing) = EmotionLabel::ALL
            .into_iter()
            .find(|label| !labels.contains(label))
        {
            return Err(RegistryError::Missing(missing));
        }
        Ok(Self { labels })
    }

    /// Returns the label stored at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] when `index` is not below [`Self::len`].
    pub fn name_of(&self, index: usize) -> Result<EmotionLabel, IndexOutOfRange> {
        self.labels.get(index).copied().ok_or(IndexOutOfRange {
            index,
            count: self.labels.len(),
        })
    }

    /// Parses a classifier label and checks it against the registry.
    ///
    /// # Errors
    ///
    /// Returns [`LabelDecodeError::Malformed`] for labels without a numeric
    /// suffix and [`LabelDecodeError::OutOfRange`] for indices the registry
    /// does not hold.
    pub fn decode(&self, label_id: &str) -> Result<ClassIndex, LabelDecodeError> {
        let index = ClassIndex::parse(label_id)?;
        self.name_of(index.get())
            .map(|_| index)
            .map_err(|IndexOutOfRange { index, count }| LabelDecodeError::OutOfRange {
                label_id: label_id.to_owned(),
                index,
                count,
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in class-index order.
    #[must_use]
    pub fn labels(&self) -> &[EmotionLabel] {
        &self.labels
    }
}

impl Default for LabelRegistry {
    fn default() -> Self {
        Self {
            labels: EmotionLabel::ALL.to_vec(),
        }
    }
}
