//! Configuration for locally executed ONNX emotion classifiers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::activation::ScoreActivation;

/// File-based artefact that must match a recorded checksum before loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtefactConfig {
    /// Location of the artefact on disk.
    pub path: PathBuf,
    /// Expected SHA-256 checksum expressed as hexadecimal.
    pub sha256: String,
}

impl ArtefactConfig {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, sha256: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sha256: sha256.into(),
        }
    }
}

/// Configuration for an ONNX sequence classifier with one logit per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OnnxModelConfig {
    /// Identifier used in logs; defaults to the model path.
    #[serde(default)]
    pub name: Option<String>,
    /// Model artefact (ONNX graph) to load.
    pub model: ArtefactConfig,
    /// Tokeniser artefact consumed by `tokenizers`.
    pub tokenizer: ArtefactConfig,
    /// Input names for token ids and attention mask, in that order.
    #[serde(default = "default_input_names")]
    pub input_names: Vec<String>,
    #[serde(default = "default_output_name")]
    pub output_name: String,
    /// Inputs are padded and truncated to this many tokens.
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: usize,
    #[serde(default = "default_pad_token")]
    pub pad_token: String,
    #[serde(default)]
    pub pad_id: u32,
    /// Number of logits the classification head emits.
    #[serde(default = "default_label_count")]
    pub label_count: usize,
    #[serde(default)]
    pub activation: ScoreActivation,
}

impl OnnxModelConfig {
    /// Configuration with the defaults used by BERT-style exports.
    #[must_use]
    pub fn new(model: ArtefactConfig, tokenizer: ArtefactConfig) -> Self {
        Self {
            name: None,
            model,
            tokenizer,
            input_names: default_input_names(),
            output_name: default_output_name(),
            max_sequence_length: default_max_sequence_length(),
            pad_token: default_pad_token(),
            pad_id: 0,
            label_count: default_label_count(),
            activation: ScoreActivation::default(),
        }
    }

    /// Name reported in logs and errors.
    #[must_use]
    pub fn identifier(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.model.path.display().to_string())
    }
}

fn default_input_names() -> Vec<String> {
    vec!["input_ids".into(), "attention_mask".into()]
}

fn default_output_name() -> String {
    "logits".into()
}

const fn default_max_sequence_length() -> usize {
    512
}

fn default_pad_token() -> String {
    "[PAD]".into()
}

const fn default_label_count() -> usize {
    5
}
