use std::sync::{Arc, Mutex};

use ort::{session::Session, value::TensorRef};
use tokenizers::{
    PaddingDirection, PaddingParams, PaddingStrategy, Tokenizer, TruncationDirection,
    TruncationParams, TruncationStrategy,
};
use tracing::{debug, info};

use super::{activation::ScoreActivation, config::OnnxModelConfig, errors::OnnxClassifierError};
use crate::providers::{RawPrediction, TextProcessor};

/// Sequence classifier executed in-process with ONNX Runtime.
///
/// Emits one `LABEL_<i>` prediction per logit, with `i` the position in the
/// output tensor.
#[derive(Debug)]
pub struct OnnxTextClassifier {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    input_names: Arc<Vec<String>>,
    output_name: String,
    max_sequence_length: usize,
    label_count: usize,
    activation: ScoreActivation,
}

impl OnnxTextClassifier {
    /// Builds an ONNX classifier from the supplied configuration.
    ///
    /// # Errors
    ///
    /// Returns configuration and runtime errors when artefacts cannot be verified, tokeniser setup fails, or the ONNX session cannot be created.
    ///
    /// # Examples
    /// ```no_run
    /// use emotion_ensemble::providers::onnx::{
    ///     ArtefactConfig, OnnxClassifierError, OnnxModelConfig, OnnxTextClassifier,
    /// };
    /// use emotion_ensemble::providers::TextProcessor;
    ///
    /// # fn main() -> Result<(), OnnxClassifierError> {
    /// let config = OnnxModelConfig::new(
    ///     ArtefactConfig::new(
    ///         "/models/emotion.onnx",
    ///         "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef",
    ///     ),
    ///     ArtefactConfig::new(
    ///         "/models/tokenizer.json",
    ///         "fedcba9876543210fedcba9876543210fedcba9876543210fedcba9876543210",
    ///     ),
    /// );
    /// let classifier = OnnxTextClassifier::new(config)?;
    /// let predictions = classifier.process("I finally got the promotion!")?;
    /// # println!("{predictions:?}");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: OnnxModelConfig) -> Result<Self, OnnxClassifierError> {
        if config.max_sequence_length == 0 {
            return Err(OnnxClassifierError::ZeroSequenceLength);
        }
        if config.input_names.len() < 2 {
            return Err(OnnxClassifierError::InsufficientInputNames {
                expected: 2,
                actual: config.input_names.len(),
            });
        }
        if config.output_name.trim().is_empty() {
            return Err(OnnxClassifierError::MissingOutputName);
        }
        if config.label_count == 0 {
            return Err(OnnxClassifierError::ZeroLabelCount);
        }

        config.model.verify()?;
        config.tokenizer.verify()?;

        let mut tokenizer = Tokenizer::from_file(&config.tokenizer.path).map_err(|source| {
            OnnxClassifierError::LoadTokenizer {
                path: config.tokenizer.path.clone(),
                source,
            }
        })?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_sequence_length,
                strategy: TruncationStrategy::OnlyFirst,
                stride: 0,
                direction: TruncationDirection::Right,
            }))
            .map_err(OnnxClassifierError::ConfigureTruncation)?;

        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(config.max_sequence_length),
            direction: PaddingDirection::Right,
            pad_to_multiple_of: None,
            pad_id: config.pad_id,
            pad_type_id: 0,
            pad_token: config.pad_token.clone(),
        }));

        let session = Session::builder()
            .map_err(OnnxClassifierError::CreateSessionBuilder)?
            .commit_from_file(&config.model.path)
            .map_err(OnnxClassifierError::CreateSession)?;

        info!(
            model = %config.model.path.display(),
            labels = config.label_count,
            "loaded ONNX classifier"
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            input_names: Arc::new(config.input_names),
            output_name: config.output_name,
            max_sequence_length: config.max_sequence_length,
            label_count: config.label_count,
            activation: config.activation,
        })
    }

    fn logits(&self, input: &str) -> Result<Vec<f32>, OnnxClassifierError> {
        let encoding = self
            .tokenizer
            .encode(input, true)
            .map_err(OnnxClassifierError::Encode)?;

        let ids = encoding.get_ids();
        let attention = encoding.get_attention_mask();

        for actual in [ids.len(), attention.len()] {
            if actual != self.max_sequence_length {
                return Err(OnnxClassifierError::SequenceLength {
                    expected: self.max_sequence_length,
                    actual,
                });
            }
        }

        let ids_vec: Vec<i64> = ids.iter().map(|id| i64::from(*id)).collect();
        let attention_vec: Vec<i64> = attention.iter().map(|id| i64::from(*id)).collect();

        let ids_tensor =
            TensorRef::from_array_view(([1usize, self.max_sequence_length], ids_vec.as_slice()))
                .map_err(OnnxClassifierError::EncodeTensor)?;
        let attention_tensor = TensorRef::from_array_view((
            [1usize, self.max_sequence_length],
            attention_vec.as_slice(),
        ))
        .map_err(OnnxClassifierError::EncodeTensor)?;

        let (input_ids_name, attention_mask_name) =
            match (self.input_names.first(), self.input_names.get(1)) {
                (Some(ids), Some(attention)) => (ids.as_str(), attention.as_str()),
                _ => {
                    return Err(OnnxClassifierError::InsufficientInputNames {
                        expected: 2,
                        actual: self.input_names.len(),
                    });
                }
            };

        let mut session = self
            .session
            .lock()
            .map_err(|_| OnnxClassifierError::SessionPoisoned)?;

        let outputs = session
            .run(ort::inputs! {
                input_ids_name => ids_tensor,
                attention_mask_name => attention_tensor,
            })
            .map_err(OnnxClassifierError::Inference)?;

        let logits_value =
            outputs
                .get(&self.output_name)
                .ok_or_else(|| OnnxClassifierError::OutputMissing {
                    name: self.output_name.clone(),
                })?;
        let (_, logits) = logits_value
            .try_extract_tensor::<f32>()
            .map_err(OnnxClassifierError::Inference)?;

        if logits.len() != self.label_count {
            return Err(OnnxClassifierError::UnexpectedLogitCount {
                name: self.output_name.clone(),
                expected: self.label_count,
                actual: logits.len(),
            });
        }
        Ok(logits.to_vec())
    }
}

impl TextProcessor for OnnxTextClassifier {
    type Output = Vec<RawPrediction>;
    type Error = OnnxClassifierError;

    fn process(&self, input: &str) -> Result<Self::Output, Self::Error> {
        let logits = self.logits(input)?;
        let scores = self.activation.apply(&logits);
        debug!(output = %self.output_name, ?scores, "ONNX classifier scores");
        Ok(scores
            .into_iter()
            .enumerate()
            .map(|(index, score)| RawPrediction::new(format!("LABEL_{index}"), score))
            .collect())
    }
}
