//! CLI argument types, layered configuration and terminal rendering for the
//! `emoc` binary.
//! Loads from CLI args, environment (prefix `EMOC_`), and an optional config
//! file.

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use ortho_config::{OrthoResult, OrthoResultExt};
use serde::Deserialize;

use crate::{ensemble::EnsembleService, scores::ScoreMapping};

const BAR_WIDTH: usize = 30;

/// Command-line arguments for the `emoc` binary.
///
/// The same TOML file can hold these settings at the top level and the
/// ensemble itself under `[ensemble]`.
///
/// # Examples
///
/// Parse flags directly:
/// ```
/// use emotion_ensemble::cli::EmocArgs;
/// use ortho_config::OrthoConfig;
///
/// let args = EmocArgs::load_from_iter(["emoc", "--dry-run"])
///     .expect("load args from CLI iterator");
/// assert!(args.dry_run);
/// ```
///
/// Load from a configuration file:
/// ```
/// use emotion_ensemble::cli::EmocArgs;
/// use ortho_config::OrthoConfig;
/// use std::io::Write;
/// use tempfile::NamedTempFile;
///
/// let mut file = NamedTempFile::new().expect("create temp file");
/// writeln!(file, "json = true").expect("write config");
/// let path = file.path().to_str().expect("path str");
/// let args = EmocArgs::load_from_iter(["emoc", "--config-path", path])
///     .expect("load args from config path");
/// assert!(args.json);
/// ```
#[derive(Debug, Deserialize, ortho_config::OrthoConfig)]
#[ortho_config(prefix = "EMOC")]
pub struct EmocArgs {
    /// Text to classify; read from stdin when absent.
    pub text: Option<String>,

    /// Print the prediction as JSON.
    #[ortho_config(default = false)]
    #[serde(default)]
    pub json: bool,

    /// Load the models and report them without classifying.
    #[ortho_config(default = false)]
    #[serde(default)]
    pub dry_run: bool,

    /// Log at debug level.
    #[ortho_config(default = false)]
    #[serde(default)]
    pub verbose: bool,

    /// Path to the configuration file holding the `[ensemble]` table.
    pub config_path: Option<PathBuf>,
}

impl EmocArgs {
    /// Load configuration solely from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an [`ortho_config::OrthoError`] if any variable cannot be
    /// parsed.
    pub fn load_from_env() -> OrthoResult<Self> {
        Figment::new()
            .merge(Env::prefixed("EMOC_"))
            .extract()
            .into_ortho()
    }

    /// Load configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an [`ortho_config::OrthoError`] if the file cannot be read or
    /// parsed.
    pub fn load_from_config(path: &str) -> OrthoResult<Self> {
        Figment::new()
            .merge(Toml::file(path))
            .extract()
            .into_ortho()
    }

    /// Load configuration from environment variables and a file path.
    ///
    /// # Errors
    ///
    /// Returns an [`ortho_config::OrthoError`] if either source contains
    /// invalid values.
    pub fn load_from_env_and_config(path: &str) -> OrthoResult<Self> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("EMOC_"))
            .extract()
            .into_ortho()
    }
}

/// Renders scores highest first, one line per emotion with a bar.
///
/// # Examples
///
/// ```
/// use emotion_ensemble::{
///     EnsembleService, LabelRegistry, ModelAdapter, RawPrediction, TextProcessor,
///     cli::render_ranked,
/// };
/// use std::convert::Infallible;
///
/// struct Joyful;
///
/// impl TextProcessor for Joyful {
///     type Output = Vec<RawPrediction>;
///     type Error = Infallible;
///
///     fn process(&self, _input: &str) -> Result<Self::Output, Self::Error> {
///         Ok(vec![RawPrediction::new("LABEL_2", 1.0)])
///     }
/// }
///
/// let service = EnsembleService::from_models(
///     LabelRegistry::default(),
///     vec![ModelAdapter::new("joyful", Joyful)],
/// );
/// let table = render_ranked(&service.predict("yay").unwrap());
/// assert!(table.lines().next().unwrap().starts_with("Joy"));
/// ```
#[must_use]
pub fn render_ranked(scores: &ScoreMapping) -> String {
    scores
        .ranked()
        .into_iter()
        .map(|(label, score)| format!("{label:<8} {score:>6.3} {}\n", bar(score)))
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    reason = "scores in [0, 1] scale to a small cell count"
)]
fn bar(score: f32) -> String {
    let cells = (score.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize;
    "█".repeat(cells.min(BAR_WIDTH))
}

/// Lists active and failed models, one per line.
#[must_use]
pub fn render_load_report(service: &EnsembleService) -> String {
    let mut out: String = service
        .active_models()
        .map(|model| format!("active  {model}\n"))
        .collect();
    for failure in service.load_failures() {
        out.push_str(&format!("failed  {}: {failure}\n", failure.model()));
    }
    out.push_str(&format!(
        "{} of {} models active\n",
        service.active_model_count(),
        service.active_model_count() + service.load_failures().len()
    ));
    out
}
