#![cfg(feature = "cli")]
//! Unit tests for `EmocArgs` argument parsing and layering.

use emotion_ensemble::cli::EmocArgs;
use rstest::{fixture, rstest};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::Path;
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::NamedTempFile;

#[fixture]
fn temp_toml_file() -> NamedTempFile {
    NamedTempFile::new().unwrap_or_else(|e| panic!("create temp file: {e}"))
}

fn write_toml_content(file: &mut NamedTempFile, content: &str) {
    writeln!(file, "{content}").unwrap_or_else(|e| panic!("write config: {e}"));
}

fn get_config_path(file: &NamedTempFile) -> &str {
    file.path().to_str().unwrap_or_else(|| panic!("path str"))
}

static ENV_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

struct EnvVarGuard {
    key: String,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    fn new(key: &str, val: &str) -> Self {
        let lock = ENV_LOCK
            .lock()
            .unwrap_or_else(|e| panic!("env lock poisoned: {e}"));
        // Safety: process-wide env mutation is synchronised by ENV_LOCK.
        unsafe { env::set_var(key, val) };
        Self {
            key: key.to_owned(),
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        // Safety: process-wide env mutation is synchronised by ENV_LOCK.
        unsafe { env::remove_var(&self.key) };
    }
}

fn load(argv: &[&str]) -> EmocArgs {
    <EmocArgs as ortho_config::OrthoConfig>::load_from_iter(argv.iter().copied())
        .unwrap_or_else(|e| panic!("unexpected parse error: {e}"))
}

#[rstest]
#[serial]
#[case(&["emoc"], false)]
#[case(&["emoc", "--dry-run"], true)]
fn load_parses_dry_run(#[case] argv: &[&str], #[case] expected: bool) {
    assert_eq!(load(argv).dry_run, expected);
}

#[rstest]
#[serial]
fn load_parses_text_and_output_flags() {
    let cfg = load(&["emoc", "--text", "I feel so lonely", "--json", "--verbose"]);
    assert_eq!(cfg.text.as_deref(), Some("I feel so lonely"));
    assert!(cfg.json);
    assert!(cfg.verbose);
    assert!(!cfg.dry_run);
}

#[rstest]
#[serial]
fn load_rejects_unknown_flag() {
    let result =
        <EmocArgs as ortho_config::OrthoConfig>::load_from_iter(["emoc", "--frobnicate"]);
    assert!(result.is_err());
}

#[rstest]
#[serial]
fn env_var_parsing_sets_dry_run() {
    let _guard = EnvVarGuard::new("EMOC_DRY_RUN", "true");
    let cfg =
        EmocArgs::load_from_env().unwrap_or_else(|e| panic!("unexpected env parse error: {e}"));
    assert!(cfg.dry_run);
}

#[rstest]
#[serial]
fn env_var_parsing_invalid_bool() {
    let _guard = EnvVarGuard::new("EMOC_DRY_RUN", "notabool");
    let result = EmocArgs::load_from_env();
    assert!(result.is_err());
}

#[rstest]
fn config_file_parsing_sets_text(mut temp_toml_file: NamedTempFile) {
    write_toml_content(&mut temp_toml_file, "text = \"Wow! I never expected a surprise party!\"");
    let path = get_config_path(&temp_toml_file);
    let cfg = EmocArgs::load_from_config(path)
        .unwrap_or_else(|e| panic!("unexpected config parse error: {e}"));
    assert_eq!(cfg.text.as_deref(), Some("Wow! I never expected a surprise party!"));
}

#[rstest]
fn config_file_ignores_ensemble_table(mut temp_toml_file: NamedTempFile) {
    write_toml_content(
        &mut temp_toml_file,
        "json = true\n\n[[ensemble.models]]\nbackend = \"api\"\nmodel_id = \"org/emotion\"",
    );
    let path = get_config_path(&temp_toml_file);
    let cfg = EmocArgs::load_from_config(path)
        .unwrap_or_else(|e| panic!("unexpected config parse error: {e}"));
    assert!(cfg.json);
}

#[rstest]
fn config_file_parsing_invalid_bool(mut temp_toml_file: NamedTempFile) {
    write_toml_content(&mut temp_toml_file, "dry_run = notabool");
    let path = get_config_path(&temp_toml_file);
    let result = EmocArgs::load_from_config(path);
    assert!(result.is_err());
}

#[rstest]
#[serial]
fn config_path_flag_is_kept(mut temp_toml_file: NamedTempFile) {
    write_toml_content(&mut temp_toml_file, "verbose = true");
    let path = get_config_path(&temp_toml_file);
    let cfg = load(&["emoc", "--config-path", path]);
    assert!(cfg.verbose);
    assert_eq!(cfg.config_path.as_deref(), Some(Path::new(path)));
}

#[rstest]
#[serial]
fn precedence_cli_over_env_and_config(mut temp_toml_file: NamedTempFile) {
    let _guard = EnvVarGuard::new("EMOC_TEXT", "from env");
    write_toml_content(&mut temp_toml_file, "text = \"from file\"");
    let path = get_config_path(&temp_toml_file);
    let cfg = load(&["emoc", "--text", "from cli", "--config-path", path]);
    assert_eq!(cfg.text.as_deref(), Some("from cli"));
}

#[rstest]
#[serial]
fn precedence_env_over_config(mut temp_toml_file: NamedTempFile) {
    let _guard = EnvVarGuard::new("EMOC_DRY_RUN", "true");
    write_toml_content(&mut temp_toml_file, "dry_run = false");
    let path = get_config_path(&temp_toml_file);
    let cfg = EmocArgs::load_from_env_and_config(path)
        .unwrap_or_else(|e| panic!("unexpected parse error: {e}"));
    assert!(cfg.dry_run);
}
