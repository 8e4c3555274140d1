use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use sha2::{Digest, Sha256};
use tracing::debug;

use super::{config::ArtefactConfig, errors::OnnxClassifierError};

impl ArtefactConfig {
    /// Verifies the artefact checksum against the expected digest.
    ///
    /// # Errors
    ///
    /// Returns `ChecksumMismatch` when the computed digest does not match `sha256` and propagates I/O errors while reading the file.
    pub fn verify(&self) -> Result<(), OnnxClassifierError> {
        let actual = compute_sha256(&self.path)?;
        let expected = normalise_hex(&self.sha256);
        if actual == expected {
            debug!(path = %self.path.display(), "artefact checksum verified");
            Ok(())
        } else {
            Err(OnnxClassifierError::ChecksumMismatch {
                path: self.path.clone(),
                expected,
                actual,
            })
        }
    }
}

/// Computes the SHA-256 digest of the file at `path` as lowercase hex.
///
/// # Errors
///
/// Returns I/O errors from opening or reading the file.
pub fn compute_sha256(path: &Path) -> Result<String, OnnxClassifierError> {
    let io_error = |source| OnnxClassifierError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(io_error)?);
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        let read = reader.read(&mut buffer).map_err(io_error)?;
        let Some(chunk) = buffer.get(..read) else {
            return Err(io_error(std::io::Error::other(
                "read reported bytes beyond buffer length",
            )));
        };
        if chunk.is_empty() {
            break;
        }
        hasher.update(chunk);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn normalise_hex(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}
