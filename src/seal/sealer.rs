//! File sealing: read a plaintext file, write `<file>.enc`.
//!
//! # Stages
//!
//! Each call walks `Start → KeyValidated → IvGenerated → PlaintextRead →
//! Encrypted → Written → Done`. Encryption happens entirely in memory;
//! the artifact is written to a temporary file beside the destination
//! and renamed into place, so a failed call never leaves a partial
//! `.enc` behind.

use super::artifact::{artifact_path, Artifact};
use super::cipher::{encrypt, Iv};
use super::key::SealKey;
use rand_core::{CryptoRng, OsRng, RngCore};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zeroize::Zeroizing;

/// Progress of a single seal call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SealStage {
    Start,
    KeyValidated,
    IvGenerated,
    PlaintextRead,
    Encrypted,
    Written,
    Done,
}

impl std::fmt::Display for SealStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SealStage::Start => "start",
            SealStage::KeyValidated => "key-validated",
            SealStage::IvGenerated => "iv-generated",
            SealStage::PlaintextRead => "plaintext-read",
            SealStage::Encrypted => "encrypted",
            SealStage::Written => "written",
            SealStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Errors that abort a seal call.
#[derive(Debug, Error)]
pub enum SealError {
    #[error("invalid key length: got {got} bytes, expected 32")]
    InvalidKeyLength { got: usize },
    #[error("failed to read plaintext {}: {source}", path.display())]
    PlaintextRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("encryption failed: {0}")]
    Encryption(String),
    #[error("failed to write artifact {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SealError {
    /// The stage that could not be reached.
    pub fn stage(&self) -> SealStage {
        match self {
            SealError::InvalidKeyLength { .. } => SealStage::KeyValidated,
            SealError::PlaintextRead { .. } => SealStage::PlaintextRead,
            SealError::Encryption(_) => SealStage::Encrypted,
            SealError::Write { .. } => SealStage::Written,
        }
    }
}

/// Encrypts files with AES-256-CBC under a fresh IV per call.
///
/// The IV source defaults to the operating system RNG.
pub struct Sealer<R = OsRng> {
    rng: R,
}

impl Sealer<OsRng> {
    pub fn new() -> Self {
        Self { rng: OsRng }
    }
}

impl Default for Sealer<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> Sealer<R> {
    /// Uses `rng` for IV generation.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Seals `plaintext_path` under a raw key.
    ///
    /// The key length is checked before any file is touched.
    pub fn seal(
        &mut self,
        plaintext_path: impl AsRef<Path>,
        key: &[u8],
    ) -> Result<PathBuf, SealError> {
        trace_stage(SealStage::Start);
        let key =
            SealKey::try_from(key).map_err(|_| SealError::InvalidKeyLength { got: key.len() })?;
        self.seal_with_key(plaintext_path, &key)
    }

    /// Seals `plaintext_path` and returns the artifact path
    /// (`plaintext_path` with `.enc` appended). An existing artifact at
    /// that path is replaced.
    pub fn seal_with_key(
        &mut self,
        plaintext_path: impl AsRef<Path>,
        key: &SealKey,
    ) -> Result<PathBuf, SealError> {
        let plaintext_path = plaintext_path.as_ref();
        trace_stage(SealStage::KeyValidated);

        let iv = Iv::generate(&mut self.rng)
            .map_err(|e| SealError::Encryption(format!("IV generation failed: {e}")))?;
        trace_stage(SealStage::IvGenerated);

        let plaintext = Zeroizing::new(std::fs::read(plaintext_path).map_err(|source| {
            SealError::PlaintextRead {
                path: plaintext_path.to_path_buf(),
                source,
            }
        })?);
        trace_stage(SealStage::PlaintextRead);

        let ciphertext = encrypt(key, &iv, &plaintext)?;
        let plaintext_len = plaintext.len();
        drop(plaintext);
        trace_stage(SealStage::Encrypted);

        let artifact = Artifact::new(iv, ciphertext);
        let output = artifact_path(plaintext_path);
        write_atomically(&output, &artifact.to_bytes())?;
        trace_stage(SealStage::Written);

        tracing::info!(
            input = %plaintext_path.display(),
            output = %output.display(),
            plaintext_bytes = plaintext_len,
            artifact_bytes = artifact.encoded_len(),
            "image encrypted"
        );
        trace_stage(SealStage::Done);

        Ok(output)
    }
}

fn trace_stage(stage: SealStage) {
    tracing::debug!(%stage, "seal stage");
}

/// Writes `bytes` to a temporary sibling of `dest`, flushes it, and
/// renames it over `dest`.
fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<(), SealError> {
    let write_error = |source: std::io::Error| SealError::Write {
        path: dest.to_path_buf(),
        source,
    };

    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = tempfile::Builder::new()
        .prefix(".photoseal-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_error)?;
    staged.write_all(bytes).map_err(write_error)?;
    staged.as_file().sync_all().map_err(write_error)?;
    staged.persist(dest).map_err(|e| write_error(e.error))?;
    sync_dir(dir).map_err(write_error)?;
    Ok(())
}

/// Flushes directory metadata so the rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
