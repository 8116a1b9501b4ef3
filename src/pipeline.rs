//! Capture followed by seal.
//!
//! The two steps share nothing but a file path: capture writes the
//! plaintext image and returns its path, the sealer reads that path.
//! Sealing only runs after a frame was saved and the device released.

use crate::capture::{Camera, CaptureError, CaptureOutcome, CaptureSource};
use crate::seal::{SealError, SealKey, Sealer};
use rand_core::{CryptoRng, RngCore};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What happens to the plaintext image after a successful seal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaintextPolicy {
    /// Leave the image next to the artifact.
    #[default]
    Keep,
    /// Delete the image once the artifact is on disk.
    Remove,
}

/// One failure category per way the pipeline can stop.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("invalid capture configuration: {0}")]
    InvalidConfig(String),
    #[error("camera delivered no frame")]
    FrameReadFailure,
    #[error("invalid key length: got {got} bytes, expected 32")]
    InvalidKeyLength { got: usize },
    #[error("failed to read plaintext {}: {source}", path.display())]
    PlaintextReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("encryption failed: {0}")]
    EncryptionFailure(String),
    #[error("write failed: {0}")]
    WriteFailure(String),
}

impl PipelineError {
    /// Process exit status for this category.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::InvalidConfig(_) => 2,
            PipelineError::DeviceUnavailable(_) => 10,
            PipelineError::FrameReadFailure => 11,
            PipelineError::InvalidKeyLength { .. } => 20,
            PipelineError::PlaintextReadFailure { .. } => 21,
            PipelineError::EncryptionFailure(_) => 22,
            PipelineError::WriteFailure(_) => 23,
        }
    }
}

impl From<CaptureError> for PipelineError {
    fn from(e: CaptureError) -> Self {
        match e {
            CaptureError::DeviceUnavailable(msg) => PipelineError::DeviceUnavailable(msg),
            CaptureError::InvalidConfig(msg) => PipelineError::InvalidConfig(msg),
            other @ (CaptureError::Encode(_) | CaptureError::Write { .. }) => {
                PipelineError::WriteFailure(other.to_string())
            }
        }
    }
}

impl From<SealError> for PipelineError {
    fn from(e: SealError) -> Self {
        match e {
            SealError::InvalidKeyLength { got } => PipelineError::InvalidKeyLength { got },
            SealError::PlaintextRead { path, source } => {
                PipelineError::PlaintextReadFailure { path, source }
            }
            SealError::Encryption(msg) => PipelineError::EncryptionFailure(msg),
            other @ SealError::Write { .. } => PipelineError::WriteFailure(other.to_string()),
        }
    }
}

/// Runs capture then seal.
pub struct Pipeline<C: Camera, R = rand_core::OsRng> {
    source: CaptureSource<C>,
    sealer: Sealer<R>,
    policy: PlaintextPolicy,
}

impl<C: Camera> Pipeline<C> {
    pub fn new(source: CaptureSource<C>) -> Self {
        Self::with_sealer(source, Sealer::new())
    }
}

impl<C: Camera, R: RngCore + CryptoRng> Pipeline<C, R> {
    pub fn with_sealer(source: CaptureSource<C>, sealer: Sealer<R>) -> Self {
        Self {
            source,
            sealer,
            policy: PlaintextPolicy::default(),
        }
    }

    /// Sets what happens to the plaintext image after sealing.
    pub fn plaintext_policy(mut self, policy: PlaintextPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the capture source.
    pub fn source(&self) -> &CaptureSource<C> {
        &self.source
    }

    /// Captures to `destination`, then seals it under a raw key.
    ///
    /// The key length is checked before the camera is opened.
    pub fn run(&mut self, destination: impl AsRef<Path>, key: &[u8]) -> Result<PathBuf, PipelineError> {
        let key = SealKey::try_from(key)
            .map_err(|_| PipelineError::InvalidKeyLength { got: key.len() })?;
        self.run_with_key(destination, &key)
    }

    /// Captures to `destination`, then seals it. Returns the artifact path.
    pub fn run_with_key(
        &mut self,
        destination: impl AsRef<Path>,
        key: &SealKey,
    ) -> Result<PathBuf, PipelineError> {
        let image = match self.source.capture(destination)? {
            CaptureOutcome::Saved(path) => path,
            CaptureOutcome::NoFrame => return Err(PipelineError::FrameReadFailure),
        };

        let artifact = self.sealer.seal_with_key(&image, key)?;

        if self.policy == PlaintextPolicy::Remove {
            match std::fs::remove_file(&image) {
                Ok(()) => tracing::info!(path = %image.display(), "plaintext image removed"),
                Err(e) => tracing::warn!(
                    path = %image.display(),
                    error = %e,
                    "failed to remove plaintext image"
                ),
            }
        }

        Ok(artifact)
    }
}
