//! Typed AES-256 key material.

use std::path::Path;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Key size for AES-256, in bytes.
pub const KEY_LEN: usize = 32;

/// Errors raised while building a [`SealKey`].
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid key length: got {got} bytes, expected 32")]
    InvalidLength { got: usize },
    #[error("key is not valid hex: {0}")]
    Hex(String),
    #[error("key source unreadable: {0}")]
    Unreadable(String),
}

/// A raw 256-bit key.
///
/// The only way in is exactly [`KEY_LEN`] bytes; nothing is padded,
/// truncated or derived from a passphrase. The bytes are scrubbed
/// when the key drops.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SealKey([u8; KEY_LEN]);

impl SealKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Parses a hex-encoded key. Surrounding whitespace is ignored.
    pub fn from_hex(encoded: &str) -> Result<Self, KeyError> {
        let decoded = Zeroizing::new(
            hex::decode(encoded.trim()).map_err(|e| KeyError::Hex(e.to_string()))?,
        );
        Self::try_from(decoded.as_slice())
    }

    /// Reads a hex-encoded key from disk.
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self, KeyError> {
        let path = path.as_ref();
        let content = Zeroizing::new(
            std::fs::read_to_string(path)
                .map_err(|e| KeyError::Unreadable(format!("{}: {e}", path.display())))?,
        );
        Self::from_hex(&content)
    }

    /// Reads a hex-encoded key from an environment variable.
    pub fn from_env_var(var: &str) -> Result<Self, KeyError> {
        let content = Zeroizing::new(
            std::env::var(var).map_err(|e| KeyError::Unreadable(format!("{var}: {e}")))?,
        );
        Self::from_hex(&content)
    }
}

impl TryFrom<&[u8]> for SealKey {
    type Error = KeyError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| KeyError::InvalidLength { got: bytes.len() })?;
        Ok(Self(array))
    }
}

impl std::fmt::Debug for SealKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealKey").finish_non_exhaustive()
    }
}
