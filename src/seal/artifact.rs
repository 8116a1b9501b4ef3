//! On-disk layout of a sealed image.
//!
//! ```text
//! offset 0,  length 16   : IV, raw bytes
//! offset 16, length N*16 : AES-256-CBC ciphertext, N >= 1
//! ```
//!
//! There is no header, magic or version tag. The layout is positional.

use super::cipher::{Iv, BLOCK_LEN, IV_LEN};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Suffix appended to the plaintext file name.
pub const ARTIFACT_SUFFIX: &str = ".enc";

/// Layout violations found when reading an artifact.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("artifact too short: {len} bytes, need at least {}", IV_LEN + BLOCK_LEN)]
    TooShort { len: usize },
    #[error("ciphertext length {len} is not a multiple of the block size")]
    Misaligned { len: usize },
}

/// Output path for a plaintext file: the full name with `.enc` appended,
/// so `photo.jpg` seals to `photo.jpg.enc`.
pub fn artifact_path(plaintext: &Path) -> PathBuf {
    let mut name = OsString::from(plaintext.as_os_str());
    name.push(ARTIFACT_SUFFIX);
    PathBuf::from(name)
}

/// An IV-prefixed ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    iv: Iv,
    ciphertext: Vec<u8>,
}

impl Artifact {
    pub fn new(iv: Iv, ciphertext: Vec<u8>) -> Self {
        Self { iv, ciphertext }
    }

    #[inline]
    pub fn iv(&self) -> &Iv {
        &self.iv
    }

    #[inline]
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Total encoded size.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        IV_LEN + self.ciphertext.len()
    }

    /// Serializes as `IV || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(self.iv.as_bytes());
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Splits raw artifact bytes back into IV and ciphertext, checking
    /// only the positional layout. Nothing here proves integrity.
    pub fn parse(bytes: &[u8]) -> Result<Self, ArtifactError> {
        if bytes.len() < IV_LEN + BLOCK_LEN {
            return Err(ArtifactError::TooShort { len: bytes.len() });
        }
        let (iv, ciphertext) = bytes.split_at(IV_LEN);
        if ciphertext.len() % BLOCK_LEN != 0 {
            return Err(ArtifactError::Misaligned {
                len: ciphertext.len(),
            });
        }

        let mut iv_bytes = [0u8; IV_LEN];
        iv_bytes.copy_from_slice(iv);
        Ok(Self {
            iv: Iv::from_bytes(iv_bytes),
            ciphertext: ciphertext.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_appended_to_full_name() {
        assert_eq!(
            artifact_path(Path::new("shots/photo.jpg")),
            PathBuf::from("shots/photo.jpg.enc")
        );
        assert_eq!(artifact_path(Path::new("raw")), PathBuf::from("raw.enc"));
    }

    #[test]
    fn test_iv_leads_the_layout() {
        let artifact = Artifact::new(Iv::from_bytes([0x01; 16]), vec![0xEE; 32]);
        let bytes = artifact.to_bytes();

        assert_eq!(bytes.len(), 48);
        assert_eq!(artifact.encoded_len(), 48);
        assert_eq!(&bytes[..16], &[0x01; 16]);
        assert_eq!(&bytes[16..], &[0xEE; 32][..]);
    }

    #[test]
    fn test_parse_recovers_parts() {
        let artifact = Artifact::new(Iv::from_bytes([0x42; 16]), vec![0x99; 16]);
        let parsed = Artifact::parse(&artifact.to_bytes()).unwrap();
        assert_eq!(parsed, artifact);
    }

    #[test]
    fn test_parse_rejects_short_input() {
        assert_eq!(
            Artifact::parse(&[0u8; 16]),
            Err(ArtifactError::TooShort { len: 16 })
        );
        assert_eq!(
            Artifact::parse(&[0u8; 31]),
            Err(ArtifactError::TooShort { len: 31 })
        );
    }

    #[test]
    fn test_parse_rejects_partial_block() {
        assert_eq!(
            Artifact::parse(&[0u8; 40]),
            Err(ArtifactError::Misaligned { len: 24 })
        );
    }
}
