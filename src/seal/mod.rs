//! Confidentiality-only sealing of captured images.
//!
//! A plaintext file is read whole, padded with PKCS#7, encrypted with
//! AES-256-CBC under a fresh random IV, and written as `IV || ciphertext`
//! to the same path with `.enc` appended.
//!
//! There is no authentication tag. A modified artifact cannot be
//! detected by anything in this module.

mod artifact;
mod cipher;
mod key;
mod sealer;

pub use artifact::{artifact_path, Artifact, ArtifactError, ARTIFACT_SUFFIX};
pub use cipher::{ciphertext_len, encrypt, Iv, BLOCK_LEN, IV_LEN};
pub use key::{KeyError, SealKey, KEY_LEN};
pub use sealer::{SealError, SealStage, Sealer};
