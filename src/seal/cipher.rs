//! AES-256-CBC with PKCS#7 padding.

use super::{SealError, SealKey};
use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use rand_core::{CryptoRng, RngCore};

/// AES block size, in bytes.
pub const BLOCK_LEN: usize = 16;

/// CBC initialization vector size, in bytes.
pub const IV_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// A CBC initialization vector.
///
/// Must never be reused under the same key; [`Iv::generate`] draws a
/// fresh one per encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iv([u8; IV_LEN]);

impl Iv {
    /// Draws a fresh IV from a cryptographically secure source.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, rand_core::Error> {
        let mut bytes = [0u8; IV_LEN];
        rng.try_fill_bytes(&mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; IV_LEN]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; IV_LEN] {
        &self.0
    }
}

/// Length of the ciphertext produced for `plaintext_len` input bytes.
///
/// PKCS#7 always appends 1 to 16 bytes, so a block-aligned input gains
/// a full block.
#[inline]
pub fn ciphertext_len(plaintext_len: usize) -> usize {
    (plaintext_len / BLOCK_LEN + 1) * BLOCK_LEN
}

/// Pads and encrypts `plaintext`. Deterministic for a given key and IV.
pub fn encrypt(key: &SealKey, iv: &Iv, plaintext: &[u8]) -> Result<Vec<u8>, SealError> {
    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), iv.as_bytes())
        .map_err(|e| SealError::Encryption(e.to_string()))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbc::cipher::BlockDecryptMut;
    use proptest::prelude::*;

    type Aes256CbcDec = cbc::Decryptor<Aes256>;

    fn decrypt(key: &SealKey, iv: &Iv, ciphertext: &[u8]) -> Vec<u8> {
        Aes256CbcDec::new_from_slices(key.as_bytes(), iv.as_bytes())
            .unwrap()
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .unwrap()
    }

    fn from_hex<const N: usize>(s: &str) -> [u8; N] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    // NIST SP 800-38A, F.2.5 CBC-AES256.Encrypt, first block.
    #[test]
    fn test_known_answer() {
        let key = SealKey::from_bytes(from_hex(
            "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4",
        ));
        let iv = Iv::from_bytes(from_hex("000102030405060708090a0b0c0d0e0f"));
        let plaintext: [u8; 16] = from_hex("6bc1bee22e409f96e93d7e117393172a");

        let ciphertext = encrypt(&key, &iv, &plaintext).unwrap();

        assert_eq!(ciphertext.len(), 32);
        assert_eq!(hex::encode(&ciphertext[..16]), "f58c4c04d6e5f1ba779eabfb5f7bfbd6");
    }

    #[test]
    fn test_ciphertext_len_boundaries() {
        assert_eq!(ciphertext_len(0), 16);
        assert_eq!(ciphertext_len(10), 16);
        assert_eq!(ciphertext_len(15), 16);
        assert_eq!(ciphertext_len(16), 32);
        assert_eq!(ciphertext_len(17), 32);
    }

    #[test]
    fn test_empty_plaintext_is_one_padding_block() {
        let key = SealKey::from_bytes([0u8; 32]);
        let iv = Iv::from_bytes([0u8; 16]);

        let ciphertext = encrypt(&key, &iv, &[]).unwrap();
        assert_eq!(ciphertext.len(), 16);
        assert!(decrypt(&key, &iv, &ciphertext).is_empty());
    }

    #[test]
    fn test_deterministic_given_iv() {
        let key = SealKey::from_bytes([0x11; 32]);
        let iv = Iv::from_bytes([0x22; 16]);
        let plaintext = b"same photo, same key, same iv";

        assert_eq!(
            encrypt(&key, &iv, plaintext).unwrap(),
            encrypt(&key, &iv, plaintext).unwrap()
        );
    }

    #[test]
    fn test_iv_changes_ciphertext() {
        let key = SealKey::from_bytes([0x11; 32]);
        let plaintext = b"same photo";

        let a = encrypt(&key, &Iv::from_bytes([0x01; 16]), plaintext).unwrap();
        let b = encrypt(&key, &Iv::from_bytes([0x02; 16]), plaintext).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_ivs_differ() {
        let mut rng = rand_core::OsRng;
        let a = Iv::generate(&mut rng).unwrap();
        let b = Iv::generate(&mut rng).unwrap();
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn prop_padded_length(plaintext in proptest::collection::vec(any::<u8>(), 0..600)) {
            let key = SealKey::from_bytes([0x5a; 32]);
            let iv = Iv::from_bytes([0xa5; 16]);

            let ciphertext = encrypt(&key, &iv, &plaintext).unwrap();

            prop_assert_eq!(ciphertext.len(), (plaintext.len() + 1).div_ceil(16) * 16);
            prop_assert_eq!(ciphertext.len(), ciphertext_len(plaintext.len()));
            prop_assert_eq!(decrypt(&key, &iv, &ciphertext), plaintext);
        }
    }
}
