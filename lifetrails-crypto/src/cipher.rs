//! AES-256-GCM seal/open over `iv || ciphertext` byte layouts.

use crate::error::{CryptoError, CryptoResult};
use crate::key::DerivedKey;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

/// GCM nonce (IV) length in bytes.
pub const NONCE_SIZE: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_SIZE: usize = 16;

/// Encrypts `plaintext`, returning `iv || ciphertext || tag`.
///
/// A fresh random IV is generated per call, so two seals of the same
/// plaintext never produce the same output.
pub fn seal(key: &DerivedKey, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    let mut iv = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut iv);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| CryptoError::EncryptionFailed("AES-GCM seal failed".into()))?;

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypts `iv || ciphertext || tag` produced by [`seal`].
///
/// The GCM tag authenticates the ciphertext: any tampering or a wrong key
/// fails here rather than returning silently-wrong plaintext.
pub fn open(key: &DerivedKey, data: &[u8]) -> CryptoResult<Vec<u8>> {
    if data.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::DecryptionFailed(format!(
            "ciphertext too short: {} bytes",
            data.len()
        )));
    }

    let (iv, ciphertext) = data.split_at(NONCE_SIZE);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed("authentication failed".into()))
}
