//! Encryption of the user record blob under the token-derived key.
//!
//! A blob is `base64(iv(12) || ciphertext)`. No embedded salt, because
//! the record key uses a fixed application-wide salt. That is acceptable
//! only because the secret being stretched (the token) is random and
//! unique per user; see the crate docs. Blobs are overwritten whole on
//! every save and never versioned.

use crate::cipher;
use crate::error::{CryptoError, CryptoResult};
use crate::key::{derive_key, DerivedKey, RECORD_KEY_ITERATIONS};
use crate::token::AccessToken;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lifetrails_types::UserRecord;

/// Fixed salt for the token-to-record-key derivation. Do not reuse for
/// any password-derived key.
const RECORD_KEY_SALT: &[u8] = b"life-trails-salt";

fn record_key(token: &AccessToken) -> CryptoResult<DerivedKey> {
    derive_key(token.as_bytes(), RECORD_KEY_SALT, RECORD_KEY_ITERATIONS)
}

/// Serializes and encrypts a record, returning the base64 blob.
///
/// A fresh random IV per call means the same record never produces the
/// same blob twice.
pub fn encrypt_record(record: &UserRecord, token: &AccessToken) -> CryptoResult<String> {
    let key = record_key(token)?;
    let plaintext = serde_json::to_vec(record)
        .map_err(|e| CryptoError::EncryptionFailed(format!("record serialization: {e}")))?;
    let sealed = cipher::seal(&key, &plaintext)?;
    Ok(STANDARD.encode(sealed))
}

/// Decrypts a blob back into a record.
///
/// Fails with `DecryptionFailed` when authentication fails (wrong token
/// or corrupted blob) or when the plaintext does not parse as a record.
pub fn decrypt_record(blob: &str, token: &AccessToken) -> CryptoResult<UserRecord> {
    let key = record_key(token)?;
    let raw = STANDARD
        .decode(blob.trim())
        .map_err(|e| CryptoError::DecryptionFailed(format!("invalid base64: {e}")))?;

    let plaintext = cipher::open(&key, &raw)
        .map_err(|_| CryptoError::DecryptionFailed("authentication failed".into()))?;

    serde_json::from_slice(&plaintext)
        .map_err(|e| CryptoError::DecryptionFailed(format!("payload is not a record: {e}")))
}
