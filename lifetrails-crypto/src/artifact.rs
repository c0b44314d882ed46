//! Unwrapping (and sealing) the password-protected secret artifact.
//!
//! An artifact is `base64(salt(16) || iv(12) || ciphertext)` where the
//! ciphertext is the remote-store access token sealed under a key
//! stretched from the user's password at [`UNWRAP_ITERATIONS`]. One
//! artifact exists per registered user in the account directory; it is
//! immutable once issued and rotated out-of-band.

use crate::cipher::{self, NONCE_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{derive_key, Salt, SALT_SIZE, UNWRAP_ITERATIONS};
use crate::token::AccessToken;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Minimum raw artifact length: embedded salt plus IV.
pub const ARTIFACT_HEADER_LEN: usize = SALT_SIZE + NONCE_SIZE;

/// Recovers the access token from a password-protected artifact.
///
/// Fails with `MalformedArtifact` when the base64 does not decode or the
/// payload is shorter than the salt+IV header, and with
/// `InvalidCredential` when authenticated decryption fails; wrong
/// password and corrupted artifact are deliberately the same error.
/// Pure: no side effects, no randomness.
pub fn unwrap_token(artifact: &str, password: &str) -> CryptoResult<AccessToken> {
    let raw = STANDARD
        .decode(artifact.trim())
        .map_err(|e| CryptoError::MalformedArtifact(format!("invalid base64: {e}")))?;

    if raw.len() < ARTIFACT_HEADER_LEN {
        return Err(CryptoError::MalformedArtifact(format!(
            "artifact too short: {} bytes, need at least {ARTIFACT_HEADER_LEN}",
            raw.len()
        )));
    }

    let (salt, sealed) = raw.split_at(SALT_SIZE);
    let key = derive_key(password.as_bytes(), salt, UNWRAP_ITERATIONS)?;

    let plaintext = cipher::open(&key, sealed).map_err(|_| CryptoError::InvalidCredential)?;
    let token = String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidCredential)?;

    if token.trim().is_empty() {
        return Err(CryptoError::EmptyToken);
    }
    Ok(AccessToken::new(token))
}

/// Seals a token into an artifact with a fresh random salt and IV.
///
/// The provisioning counterpart of [`unwrap_token`]; used when issuing a
/// new entry for the account directory.
pub fn seal_token(token: &AccessToken, password: &str) -> CryptoResult<String> {
    if token.as_str().trim().is_empty() {
        return Err(CryptoError::InvalidInput("token must not be empty".into()));
    }

    let salt = Salt::random();
    let key = derive_key(password.as_bytes(), salt.as_bytes(), UNWRAP_ITERATIONS)?;
    let sealed = cipher::seal(&key, token.as_bytes())?;

    let mut raw = Vec::with_capacity(SALT_SIZE + sealed.len());
    raw.extend_from_slice(salt.as_bytes());
    raw.extend_from_slice(&sealed);
    Ok(STANDARD.encode(raw))
}
