//! Key derivation (PBKDF2-HMAC-SHA256) and key material types.

use crate::error::{CryptoError, CryptoResult};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Derived key length in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// Salt length in bytes.
pub const SALT_SIZE: usize = 16;

/// Iteration count for unwrapping the remote-store token from a password.
/// High, because this key guards a bearer credential against offline
/// brute force of a human-chosen password.
pub const UNWRAP_ITERATIONS: u32 = 600_000;

/// Iteration count for deriving the local record key from the token.
/// Low, because the token input is already random and high-entropy.
pub const RECORD_KEY_ITERATIONS: u32 = 100_000;

/// A random salt bound to one encrypted artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Generates a fresh random salt.
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// Symmetric key material produced by [`derive_key`].
///
/// Never serialized; zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Stretches `secret` into a 256-bit AES-GCM key with the given salt and
/// iteration count.
///
/// Deterministic: the same `(secret, salt, iterations)` always yields the
/// same key. Fails with `InvalidInput` when the secret or salt is empty.
pub fn derive_key(secret: &[u8], salt: &[u8], iterations: u32) -> CryptoResult<DerivedKey> {
    if secret.is_empty() {
        return Err(CryptoError::InvalidInput("secret must not be empty".into()));
    }
    if salt.is_empty() {
        return Err(CryptoError::InvalidInput("salt must not be empty".into()));
    }
    if iterations == 0 {
        return Err(CryptoError::InvalidInput("iterations must be non-zero".into()));
    }

    let mut out = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<Sha256>(secret, salt, iterations, &mut out);
    Ok(DerivedKey(out))
}
