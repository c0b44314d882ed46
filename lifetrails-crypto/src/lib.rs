//! Confidentiality layer for Life Trails.
//!
//! Provides local data confidentiality using:
//! - PBKDF2-HMAC-SHA256 for key derivation
//! - AES-256-GCM for authenticated encryption
//! - Secure key handling with zeroization
//!
//! # Architecture
//!
//! Two independent derivations protect two different assets and must not
//! be unified, because they have different strength requirements:
//!
//! 1. **Token unwrap**: the remote-store access token is stored as an
//!    opaque artifact sealed under a key stretched from the user's
//!    password at a high iteration count ([`key::UNWRAP_ITERATIONS`]).
//!    This key guards a bearer credential with remote write access, so it
//!    must resist offline brute force.
//!
//! 2. **Record key**: the local record blob is sealed under a key derived
//!    from the *already-unwrapped* token at a much lower iteration count
//!    ([`key::RECORD_KEY_ITERATIONS`]) with a fixed application-wide salt.
//!    The token is random and high-entropy, so entropy substitutes for
//!    iteration count here; the derivation only needs to defeat casual
//!    inspection of local storage. The fixed salt is acceptable *only*
//!    for this path; it would be unsafe for a password-derived key.
//!
//! The password itself is never persisted in any form.

pub mod artifact;
mod cipher;
mod error;
pub mod key;
pub mod record;
mod token;

pub use artifact::{seal_token, unwrap_token, ARTIFACT_HEADER_LEN};
pub use cipher::{open, seal, NONCE_SIZE, TAG_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use key::{
    derive_key, DerivedKey, Salt, KEY_SIZE, RECORD_KEY_ITERATIONS, SALT_SIZE, UNWRAP_ITERATIONS,
};
pub use record::{decrypt_record, encrypt_record};
pub use token::AccessToken;
