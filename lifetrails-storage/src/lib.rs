//! Two-tier client storage for Life Trails.
//!
//! The confidentiality design splits client state by lifetime:
//!
//! - **Session scope**: lives only as long as the process. Holds the
//!   unwrapped access token so it can never outlive an active session.
//! - **Durable scope**: survives restarts. Holds the encrypted record
//!   blob and the public session identity (no secrets).
//!
//! Rather than relying on a platform's "cleared on close" storage, the
//! split is an explicit seam: [`ClientStorage`] pairs one
//! [`KeyValueTier`] per scope, and callers address them through
//! [`StorageScope`]. The session tier is always in-memory; the durable
//! tier is a file-backed JSON document in production and in-memory in
//! tests.

mod client;
mod error;
mod file;
mod tier;

pub use client::{ClientStorage, StorageScope};
pub use error::{StorageError, StorageResult};
pub use file::FileTier;
pub use tier::{KeyValueTier, MemoryTier};
