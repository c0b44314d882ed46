//! Record store orchestration for Life Trails.
//!
//! Ties the confidentiality layer together: on sign-in the user's
//! password unwraps the remote-store token from their artifact, the
//! token goes into a session-scoped cache, and from then on the local
//! record is read and written through the token-derived record cipher;
//! the password is never needed (or kept) again.
//!
//! Accounts come in two variants selected by directory metadata, not by
//! username matching:
//!
//! - **Remote encrypted**: has a secret artifact in the directory;
//!   records are encrypted at rest and synced to the remote store.
//! - **Local plain**: no remote credential. Authenticates against the
//!   local account table and stores records as plain JSON. An explicit
//!   trust-reduced path, not a fallback.
//!
//! Sessions expire 24 hours after sign-in; expiry clears the cached
//! token and identity but keeps the encrypted blob, which the next
//! successful sign-in supersedes.

mod accounts;
mod error;
mod session;
mod store;

pub use accounts::{AccountDirectory, AccountKind, LocalAccount};
pub use error::{StoreError, StoreResult};
pub use session::{
    record_blob_key, session_token_key, SessionIdentity, SessionKeyCache, SESSION_IDENTITY_KEY,
    SESSION_MAX_AGE_HOURS,
};
pub use store::RecordStore;
