//! Remote record store client for Life Trails.
//!
//! The remote store is an opaque per-user file host with a
//! contents-API shape: one `data.json` per user under a configured
//! folder, addressed as `{base_url}/{data_folder}/{user_id}/data.json`,
//! authenticated with the unwrapped bearer token, with an opaque version
//! tag (`sha`) for optimistic concurrency on writes and deletes.
//!
//! A 404 on read is not an error; it means a new user with no data yet.

mod client;
mod config;
mod error;

pub use client::{RecordApiClient, RemoteRecordFile};
pub use config::RemoteConfig;
pub use error::{RemoteError, RemoteResult};
