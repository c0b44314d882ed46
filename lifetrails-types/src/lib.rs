//! Record model for Life Trails.
//!
//! A [`UserRecord`] is the user's complete biographical dataset: profile
//! fields, a family tree, and life events bucketed by year. The record is
//! always read, mutated, and written as a whole (there are no partial
//! updates), so the mutation helpers here operate on an owned record that
//! the caller persists afterwards.
//!
//! # Invariants
//!
//! - `events` keys are the four-digit year prefix of each event's `date`
//!   (`YYYY-MM-DD`). An event always lives under `date.split('-')[0]`.
//! - Family `level` is a signed generation index: `0` is self/siblings,
//!   negative values are ancestors, positive values are descendants.

mod error;
mod record;

pub use error::{RecordError, RecordResult};
pub use record::{
    generation_label, FamilyMember, LifeEvent, UserRecord,
};
