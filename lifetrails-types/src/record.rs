//! The user record and its mutation helpers.

use crate::error::{RecordError, RecordResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single life event. Images are referenced by name only; the binary
/// content lives in the remote store's image folders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeEvent {
    /// Event date, `YYYY-MM-DD`.
    pub date: String,
    /// Event time, `HH:MM`.
    #[serde(default)]
    pub time: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// A family tree entry. `level` is the generation index relative to the
/// record owner: 0 = self/siblings, -1 = parents, 1 = children, and so on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub name: String,
    pub relation: String,
    pub level: i32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

/// The user's complete dataset: profile, family tree, and events by year.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "dateOfBirth")]
    pub date_of_birth: String,
    #[serde(default, rename = "placeOfBirth")]
    pub place_of_birth: String,
    #[serde(default)]
    pub family: Vec<FamilyMember>,
    /// Events keyed by four-digit year, in insertion order within a year.
    #[serde(default)]
    pub events: BTreeMap<String, Vec<LifeEvent>>,
}

impl UserRecord {
    /// Creates an empty record for a new user.
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            date_of_birth: String::new(),
            place_of_birth: String::new(),
            family: Vec::new(),
            events: BTreeMap::new(),
        }
    }

    /// Adds an event under the year bucket derived from its date.
    ///
    /// The storage year is always `date.split('-')[0]` and must be a
    /// four-digit number.
    pub fn add_event(&mut self, event: LifeEvent) -> RecordResult<()> {
        let year = year_key(&event.date)?;
        self.events.entry(year).or_default().push(event);
        Ok(())
    }

    /// Removes the event at `index` within `year`. The year bucket itself
    /// is removed once it no longer holds any events.
    pub fn delete_event(&mut self, year: &str, index: usize) -> RecordResult<LifeEvent> {
        let bucket = self.events.get_mut(year).ok_or_else(|| RecordError::EventNotFound {
            year: year.to_string(),
            index,
        })?;
        if index >= bucket.len() {
            return Err(RecordError::EventNotFound {
                year: year.to_string(),
                index,
            });
        }
        let removed = bucket.remove(index);
        if bucket.is_empty() {
            self.events.remove(year);
        }
        Ok(removed)
    }

    /// All events flattened into reverse-chronological order (latest first).
    /// Events sharing a date and time keep their insertion order (the sort
    /// is stable).
    pub fn events_latest_first(&self) -> Vec<(&str, &LifeEvent)> {
        let mut all: Vec<(&str, &LifeEvent)> = self
            .events
            .iter()
            .flat_map(|(year, bucket)| bucket.iter().map(move |e| (year.as_str(), e)))
            .collect();
        all.sort_by(|a, b| (b.1.date.as_str(), b.1.time.as_str()).cmp(&(a.1.date.as_str(), a.1.time.as_str())));
        all
    }

    pub fn add_family_member(&mut self, member: FamilyMember) {
        self.family.push(member);
    }

    pub fn delete_family_member(&mut self, index: usize) -> RecordResult<FamilyMember> {
        if index >= self.family.len() {
            return Err(RecordError::FamilyMemberNotFound(index));
        }
        Ok(self.family.remove(index))
    }

    /// Family members grouped by generation level, ascending (ancestors first).
    pub fn family_by_level(&self) -> BTreeMap<i32, Vec<&FamilyMember>> {
        let mut levels: BTreeMap<i32, Vec<&FamilyMember>> = BTreeMap::new();
        for member in &self.family {
            levels.entry(member.level).or_default().push(member);
        }
        levels
    }
}

/// Display label for a generation level.
pub fn generation_label(level: i32) -> &'static str {
    match level {
        i32::MIN..=-2 => "Grand Parents",
        -1 => "Parents",
        0 => "Self / Siblings",
        1 => "Children",
        _ => "Grand Children",
    }
}

/// Extracts the four-digit year bucket key from a `YYYY-MM-DD` date.
fn year_key(date: &str) -> RecordResult<String> {
    let year = date.split('-').next().unwrap_or_default();
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(RecordError::InvalidDate(date.to_string()));
    }
    Ok(year.to_string())
}
