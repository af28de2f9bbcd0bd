use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A discovered participant record.
///
/// Created during the listing pass with `piece_count` unset; the detail pass
/// fills the count in place. Records are never removed within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name as shown on the listing page.
    pub name: String,
    /// Trailing path segment of the profile link.
    pub username: String,
    /// Detail-page URL; also the uniqueness key within a run.
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece_count: Option<u64>,
}

impl Profile {
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        let link = link.into();
        let username = username_from_link(&link);
        Self {
            name: name.into(),
            username,
            link,
            piece_count: None,
        }
    }
}

/// Derive a username from a profile link: the trailing path segment, trimmed.
pub fn username_from_link(link: &str) -> String {
    link.rsplit('/').next().unwrap_or(link).trim().to_string()
}

/// Ordered collection of profiles keyed by link.
///
/// Listing pages can repeat an entry while the site paginates; a record
/// keeps the position of its first sighting and a duplicate link replaces
/// the stored record in place (last write wins).
#[derive(Debug, Clone, Default)]
pub struct ProfileBook {
    entries: Vec<Profile>,
    by_link: HashMap<String, usize>,
}

impl ProfileBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a book from stored records, preserving their order.
    pub fn from_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        let mut book = Self::new();
        book.merge(profiles);
        book
    }

    /// Insert or replace the record for `profile.link`.
    pub fn upsert(&mut self, profile: Profile) {
        match self.by_link.get(&profile.link) {
            Some(&slot) => self.entries[slot] = profile,
            None => {
                self.by_link.insert(profile.link.clone(), self.entries.len());
                self.entries.push(profile);
            }
        }
    }

    /// Upsert every profile in order.
    pub fn merge(&mut self, profiles: impl IntoIterator<Item = Profile>) {
        for profile in profiles {
            self.upsert(profile);
        }
    }

    pub fn get(&self, link: &str) -> Option<&Profile> {
        self.by_link.get(link).map(|&slot| &self.entries[slot])
    }

    /// Record the piece count for `link`. Returns whether the link was known.
    pub fn set_piece_count(&mut self, link: &str, count: u64) -> bool {
        match self.by_link.get(link) {
            Some(&slot) => {
                self.entries[slot].piece_count = Some(count);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.entries.iter()
    }

    /// The records in first-sighting order.
    pub fn profiles(&self) -> &[Profile] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
