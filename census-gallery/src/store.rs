//! Versioned archive for profile collections.
//!
//! The collection is written twice per run: a checkpoint right after listing
//! and the final archive after enrichment. Callers use distinct paths, so a
//! failed write never clobbers the earlier checkpoint; no atomic-replace
//! guarantee is provided beyond that.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use census_common::{CensusError, Result};

use crate::profile::{Profile, ProfileBook};

/// Schema version this build reads and writes.
pub const ARCHIVE_VERSION: u32 = 1;

/// On-disk document: flat and explicitly versioned, so a format change
/// across runs fails loudly instead of deserializing garbage.
#[derive(Debug, Serialize, Deserialize)]
struct ProfileArchive {
    version: u32,
    profiles: Vec<Profile>,
}

/// Serialize the collection to `path` in a single write.
pub fn save_profiles(path: impl AsRef<Path>, book: &ProfileBook) -> Result<()> {
    let archive = ProfileArchive {
        version: ARCHIVE_VERSION,
        profiles: book.profiles().to_vec(),
    };
    let encoded = serde_json::to_vec_pretty(&archive)?;
    fs::write(path, encoded)?;
    Ok(())
}

/// Load a previously saved collection, preserving record order.
pub fn load_profiles(path: impl AsRef<Path>) -> Result<ProfileBook> {
    let raw = fs::read(path)?;
    let archive: ProfileArchive = serde_json::from_slice(&raw)?;
    if archive.version != ARCHIVE_VERSION {
        return Err(CensusError::ArchiveVersion {
            found: archive.version,
            supported: ARCHIVE_VERSION,
        });
    }
    Ok(ProfileBook::from_profiles(archive.profiles))
}
