//! Gallery scraping domain: profile discovery, enrichment, persistence.
//!
//! Submodules cover the listing traversal (tab activation, per-page
//! collection, pagination), the detail-page piece-count pass, the profile
//! records themselves, and the versioned archive they are saved to. All
//! browser access goes through the capability traits in `census-drivers`,
//! so the whole pipeline runs against an in-memory fake in tests.
pub mod detail;
pub mod listing;
pub mod profile;
pub mod store;

pub use profile::{Profile, ProfileBook};
