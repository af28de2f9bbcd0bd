//! Common types shared across the census crates.
//!
//! This crate defines the error taxonomy and observability helpers used
//! throughout the workspace. It is intentionally lightweight so that every
//! crate can depend on it without pulling in the browser or config stacks.
//!
//! # Overview
//!
//! - [`DriverError`]: failures the browser capability layer can report
//! - [`CensusError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! The split between [`CensusError::Timeout`] and [`CensusError::Structure`]
//! is deliberate: the first means the site is slow, the second means the site
//! no longer has the shape the scraper was written against. Callers must be
//! able to tell these apart, so neither is folded into a generic variant.
use std::time::Duration;

pub mod observability;

/// Failures the browser capability layer can report.
#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    /// An element reference was invalidated by a DOM re-render.
    #[error("stale element reference")]
    Stale,

    /// No element matched the query.
    #[error("no such element")]
    NoSuchElement,

    /// Any other WebDriver-level failure.
    #[error("webdriver session error: {0}")]
    Session(String),
}

impl DriverError {
    /// Staleness is a re-render race; polling loops absorb it and try again.
    pub fn is_transient(&self) -> bool {
        matches!(self, DriverError::Stale)
    }
}

/// Error types used across the census system.
#[derive(thiserror::Error, Debug)]
pub enum CensusError {
    /// A polling loop exhausted its wall-clock budget.
    #[error("timed out after {budget:?} waiting for {what}")]
    Timeout { what: String, budget: Duration },

    /// The page no longer matches a structural assumption the scraper
    /// depends on. Never retried.
    #[error("page structure violation: {0}")]
    Structure(String),

    /// The browser driver reported an error.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading or writing a profile archive failed at the I/O level.
    #[error("archive i/o error: {0}")]
    ArchiveIo(#[from] std::io::Error),

    /// A profile archive could not be encoded or decoded.
    #[error("archive encoding error: {0}")]
    ArchiveCodec(#[from] serde_json::Error),

    /// The archive on disk was written by an incompatible schema.
    #[error("unsupported archive schema version {found} (supported: {supported})")]
    ArchiveVersion { found: u32, supported: u32 },
}

impl CensusError {
    /// Whether a bounded polling loop may absorb this error and re-probe.
    pub fn is_transient(&self) -> bool {
        matches!(self, CensusError::Driver(driver) if driver.is_transient())
    }
}

/// Convenient alias for results that use [`CensusError`].
pub type Result<T> = std::result::Result<T, CensusError>;
