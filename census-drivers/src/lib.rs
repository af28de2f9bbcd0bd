//! Driver layer for browser automation.
//!
//! This crate exposes the browser capability traits the scraper consumes,
//! their WebDriver-backed implementation, and the bounded polling primitive
//! used for every read of asynchronously rendered content.
//!
//! - [`census_browser::driver::CensusDriver`]: WebDriver client wrapper
//! - [`census_browser::page`]: the [`BrowserPage`]/[`PageElement`] capability
//!   seam and its fantoccini implementation
//! - [`census_browser::wait`]: retry policy, clock abstraction, and
//!   [`wait_until`]
//!
//! [`BrowserPage`]: census_browser::page::BrowserPage
//! [`PageElement`]: census_browser::page::PageElement
//! [`wait_until`]: census_browser::wait::wait_until
pub mod census_browser;
