//! Detail-page enrichment: read the "Nifties (N)" field for each profile.

use std::sync::OnceLock;

use census_common::{CensusError, Result};
use census_drivers::census_browser::page::BrowserPage;
use census_drivers::census_browser::wait::{wait_until, Clock, Probe, RetryPolicy};
use regex::Regex;
use tracing::info;

use crate::profile::ProfileBook;

/// CSS class of the element carrying the piece-count label on a detail page.
const COUNT_SELECTOR: &str = ".MuiTab-wrapper";
/// Placeholder the site shows before the real count has loaded.
const COUNT_PLACEHOLDER: &str = "--";

fn count_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Nifties \((.*)\)$").expect("count label pattern"))
}

/// Interpret the labeled count field.
///
/// `Ok(Some(n))` is a loaded count; `Ok(None)` means the value has not
/// rendered yet (the `--` placeholder, or text that does not parse as an
/// integer) and should be read again; `Err(Structure)` means the label no
/// longer has the `Nifties (<N>)` shape at all.
pub fn parse_piece_count(text: &str) -> Result<Option<u64>> {
    let captures = count_label_re().captures(text).ok_or_else(|| {
        CensusError::Structure(format!("unexpected piece-count label: {text:?}"))
    })?;

    let raw = &captures[1];
    if raw == COUNT_PLACEHOLDER {
        return Ok(None);
    }
    Ok(raw.parse::<u64>().ok())
}

/// Navigate to a profile's detail page and poll its piece count until the
/// field holds a real number.
pub async fn piece_count_for(
    page: &dyn BrowserPage,
    link: &str,
    policy: &RetryPolicy,
    clock: &dyn Clock,
) -> Result<u64> {
    page.goto(link).await?;

    wait_until(policy, clock, "piece count", || async move {
        let labels = page.query_all(COUNT_SELECTOR).await?;
        if labels.is_empty() {
            return Ok(Probe::Pending);
        }
        if labels.len() != 1 {
            return Err(CensusError::Structure(format!(
                "expected exactly one piece-count label, found {}",
                labels.len()
            )));
        }

        let text = labels[0].text().await?;
        match parse_piece_count(&text)? {
            Some(count) => Ok(Probe::Ready(count)),
            None => Ok(Probe::Pending),
        }
    })
    .await
}

/// Visit every profile's detail page in discovery order and record its
/// piece count on the profile.
pub async fn enrich_profiles(
    page: &dyn BrowserPage,
    book: &mut ProfileBook,
    policy: &RetryPolicy,
    clock: &dyn Clock,
) -> Result<()> {
    let links: Vec<String> = book.iter().map(|p| p.link.clone()).collect();
    for link in links {
        let count = piece_count_for(page, &link, policy, clock).await?;
        book.set_piece_count(&link, count);
        if let Some(profile) = book.get(&link) {
            info!(
                name = %profile.name,
                username = %profile.username,
                link = %profile.link,
                piece_count = count,
                "profile enriched"
            );
        }
    }
    Ok(())
}
