//! Listing traversal: activate the history tab, then walk every results
//! page, collecting profile entries until the pager reports its last page.

use census_common::{CensusError, Result};
use census_drivers::census_browser::page::{BrowserPage, PageElement};
use census_drivers::census_browser::wait::{wait_until, Clock, Probe, RetryPolicy};
use tracing::info;

use crate::profile::{Profile, ProfileBook};

/// CSS class of the tab strip entries on the item page.
const TAB_SELECTOR: &str = ".MuiTab-wrapper";
/// Visible label of the tab listing every historical participant. The tab
/// carries no stable identifier, so it is matched by text.
const HISTORY_TAB_LABEL: &str = "GLOBAL HISTORY";
const LIST_ITEM_SELECTOR: &str = "li";
const ANCHOR_SELECTOR: &str = "a";
const NAME_SELECTOR: &str = "p";
const NAV_SELECTOR: &str = "nav";
const BUTTON_SELECTOR: &str = "button";
/// Accessibility label of the pager's advance button.
const NEXT_PAGE_LABEL: &str = "Go to next page";

/// Walk the paginated participant listing and accumulate every profile.
///
/// Pages are visited strictly one after another; each page's entries merge
/// into the book before the pager advances. Stops as soon as the advance
/// button reports a disabled state.
pub async fn collect_profiles(
    page: &dyn BrowserPage,
    listing_url: &str,
    policy: &RetryPolicy,
    clock: &dyn Clock,
) -> Result<ProfileBook> {
    page.goto(listing_url).await?;
    activate_history_tab(page, policy, clock).await?;

    let mut book = ProfileBook::new();
    loop {
        let found = profiles_on_page(page, policy, clock).await?;
        book.merge(found);
        if !advance_page(page, policy, clock).await? {
            break;
        }
    }

    info!(profiles = book.len(), "listing traversal complete");
    Ok(book)
}

/// Find the history tab by its visible text and click it once.
async fn activate_history_tab(
    page: &dyn BrowserPage,
    policy: &RetryPolicy,
    clock: &dyn Clock,
) -> Result<()> {
    let tab = wait_until(policy, clock, "history tab", || async move {
        for candidate in page.query_all(TAB_SELECTOR).await? {
            if candidate.text().await?.trim() == HISTORY_TAB_LABEL {
                return Ok(Probe::Ready(candidate));
            }
        }
        Ok(Probe::Pending)
    })
    .await?;

    tab.click().await?;
    Ok(())
}

/// Collect all profile entries currently visible on the listing page.
///
/// An empty scan counts as "still rendering" and is polled again; the page
/// always shows at least one entry once it has settled.
async fn profiles_on_page(
    page: &dyn BrowserPage,
    policy: &RetryPolicy,
    clock: &dyn Clock,
) -> Result<Vec<Profile>> {
    wait_until(policy, clock, "profile list", || async move {
        let mut found = Vec::new();
        for item in page.query_all(LIST_ITEM_SELECTOR).await? {
            if !item.is_displayed().await? {
                continue;
            }
            for anchor in item.query_all(ANCHOR_SELECTOR).await? {
                let Some(link) = anchor.attr("href").await? else {
                    tracing::debug!("list anchor without href, skipping");
                    continue;
                };
                info!(%link, "found profile link");

                let names = anchor.query_all(NAME_SELECTOR).await?;
                if names.len() != 1 {
                    return Err(CensusError::Structure(format!(
                        "expected exactly one name paragraph under {link}, found {}",
                        names.len()
                    )));
                }
                let name = names[0].text().await?;
                found.push(Profile::new(name, link));
            }
        }

        if found.is_empty() {
            Ok(Probe::Pending)
        } else {
            Ok(Probe::Ready(found))
        }
    })
    .await
}

/// Advance the pager by one page.
///
/// Returns `false` without clicking when the advance button is disabled;
/// otherwise clicks it exactly once and returns `true`. The page exposes
/// exactly one "Go to next page" button once its pager has rendered;
/// anything else means the page has changed shape.
async fn advance_page(
    page: &dyn BrowserPage,
    policy: &RetryPolicy,
    clock: &dyn Clock,
) -> Result<bool> {
    let button = wait_until(policy, clock, "page navigation", || async move {
        let mut displayed_navs = 0usize;
        let mut buttons: Vec<Box<dyn PageElement>> = Vec::new();
        for nav in page.query_all(NAV_SELECTOR).await? {
            if !nav.is_displayed().await? {
                continue;
            }
            displayed_navs += 1;
            for button in nav.query_all(BUTTON_SELECTOR).await? {
                if button.attr("aria-label").await?.as_deref() == Some(NEXT_PAGE_LABEL) {
                    buttons.push(button);
                }
            }
        }

        if displayed_navs == 0 {
            return Ok(Probe::Pending);
        }
        if buttons.len() != 1 {
            return Err(CensusError::Structure(format!(
                "expected exactly one \"{NEXT_PAGE_LABEL}\" button, found {}",
                buttons.len()
            )));
        }
        Ok(Probe::Ready(buttons.remove(0)))
    })
    .await?;

    if button.attr("disabled").await?.as_deref() == Some("true") {
        return Ok(false);
    }
    button.click().await?;
    Ok(true)
}
