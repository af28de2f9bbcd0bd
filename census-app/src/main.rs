use anyhow::Result;
use census_common::observability::{init_logging, LogConfig};
use census_config::{CensusConfig, CensusConfigLoader};
use census_drivers::census_browser::driver::CensusDriver;
use census_drivers::census_browser::wait::{RetryPolicy, WallClock};
use census_gallery::detail::enrich_profiles;
use census_gallery::listing::collect_profiles;
use census_gallery::store;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Defaults + CENSUS_ env; census.yaml is optional.
    let cfg: CensusConfig = CensusConfigLoader::new().with_file("census.yaml").load()?;

    init_logging(LogConfig::default())?;

    let driver = CensusDriver::connect(&cfg.webdriver_url, cfg.headless).await?;

    // The browser session must be released on every path, so the run body
    // lives in its own function and close happens before the verdict
    // propagates.
    let outcome = run(&driver, &cfg).await;
    match driver.close().await {
        Ok(()) => {}
        Err(close_err) if outcome.is_ok() => return Err(close_err),
        Err(close_err) => error!(error = %close_err, "failed to close browser session"),
    }
    outcome.map_err(Into::into)
}

async fn run(driver: &CensusDriver, cfg: &CensusConfig) -> census_common::Result<()> {
    let page = driver.page();
    let policy = RetryPolicy::new(cfg.wait.budget(), cfg.wait.poll_interval());
    let clock = WallClock;

    let mut book = collect_profiles(&page, &cfg.listing_url, &policy, &clock).await?;
    store::save_profiles(&cfg.output.checkpoint_path, &book)?;
    info!(
        profiles = book.len(),
        path = %cfg.output.checkpoint_path,
        "checkpoint written"
    );

    enrich_profiles(&page, &mut book, &policy, &clock).await?;
    store::save_profiles(&cfg.output.final_path, &book)?;
    info!(
        profiles = book.len(),
        path = %cfg.output.final_path,
        "census complete"
    );

    Ok(())
}
