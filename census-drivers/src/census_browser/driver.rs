use anyhow::Result;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::collections::HashMap;
use tracing::info;
use webdriver::capabilities::Capabilities;

use crate::census_browser::page::CensusPage;

/// Thin wrapper around a `fantoccini` WebDriver client.
///
/// The session is the one shared, exclusively held resource of a collection
/// run: the binary connects once, hands out [`CensusPage`] views, and closes
/// the session in a guaranteed cleanup step whatever the run's outcome.
pub struct CensusDriver {
    client: Client,
}

impl CensusDriver {
    /// Connect to a running WebDriver service (chromedriver by default).
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self> {
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
        ];
        if headless {
            args.push("--headless".to_string());
            args.push("--disable-gpu".to_string());
        }

        let mut chrome_opts = HashMap::new();
        chrome_opts.insert("args".to_string(), json!(args));

        let mut caps = Capabilities::new();
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await?;
        info!(%webdriver_url, headless, "browser session established");

        Ok(Self { client })
    }

    /// Page-level capability view of this session.
    pub fn page(&self) -> CensusPage {
        CensusPage::new(self.client.clone())
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
