use async_trait::async_trait;
use census_common::DriverError;
use fantoccini::{elements::Element, error::CmdError, error::ErrorStatus, Client, Locator};

/// A handle to a DOM element offering the reads and actions the scraper
/// needs: visible text, attributes, clicks, visibility, and child queries.
#[async_trait]
pub trait PageElement: Send + Sync {
    async fn text(&self) -> Result<String, DriverError>;
    async fn attr(&self, name: &str) -> Result<Option<String>, DriverError>;
    async fn click(&self) -> Result<(), DriverError>;
    async fn is_displayed(&self) -> Result<bool, DriverError>;
    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn PageElement>>, DriverError>;
}

/// The browsing capability the scraper consumes: navigation plus element
/// queries by CSS selector. Any implementation of this pair (a live
/// WebDriver session or an in-memory fake) is substitutable.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), DriverError>;
    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn PageElement>>, DriverError>;
}

/// Map a WebDriver failure onto the capability error set. Staleness keeps
/// its identity so polling loops can absorb it.
fn classify(err: CmdError) -> DriverError {
    match err {
        CmdError::Standard(ref wire)
            if matches!(wire.error, ErrorStatus::StaleElementReference) =>
        {
            DriverError::Stale
        }
        CmdError::Standard(ref wire)
            if matches!(wire.error, ErrorStatus::NoSuchElement) =>
        {
            DriverError::NoSuchElement
        }
        other => DriverError::Session(other.to_string()),
    }
}

/// Page view over a live fantoccini session.
pub struct CensusPage {
    client: Client,
}

impl CensusPage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BrowserPage for CensusPage {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.client.goto(url).await.map_err(classify)
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn PageElement>>, DriverError> {
        let found = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(classify)?;
        Ok(found.into_iter().map(CensusElement::boxed).collect())
    }
}

/// Wrapper for live DOM elements, consistent with [`CensusPage`].
pub struct CensusElement {
    element: Element,
}

impl CensusElement {
    fn boxed(element: Element) -> Box<dyn PageElement> {
        Box::new(Self { element })
    }
}

#[async_trait]
impl PageElement for CensusElement {
    async fn text(&self) -> Result<String, DriverError> {
        self.element.text().await.map_err(classify)
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, DriverError> {
        self.element.attr(name).await.map_err(classify)
    }

    async fn click(&self) -> Result<(), DriverError> {
        self.element.click().await.map_err(classify)
    }

    async fn is_displayed(&self) -> Result<bool, DriverError> {
        self.element.is_displayed().await.map_err(classify)
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn PageElement>>, DriverError> {
        let found = self
            .element
            .find_all(Locator::Css(selector))
            .await
            .map_err(classify)?;
        Ok(found.into_iter().map(CensusElement::boxed).collect())
    }
}
