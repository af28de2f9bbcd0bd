//! Shared fakes for the gallery integration tests: an in-memory browser
//! honoring the capability traits, and a clock whose time moves only when
//! the polling loops pause.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use census_common::observability::LogConfig;
use census_common::DriverError;
use census_drivers::census_browser::page::{BrowserPage, PageElement};
use census_drivers::census_browser::wait::Clock;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "census-tests",
            emit_stderr: true,
            default_filter: "debug",
            ..LogConfig::default()
        };
        census_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// Clock whose time advances only when a polling loop pauses.
pub struct FakeClock {
    origin: Instant,
    elapsed_ms: AtomicU64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed_ms: AtomicU64::new(0),
        }
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    async fn pause(&self, interval: Duration) {
        self.elapsed_ms
            .fetch_add(interval.as_millis() as u64, Ordering::SeqCst);
    }
}

/// One scripted listing entry.
#[derive(Debug, Clone)]
pub struct FakeEntry {
    pub name: String,
    pub link: String,
    /// Rendered as a non-displayed list item; must be skipped.
    pub hidden: bool,
    /// Render two name paragraphs under the anchor (structure violation).
    pub extra_name_node: bool,
    /// Render the anchor without an href.
    pub missing_href: bool,
}

impl FakeEntry {
    pub fn new(name: &str, link: &str) -> Self {
        Self {
            name: name.to_string(),
            link: link.to_string(),
            hidden: false,
            extra_name_node: false,
            missing_href: false,
        }
    }
}

/// What a detail page shows for its piece-count label over time.
pub enum DetailScript {
    /// Successive label texts; the last one repeats forever.
    Counts { texts: Vec<String>, cursor: usize },
    /// Two labels render instead of one (structure violation).
    MultiLabel,
    /// The label never appears.
    NeverRenders,
}

impl DetailScript {
    pub fn counts(texts: &[&str]) -> Self {
        Self::Counts {
            texts: texts.iter().map(|t| t.to_string()).collect(),
            cursor: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Location {
    Unloaded,
    Listing,
    Detail(String),
}

pub struct FakeState {
    pub listing_url: String,
    pub listing_pages: Vec<Vec<FakeEntry>>,
    pub page_index: usize,
    pub tab_clicked: bool,
    pub tab_clicks: usize,
    /// The history tab never renders at all.
    pub tab_missing: bool,
    /// Number of tab-strip probes that see an empty strip before it renders.
    pub tab_probes_until_render: usize,
    /// Next-button clicks recorded per listing page.
    pub next_clicks: Vec<usize>,
    /// Render a second "Go to next page" button (structure violation).
    pub duplicate_next_button: bool,
    /// The first N name reads raise a stale-element error.
    pub stale_name_reads: usize,
    pub details: HashMap<String, DetailScript>,
    location: Location,
}

/// In-memory browser scripted per test.
pub struct FakeBrowser {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBrowser {
    pub fn new(listing_url: &str, listing_pages: Vec<Vec<FakeEntry>>) -> Self {
        let pages = listing_pages.len();
        Self {
            state: Arc::new(Mutex::new(FakeState {
                listing_url: listing_url.to_string(),
                listing_pages,
                page_index: 0,
                tab_clicked: false,
                tab_clicks: 0,
                tab_missing: false,
                tab_probes_until_render: 0,
                next_clicks: vec![0; pages],
                duplicate_next_button: false,
                stale_name_reads: 0,
                details: HashMap::new(),
                location: Location::Unloaded,
            })),
        }
    }

    pub fn configure(&self, f: impl FnOnce(&mut FakeState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn snapshot<T>(&self, f: impl FnOnce(&FakeState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }

    fn node(&self, node: Node) -> Box<dyn PageElement> {
        Box::new(FakeNode {
            node,
            state: Arc::clone(&self.state),
        })
    }
}

#[async_trait]
impl BrowserPage for FakeBrowser {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        let mut st = self.state.lock().unwrap();
        st.location = if url == st.listing_url {
            Location::Listing
        } else {
            Location::Detail(url.to_string())
        };
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn PageElement>>, DriverError> {
        let location = {
            let st = self.state.lock().unwrap();
            st.location.clone()
        };
        match location {
            Location::Unloaded => Ok(vec![]),
            Location::Listing => self.query_listing(selector),
            Location::Detail(link) => self.query_detail(selector, &link),
        }
    }
}

impl FakeBrowser {
    fn query_listing(&self, selector: &str) -> Result<Vec<Box<dyn PageElement>>, DriverError> {
        match selector {
            ".MuiTab-wrapper" => {
                let mut st = self.state.lock().unwrap();
                if st.tab_missing {
                    return Ok(vec![]);
                }
                if st.tab_probes_until_render > 0 {
                    st.tab_probes_until_render -= 1;
                    return Ok(vec![]);
                }
                drop(st);
                Ok(vec![
                    self.node(Node::Tab {
                        label: "FEED".to_string(),
                    }),
                    self.node(Node::Tab {
                        label: "GLOBAL HISTORY".to_string(),
                    }),
                ])
            }
            "li" => {
                let st = self.state.lock().unwrap();
                if !st.tab_clicked {
                    return Ok(vec![]);
                }
                let entries = st.listing_pages[st.page_index].clone();
                drop(st);
                Ok(entries
                    .into_iter()
                    .map(|entry| self.node(Node::ListItem { entry }))
                    .collect())
            }
            "nav" => {
                let st = self.state.lock().unwrap();
                if !st.tab_clicked {
                    return Ok(vec![]);
                }
                drop(st);
                // One hidden pager plus the real one; the hidden one must be
                // ignored by the displayed filter.
                Ok(vec![
                    self.node(Node::Nav { hidden: true }),
                    self.node(Node::Nav { hidden: false }),
                ])
            }
            _ => Ok(vec![]),
        }
    }

    fn query_detail(
        &self,
        selector: &str,
        link: &str,
    ) -> Result<Vec<Box<dyn PageElement>>, DriverError> {
        if selector != ".MuiTab-wrapper" {
            return Ok(vec![]);
        }
        let st = self.state.lock().unwrap();
        let labels = match st.details.get(link) {
            Some(DetailScript::Counts { .. }) | None => 1,
            Some(DetailScript::MultiLabel) => 2,
            Some(DetailScript::NeverRenders) => 0,
        };
        drop(st);
        Ok((0..labels)
            .map(|_| {
                self.node(Node::CountLabel {
                    link: link.to_string(),
                })
            })
            .collect())
    }
}

enum Node {
    Tab { label: String },
    ListItem { entry: FakeEntry },
    Anchor { entry: FakeEntry },
    NameText { entry: FakeEntry },
    Nav { hidden: bool },
    NextButton,
    DecoyButton,
    CountLabel { link: String },
}

struct FakeNode {
    node: Node,
    state: Arc<Mutex<FakeState>>,
}

impl FakeNode {
    fn child(&self, node: Node) -> Box<dyn PageElement> {
        Box::new(FakeNode {
            node,
            state: Arc::clone(&self.state),
        })
    }
}

#[async_trait]
impl PageElement for FakeNode {
    async fn text(&self) -> Result<String, DriverError> {
        match &self.node {
            Node::Tab { label } => Ok(label.clone()),
            Node::NameText { entry } => {
                let mut st = self.state.lock().unwrap();
                if st.stale_name_reads > 0 {
                    st.stale_name_reads -= 1;
                    return Err(DriverError::Stale);
                }
                Ok(entry.name.clone())
            }
            Node::CountLabel { link } => {
                let mut st = self.state.lock().unwrap();
                match st.details.get_mut(link) {
                    Some(DetailScript::Counts { texts, cursor }) => {
                        let text = texts[*cursor].clone();
                        if *cursor + 1 < texts.len() {
                            *cursor += 1;
                        }
                        Ok(text)
                    }
                    _ => Ok(String::new()),
                }
            }
            _ => Ok(String::new()),
        }
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, DriverError> {
        match (&self.node, name) {
            (Node::Anchor { entry }, "href") => {
                if entry.missing_href {
                    Ok(None)
                } else {
                    Ok(Some(entry.link.clone()))
                }
            }
            (Node::NextButton, "aria-label") => Ok(Some("Go to next page".to_string())),
            (Node::NextButton, "disabled") => {
                let st = self.state.lock().unwrap();
                if st.page_index + 1 == st.listing_pages.len() {
                    Ok(Some("true".to_string()))
                } else {
                    Ok(None)
                }
            }
            (Node::DecoyButton, "aria-label") => Ok(Some("Go to previous page".to_string())),
            _ => Ok(None),
        }
    }

    async fn click(&self) -> Result<(), DriverError> {
        let mut st = self.state.lock().unwrap();
        match &self.node {
            Node::Tab { label } => {
                if label == "GLOBAL HISTORY" {
                    st.tab_clicked = true;
                }
                st.tab_clicks += 1;
                Ok(())
            }
            Node::NextButton => {
                let page = st.page_index;
                st.next_clicks[page] += 1;
                st.page_index += 1;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn is_displayed(&self) -> Result<bool, DriverError> {
        match &self.node {
            Node::ListItem { entry } => Ok(!entry.hidden),
            Node::Nav { hidden } => Ok(!hidden),
            _ => Ok(true),
        }
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn PageElement>>, DriverError> {
        match (&self.node, selector) {
            (Node::ListItem { entry }, "a") => Ok(vec![self.child(Node::Anchor {
                entry: entry.clone(),
            })]),
            (Node::Anchor { entry }, "p") => {
                let mut names = vec![self.child(Node::NameText {
                    entry: entry.clone(),
                })];
                if entry.extra_name_node {
                    names.push(self.child(Node::NameText {
                        entry: entry.clone(),
                    }));
                }
                Ok(names)
            }
            (Node::Nav { hidden: false }, "button") => {
                let duplicate = self.state.lock().unwrap().duplicate_next_button;
                let mut buttons = vec![self.child(Node::DecoyButton), self.child(Node::NextButton)];
                if duplicate {
                    buttons.push(self.child(Node::NextButton));
                }
                Ok(buttons)
            }
            _ => Ok(vec![]),
        }
    }
}
