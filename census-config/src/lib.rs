//! Loader for the census runtime configuration.
//!
//! Layers defaults, an optional YAML file, and `CENSUS_`-prefixed environment
//! variables (which win), then expands `${VAR}` placeholders before
//! materialising the typed config. Every field has a usable default, so the
//! binary runs with no configuration surface at all.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

const DEFAULT_LISTING_URL: &str =
    "https://niftygateway.com/itemdetail/secondary/0x2250d7c238392f4b575bb26c672afe45f0adcb75/12100010061";
const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Runtime configuration for a collection run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CensusConfig {
    /// Listing page whose paginated participant history is enumerated.
    pub listing_url: String,
    /// WebDriver endpoint (a locally running chromedriver by default).
    pub webdriver_url: String,
    /// Run the browser without a visible window.
    pub headless: bool,
    pub wait: WaitConfig,
    pub output: OutputConfig,
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
            wait: WaitConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Bounds for the polling loops that cope with asynchronous rendering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Wall-clock budget for each polled read, in seconds.
    pub budget_secs: u64,
    /// Pause between poll attempts, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            budget_secs: 10,
            poll_interval_ms: 200,
        }
    }
}

impl WaitConfig {
    pub fn budget(&self) -> Duration {
        Duration::from_secs(self.budget_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Where the serialized profile collections land.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Archive written right after listing completes, before enrichment.
    pub checkpoint_path: String,
    /// Archive written once every profile carries its piece count.
    pub final_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            checkpoint_path: "profiles.checkpoint.json".to_string(),
            final_path: "profiles.json".to_string(),
        }
    }
}

/// Expand `${VAR}` references in a single string, following chained
/// references up to a bounded depth so cyclic definitions terminate.
fn expand_str(raw: &str) -> String {
    let mut current = raw.to_string();
    for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
        let expanded = match shellexpand::env(&current) {
            Ok(cow) => cow.into_owned(),
            Err(_) => return current,
        };
        if expanded == current {
            break;
        }
        current = expanded;
    }
    current
}

fn expand_env_in_value(value: &mut Value) {
    match value {
        Value::String(s) => {
            if s.contains('$') {
                *s = expand_str(s);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(expand_env_in_value),
        Value::Object(fields) => fields.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (optional YAML + env overrides).
pub struct CensusConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for CensusConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CensusConfigLoader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a configuration file. A missing file is not an error, so
    /// deployments can rely purely on defaults and environment variables.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet (tests mostly).
    ///
    /// ```
    /// use census_config::CensusConfigLoader;
    ///
    /// let cfg = CensusConfigLoader::new()
    ///     .with_yaml_str("headless: false")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert!(!cfg.headless);
    /// assert_eq!(cfg.wait.budget_secs, 10);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// The `CENSUS_` environment overlay is added last so environment
    /// variables take precedence over file contents; `${VAR}` placeholders
    /// are expanded before the typed config is materialised.
    pub fn load(self) -> Result<CensusConfig, ConfigError> {
        let merged = self
            .builder
            .add_source(
                Environment::with_prefix("CENSUS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut tree: Value = merged.try_deserialize()?;
        expand_env_in_value(&mut tree);

        serde_json::from_value(tree).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
