use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

const SHEET_EXPORT_PREFIX: &str = "https://docs.google.com/spreadsheets/d/";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Modules in declaration order; this order fixes the summary columns.
    pub modules: Vec<ModuleConfig>,
    #[serde(default)]
    pub columns: ColumnConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub fetch: FetchPolicy,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Read `dd/mm/yyyy` instead of `mm/dd/yyyy` in slash-separated timestamps.
    #[serde(default)]
    pub day_first: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleConfig {
    pub name: String,
    /// Short column label used by condensed tables.
    pub label: String,
    /// Full URL or a published spreadsheet id. `None` means no data yet.
    #[serde(default)]
    pub source: Option<String>,
}

impl ModuleConfig {
    pub fn source_url(&self) -> Option<String> {
        let source = self.source.as_deref()?.trim();
        if source.is_empty() {
            None
        } else if source.starts_with("http://") || source.starts_with("https://") {
            Some(source.to_string())
        } else {
            Some(format!("{SHEET_EXPORT_PREFIX}{source}/export?format=csv"))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
    #[serde(default = "default_worker_id")]
    pub worker_id: String,
    #[serde(default = "default_full_name")]
    pub full_name: String,
    #[serde(default = "default_site")]
    pub site: String,
    #[serde(default = "default_score")]
    pub score: String,
    /// Candidate timestamp columns, first present one wins.
    #[serde(default = "default_timestamp")]
    pub timestamp: Vec<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            worker_id: default_worker_id(),
            full_name: default_full_name(),
            site: default_site(),
            score: default_score(),
            timestamp: default_timestamp(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostRule {
    /// Most recent attempt by timestamp.
    #[default]
    Latest,
    /// Highest score among every attempt after the first.
    BestOfRest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_per_module_max")]
    pub per_module_max: f64,
    #[serde(default)]
    pub post_rule: PostRule,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            per_module_max: default_per_module_max(),
            post_rule: PostRule::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchPolicy {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after the first one.
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl FetchPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries + 1
    }

    /// Linear backoff before retry number `attempt` (1-based).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(u64::from(attempt)))
    }
}

fn default_worker_id() -> String {
    "id pekerja".to_string()
}

fn default_full_name() -> String {
    "nama".to_string()
}

fn default_site() -> String {
    "depoh".to_string()
}

fn default_score() -> String {
    "total score".to_string()
}

fn default_timestamp() -> Vec<String> {
    vec!["timestamp".to_string(), "date".to_string()]
}

fn default_per_module_max() -> f64 {
    5.0
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_cache_ttl_secs() -> u64 {
    600
}

impl Default for Config {
    fn default() -> Self {
        let sources = [
            Some("1SRlxQQ9OFQJyXDFAP2I2bAKEh2ACc9czqdKvysLWP64"),
            Some("1QmdnNFHxIG1o-JeGN_mR9QgdbXc76lFurzh2cgot9gE"),
            Some("1P1ThhQJ49Bl9Rh13Aq_rX9eysxDTJFdJL0pX45EGils"),
            None,
            None,
        ];
        let modules = sources
            .iter()
            .enumerate()
            .map(|(idx, source)| ModuleConfig {
                name: format!("Module {}", idx + 1),
                label: format!("M{}", idx + 1),
                source: source.map(str::to_string),
            })
            .collect();

        Self {
            modules,
            columns: ColumnConfig::default(),
            scoring: ScoringConfig::default(),
            fetch: FetchPolicy::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
            day_first: false,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&text)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.modules.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[modules]] entry is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for module in &self.modules {
            if module.name.trim().is_empty() {
                return Err(ConfigError::Validation("module name must not be empty".into()));
            }
            if !seen.insert(module.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate module name '{}'",
                    module.name
                )));
            }
        }

        if !(self.scoring.per_module_max > 0.0) {
            return Err(ConfigError::Validation(
                "scoring.per_module_max must be positive".into(),
            ));
        }
        if self.columns.worker_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "columns.worker_id must not be empty".into(),
            ));
        }

        Ok(())
    }

    pub fn module(&self, name: &str) -> Option<&ModuleConfig> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
