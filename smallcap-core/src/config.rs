//! Screener configuration: symbol list, cache TTL, provider tuning, rules.
//!
//! Loaded from TOML, then environment overrides, then validated once at
//! startup so bad settings fail before any fetch runs.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::data::yahoo::YahooConfig;
use crate::domain::{Field, Lookback};
use crate::screening::{Comparator, RuleSet, ScreeningRule, Thresholds};

/// Environment variable naming a config file.
pub const CONFIG_PATH_VAR: &str = "SMALLCAP_CONFIG";
/// Comma-separated symbol list override.
pub const SYMBOLS_VAR: &str = "SMALLCAP_SYMBOLS";
/// Cache TTL override in seconds.
pub const CACHE_TTL_VAR: &str = "SMALLCAP_CACHE_TTL_SECS";

/// Largest TTL a `chrono::Duration` can hold.
pub const MAX_CACHE_TTL_SECS: u64 = (i64::MAX / 1000) as u64;
/// Retries per request beyond this only add sleeps at the backoff cap.
pub const MAX_RETRIES: u32 = 10;

/// Sample small-cap universe.
pub const DEFAULT_SYMBOLS: [&str; 10] = [
    "BJRI", "BLMN", "CORT", "BOOT", "CCRN", "COLM", "ENSG", "GIII", "HZO", "MTH",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(String),

    #[error("serialize config: {0}")]
    Serialize(String),

    #[error("symbol list is empty")]
    EmptySymbolList,

    #[error("symbol #{index} is blank")]
    BlankSymbol { index: usize },

    #[error("rule '{rule}' has a non-finite threshold")]
    InvalidThreshold { rule: String },

    #[error("rules on {field} can never pass together (lower bound {lower}, upper bound {upper})")]
    UnsatisfiableBounds { field: Field, lower: f64, upper: f64 },

    #[error("cache_ttl_secs must be greater than zero")]
    ZeroTtl,

    #[error("provider.{0} must be greater than zero")]
    ZeroSetting(&'static str),

    #[error("{setting} is {value}, above the maximum of {max}")]
    OutOfRange {
        setting: &'static str,
        value: u64,
        max: u64,
    },

    #[error("set either [thresholds] or [[rules]], not both")]
    ConflictingRules,

    #[error("environment override {var}={value}: {reason}")]
    EnvOverride {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Provider connection and fetch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub breaker_cooldown_secs: u64,
    pub max_parallel_fetches: usize,
    pub history_lookback: Lookback,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 500,
            breaker_cooldown_secs: 30 * 60,
            max_parallel_fetches: 1,
            history_lookback: Lookback::ThreeMonths,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenerConfig {
    pub symbols: Vec<String>,
    pub cache_ttl_secs: u64,
    pub provider: ProviderConfig,
    /// Overrides for individual default thresholds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
    /// Full replacement rule list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<ScreeningRule>>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            cache_ttl_secs: 3600,
            provider: ProviderConfig::default(),
            thresholds: None,
            rules: None,
        }
    }
}

impl ScreenerConfig {
    /// Parse a config from TOML. Missing keys take defaults. Not validated.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML file. Not validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// `<config dir>/smallcap/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("smallcap").join("config.toml"))
    }

    /// Startup loading: file (if any) → environment overrides → validation.
    ///
    /// The file is `$SMALLCAP_CONFIG` when set (and must exist), otherwise the
    /// default path when it exists, otherwise built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        let lookup = |k: &str| vars.get(k).cloned();

        let config = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.with_env_overrides(lookup)?.validate()
    }

    /// Apply `SMALLCAP_SYMBOLS` / `SMALLCAP_CACHE_TTL_SECS` from `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(SYMBOLS_VAR) {
            self.symbols = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(value) = lookup(CACHE_TTL_VAR) {
            self.cache_ttl_secs = value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::EnvOverride {
                    var: CACHE_TTL_VAR,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        Ok(self)
    }

    /// Normalize symbols (trim, upper-case, dedupe keeping first occurrence)
    /// and reject anything the pipeline cannot run with.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::EmptySymbolList);
        }

        let mut seen = HashSet::new();
        let mut symbols = Vec::with_capacity(self.symbols.len());
        for (index, raw) in self.symbols.iter().enumerate() {
            let symbol = raw.trim().to_uppercase();
            if symbol.is_empty() {
                return Err(ConfigError::BlankSymbol { index });
            }
            if seen.insert(symbol.clone()) {
                symbols.push(symbol);
            } else {
                tracing::debug!(%symbol, "dropping duplicate symbol");
            }
        }
        self.symbols = symbols;

        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::ZeroTtl);
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::OutOfRange {
                setting: "cache_ttl_secs",
                value: self.cache_ttl_secs,
                max: MAX_CACHE_TTL_SECS,
            });
        }
        if self.provider.max_retries > MAX_RETRIES {
            return Err(ConfigError::OutOfRange {
                setting: "provider.max_retries",
                value: u64::from(self.provider.max_retries),
                max: u64::from(MAX_RETRIES),
            });
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::ZeroSetting("timeout_secs"));
        }
        if self.provider.max_parallel_fetches == 0 {
            return Err(ConfigError::ZeroSetting("max_parallel_fetches"));
        }
        if self.thresholds.is_some() && self.rules.is_some() {
            return Err(ConfigError::ConflictingRules);
        }

        let rules = self.rule_set();
        check_rules(&rules)?;
        if rules.is_empty() {
            tracing::warn!("rule set is empty; every fetched symbol will pass the screen");
        }

        Ok(self)
    }

    /// The effective rule set.
    pub fn rule_set(&self) -> RuleSet {
        match (&self.rules, &self.thresholds) {
            (Some(rules), _) => RuleSet::new(rules.clone()),
            (None, Some(thresholds)) => thresholds.to_rule_set(),
            (None, None) => RuleSet::small_cap(),
        }
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        i64::try_from(self.cache_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn yahoo_config(&self) -> YahooConfig {
        YahooConfig {
            timeout: Duration::from_secs(self.provider.timeout_secs),
            max_retries: self.provider.max_retries,
            base_delay: Duration::from_millis(self.provider.retry_base_delay_ms),
            ..YahooConfig::default()
        }
    }

    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.provider.breaker_cooldown_secs)
    }
}

/// Reject non-finite thresholds and per-field bounds that exclude everything.
fn check_rules(rules: &RuleSet) -> Result<(), ConfigError> {
    // (threshold, strict) of the tightest bound seen per field
    let mut lower: HashMap<Field, (f64, bool)> = HashMap::new();
    let mut upper: HashMap<Field, (f64, bool)> = HashMap::new();

    for rule in rules {
        if !rule.threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold {
                rule: format!("{} {}", rule.field, rule.comparator),
            });
        }
        let strict = matches!(rule.comparator, Comparator::Gt | Comparator::Lt);
        if rule.comparator.is_lower_bound() {
            let slot = lower.entry(rule.field).or_insert((f64::NEG_INFINITY, false));
            if rule.threshold > slot.0 || (rule.threshold == slot.0 && strict) {
                *slot = (rule.threshold, strict);
            }
        } else {
            let slot = upper.entry(rule.field).or_insert((f64::INFINITY, false));
            if rule.threshold < slot.0 || (rule.threshold == slot.0 && strict) {
                *slot = (rule.threshold, strict);
            }
        }
    }

    for (field, (lo, lo_strict)) in &lower {
        if let Some((hi, hi_strict)) = upper.get(field) {
            if lo > hi || (lo == hi && (*lo_strict || *hi_strict)) {
                return Err(ConfigError::UnsatisfiableBounds {
                    field: *field,
                    lower: *lo,
                    upper: *hi,
                });
            }
        }
    }
    Ok(())
}
