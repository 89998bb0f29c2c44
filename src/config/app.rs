// src/config/app.rs
//! Service configuration: optional TOML/JSON file, then `NEWSFEED_*` env overrides, then
//! sanitization. Missing files are fine; a file that exists but does not parse is an error.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::registry::RegistryMode;

pub const ENV_CONFIG_PATH: &str = "NEWSFEED_CONFIG_PATH";

const ENV_FETCH_TIMEOUT_MS: &str = "NEWSFEED_FETCH_TIMEOUT_MS";
const ENV_MAX_CONCURRENCY: &str = "NEWSFEED_MAX_CONCURRENCY";
const ENV_DEFAULT_LIMIT: &str = "NEWSFEED_DEFAULT_LIMIT";
const ENV_MAX_LIMIT: &str = "NEWSFEED_MAX_LIMIT";
const ENV_ISOLATE_FAILURES: &str = "NEWSFEED_ISOLATE_FAILURES";
const ENV_REGISTRY_MODE: &str = "NEWSFEED_REGISTRY_MODE";

const MIN_FETCH_TIMEOUT_MS: u64 = 100;

fn default_fetch_timeout_ms() -> u64 {
    8_000
}
fn default_max_concurrency() -> usize {
    8
}
fn default_default_limit() -> usize {
    10
}
fn default_max_limit() -> usize {
    200
}
fn default_isolate_failures() -> bool {
    true
}
fn default_browser_user_agent() -> String {
    "Mozilla/5.0".to_string()
}
fn default_default_user_agent() -> String {
    concat!("newsfeed-aggregator/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Per-source deadline (fetch + parse).
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// How many sources of one category are fetched at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    /// false: one failing source fails the whole category request.
    #[serde(default = "default_isolate_failures")]
    pub isolate_failures: bool,
    #[serde(default)]
    pub registry_mode: RegistryMode,
    #[serde(default = "default_browser_user_agent")]
    pub browser_user_agent: String,
    #[serde(default = "default_default_user_agent")]
    pub default_user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_concurrency: default_max_concurrency(),
            default_limit: default_default_limit(),
            max_limit: default_max_limit(),
            isolate_failures: default_isolate_failures(),
            registry_mode: RegistryMode::default(),
            browser_user_agent: default_browser_user_agent(),
            default_user_agent: default_default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Resolve the `limit` query parameter: missing → default, negative → 0, clamp to max.
    pub fn effective_limit(&self, requested: Option<i64>) -> usize {
        match requested {
            None => self.default_limit,
            Some(n) if n <= 0 => 0,
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX).min(self.max_limit),
        }
    }

    /// Apply `NEWSFEED_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|k| std::env::var(k).ok());
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        override_parsed(&get, ENV_FETCH_TIMEOUT_MS, &mut self.fetch_timeout_ms);
        override_parsed(&get, ENV_MAX_CONCURRENCY, &mut self.max_concurrency);
        override_parsed(&get, ENV_DEFAULT_LIMIT, &mut self.default_limit);
        override_parsed(&get, ENV_MAX_LIMIT, &mut self.max_limit);
        override_parsed(&get, ENV_REGISTRY_MODE, &mut self.registry_mode);
        if let Some(raw) = get(ENV_ISOLATE_FAILURES) {
            match parse_bool(&raw) {
                Some(v) => self.isolate_failures = v,
                None => tracing::warn!(
                    key = ENV_ISOLATE_FAILURES,
                    value = %raw,
                    "ignoring invalid env override"
                ),
            }
        }
    }

    /// Clamp values into a usable range.
    pub fn sanitize(mut self) -> Self {
        if self.fetch_timeout_ms < MIN_FETCH_TIMEOUT_MS {
            self.fetch_timeout_ms = MIN_FETCH_TIMEOUT_MS;
        }
        if self.max_concurrency == 0 {
            self.max_concurrency = 1;
        }
        if self.default_limit > self.max_limit {
            self.default_limit = self.max_limit;
        }
        if self.browser_user_agent.trim().is_empty() {
            self.browser_user_agent = default_browser_user_agent();
        }
        if self.default_user_agent.trim().is_empty() {
            self.default_user_agent = default_default_user_agent();
        }
        self
    }
}

fn override_parsed<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut T) {
    if let Some(raw) = get(key) {
        match raw.trim().parse::<T>() {
            Ok(v) => *slot = v,
            Err(_) => tracing::warn!(key, value = %raw, "ignoring invalid env override"),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Load config from an explicit path. TOML or JSON, chosen by extension (TOML if unsure).
pub fn load_from(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg: AppConfig = if ext == "json" {
        serde_json::from_str(&content).context("parsing json config")?
    } else {
        toml::from_str(&content).context("parsing toml config")?
    };
    Ok(cfg)
}

/// Load config using env var + fallbacks, then env overrides:
/// 1) $NEWSFEED_CONFIG_PATH
/// 2) config/newsfeed.toml
/// 3) config/newsfeed.json
/// 4) built-in defaults
pub fn load_default() -> Result<AppConfig> {
    let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
        Ok(p) => {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            load_from(&pb)?
        }
        Err(_) => {
            let toml_p = PathBuf::from("config/newsfeed.toml");
            let json_p = PathBuf::from("config/newsfeed.json");
            if toml_p.exists() {
                load_from(&toml_p)?
            } else if json_p.exists() {
                load_from(&json_p)?
            } else {
                AppConfig::default()
            }
        }
    };
    cfg.apply_env();
    Ok(cfg.sanitize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
fetch_timeout_ms = 2500
registry_mode = "last_wins"
"#,
        )
        .unwrap();
        assert_eq!(cfg.fetch_timeout_ms, 2500);
        assert_eq!(cfg.registry_mode, RegistryMode::LastWins);
        assert_eq!(cfg.default_limit, 10);
        assert!(cfg.isolate_failures);
        assert_eq!(cfg.browser_user_agent, "Mozilla/5.0");
    }

    #[test]
    fn overrides_apply_and_bad_values_are_ignored() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_FETCH_TIMEOUT_MS, "1500"),
            (ENV_MAX_CONCURRENCY, "not-a-number"),
            (ENV_ISOLATE_FAILURES, "off"),
            (ENV_REGISTRY_MODE, "last-wins"),
        ]);
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.fetch_timeout_ms, 1500);
        assert_eq!(cfg.max_concurrency, 8);
        assert!(!cfg.isolate_failures);
        assert_eq!(cfg.registry_mode, RegistryMode::LastWins);
    }

    #[test]
    fn sanitize_clamps() {
        let cfg = AppConfig {
            fetch_timeout_ms: 1,
            max_concurrency: 0,
            default_limit: 50,
            max_limit: 20,
            browser_user_agent: " ".into(),
            ..AppConfig::default()
        }
        .sanitize();
        assert_eq!(cfg.fetch_timeout_ms, 100);
        assert_eq!(cfg.max_concurrency, 1);
        assert_eq!(cfg.default_limit, 20);
        assert_eq!(cfg.browser_user_agent, "Mozilla/5.0");
    }

    #[test]
    fn effective_limit_rules() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.effective_limit(None), 10);
        assert_eq!(cfg.effective_limit(Some(3)), 3);
        assert_eq!(cfg.effective_limit(Some(0)), 0);
        assert_eq!(cfg.effective_limit(Some(-5)), 0);
        assert_eq!(cfg.effective_limit(Some(1_000_000)), 200);
    }
}
