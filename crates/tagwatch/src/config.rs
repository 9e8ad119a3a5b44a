//! Monitor configuration loading.

#![allow(missing_docs)]

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use smol_str::SmolStr;

use crate::error::ClientError;
use crate::history::DEFAULT_HISTORY_CAP;
use crate::source::TagSpec;

/// Default server endpoint (the conventional local OPC UA port).
pub const DEFAULT_ENDPOINT: &str = "opc.tcp://localhost:4840";
/// Default sweep interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Validated monitor configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub endpoint: SmolStr,
    pub poll_interval: Duration,
    pub history_cap: usize,
    pub source: SourceConfig,
    /// Seed tags; when empty the monitor falls back to discovery, then to
    /// the demo set.
    pub tags: Vec<TagSpec>,
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub driver: SmolStr,
    pub params: toml::Value,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            driver: SmolStr::new_static("simulated"),
            params: toml::Value::Table(toml::map::Map::new()),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            endpoint: SmolStr::new_static(DEFAULT_ENDPOINT),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            history_cap: DEFAULT_HISTORY_CAP,
            source: SourceConfig::default(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    endpoint: Option<String>,
    poll_interval_ms: Option<u64>,
    history_cap: Option<usize>,
    source: Option<RawSource>,
    #[serde(default)]
    tags: Vec<RawTag>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    driver: Option<String>,
    params: Option<toml::Value>,
}

#[derive(Debug, Deserialize)]
struct RawTag {
    name: String,
    node_id: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    min: f64,
    #[serde(default)]
    max: f64,
}

impl MonitorConfig {
    /// Load and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            ClientError::InvalidConfig(
                format!("failed to read {}: {err}", path.display()).into(),
            )
        })?;
        Self::parse(&text)
    }

    /// Parse and validate TOML configuration text.
    pub fn parse(text: &str) -> Result<Self, ClientError> {
        let raw: RawConfig = toml::from_str(text)
            .map_err(|err| ClientError::InvalidConfig(format!("{err}").into()))?;

        let poll_interval_ms = raw.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        if poll_interval_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "poll_interval_ms must be positive".into(),
            ));
        }
        let history_cap = raw.history_cap.unwrap_or(DEFAULT_HISTORY_CAP);
        if history_cap == 0 {
            return Err(ClientError::InvalidConfig(
                "history_cap must be positive".into(),
            ));
        }

        let source = match raw.source {
            Some(source) => SourceConfig {
                driver: source
                    .driver
                    .map_or_else(|| SmolStr::new_static("simulated"), SmolStr::new),
                params: source
                    .params
                    .unwrap_or_else(|| toml::Value::Table(toml::map::Map::new())),
            },
            None => SourceConfig::default(),
        };

        let tags = raw
            .tags
            .into_iter()
            .map(|tag| TagSpec {
                name: SmolStr::new(tag.name),
                node_id: SmolStr::new(tag.node_id),
                unit: SmolStr::new(tag.unit),
                min_hint: tag.min,
                max_hint: tag.max,
            })
            .collect();

        Ok(Self {
            endpoint: raw
                .endpoint
                .map_or_else(|| SmolStr::new_static(DEFAULT_ENDPOINT), SmolStr::new),
            poll_interval: Duration::from_millis(poll_interval_ms),
            history_cap,
            source,
            tags,
        })
    }
}
