//! Bridge configuration loaded from TOML plus the `key=value;...` advanced
//! connection option format.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::errors::GraphBridgeError;

pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1500;
pub const MEMORY_DATABASE: &str = "memory";

/// Which metadata catalog variant to query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditionSetting {
    /// Classify from the build string reported at connect time.
    #[default]
    Auto,
    Cloud,
    OnPremise,
}

/// How bulk-insert values are bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterMode {
    /// Cast to the column's scalar type and bind natively.
    #[default]
    Typed,
    /// Bind every value as its string representation.
    Text,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub database: String,
    pub advanced_properties: Option<String>,
    pub edition: EditionSetting,
    pub probe_timeout_ms: u64,
    /// Schema name to database file, attached on connect.
    pub schemas: BTreeMap<String, String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            database: MEMORY_DATABASE.to_string(),
            advanced_properties: None,
            edition: EditionSetting::Auto,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            schemas: BTreeMap::new(),
        }
    }
}

impl ConnectionConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn for_path(path: impl AsRef<Path>) -> Self {
        Self {
            database: path.as_ref().display().to_string(),
            ..Self::default()
        }
    }

    pub fn is_memory(&self) -> bool {
        self.database == MEMORY_DATABASE || self.database == ":memory:"
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub parameter_mode: ParameterMode,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub connection: ConnectionConfig,
    pub upload: UploadConfig,
    pub log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            upload: UploadConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Loads `explicit`, or the default location when it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, GraphBridgeError> {
        match explicit {
            Some(path) => read_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => read_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, GraphBridgeError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| GraphBridgeError::config(e.to_string()))?;
        parse_advanced_properties(config.connection.advanced_properties.as_deref())?;
        Ok(config)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("graphbridge").join("config.toml"))
}

fn read_file(path: &Path) -> Result<BridgeConfig, GraphBridgeError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| GraphBridgeError::config(format!("{}: {e}", path.display())))?;
    BridgeConfig::from_toml_str(&contents)
}

/// Parses `key=value;key1=value1`. A trailing `;` is allowed and an empty
/// or absent string yields no options.
pub fn parse_advanced_properties(
    raw: Option<&str>,
) -> Result<BTreeMap<String, String>, GraphBridgeError> {
    let mut props = BTreeMap::new();
    let Some(raw) = raw else {
        return Ok(props);
    };
    for segment in raw.split(';') {
        if segment.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = segment.split_once('=') else {
            return Err(GraphBridgeError::invalid_advanced_option(format!(
                "'{segment}' is not of the form key=value"
            )));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(GraphBridgeError::invalid_advanced_option(format!(
                "'{segment}' has an empty key"
            )));
        }
        props.insert(key.to_string(), value.trim().to_string());
    }
    Ok(props)
}
