//! CLI configuration handling.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use cardpicker_core::{
    ApiEndpoints, Credentials, Criteria, CriteriaValue, Secret,
    model::{CardClass, Rarity},
};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "cardpicker.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Path to the configuration file that was loaded.
    #[serde(skip)]
    pub config_path: PathBuf,

    /// OAuth client identifier, used when neither flag nor env var is set.
    pub client_id: String,

    /// OAuth client secret, used when neither flag nor env var is set.
    pub client_secret: Secret,

    /// Maximum number of catalog pages fetched per pick.
    pub page_limit: u32,

    /// Number of cards printed per pick.
    pub sample_size: usize,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Logging level used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Token and catalog endpoints.
    pub endpoints: ApiEndpoints,

    /// Filter criteria sent with every catalog request.
    pub criteria: Criteria,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            client_id: String::new(),
            client_secret: Secret::default(),
            page_limit: 2,
            sample_size: 10,
            timeout_secs: 30,
            log_level: "warn".to_string(),
            endpoints: ApiEndpoints::default(),
            criteria: default_criteria(),
        }
    }
}

/// Seven-mana legendary warlock or druid cards, ordered by id.
pub fn default_criteria() -> Criteria {
    Criteria::new()
        .with("sort", "id:asc")
        .with("manaCost", 7)
        .with("rarity", Rarity::Legendary.id())
        .with_list("class", [CardClass::Warlock.id(), CardClass::Druid.id()])
}

impl CliConfig {
    /// Combine command-line credentials with the ones from the file.
    ///
    /// `client_id` and `client_secret` already carry clap's flag-over-env
    /// precedence; an absent or empty value falls back to the file.
    pub fn credentials(&self, client_id: Option<String>, client_secret: Option<String>) -> Credentials {
        let client_id = client_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.client_id.clone());
        let client_secret = client_secret
            .filter(|secret| !secret.is_empty())
            .map(Secret::new)
            .unwrap_or_else(|| self.client_secret.clone());
        Credentials::new(client_id, client_secret)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Render the configuration as TOML with the client secret masked.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        if !shown.client_secret.is_empty() {
            shown.client_secret = Secret::new("[REDACTED]");
        }
        toml::to_string_pretty(&shown).context("Failed to serialize config")
    }
}

/// Load configuration from `path`, or from the default location.
///
/// A missing file at the default location yields the defaults; a missing
/// file named explicitly is an error.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file {:?} does not exist", path);
            }
            load_from_path(path)
        }
        None => {
            let config_path = default_config_path();
            if config_path.exists() {
                load_from_path(&config_path)
            } else {
                Ok(CliConfig {
                    config_path,
                    ..CliConfig::default()
                })
            }
        }
    }
}

/// Load and parse a specific configuration file.
pub fn load_from_path(path: &Path) -> Result<CliConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {:?}", path))?;
    let mut config: CliConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config from {:?}", path))?;
    config.config_path = path.to_path_buf();
    Ok(config)
}

pub fn default_config_path() -> PathBuf {
    project_dirs()
        .map(|d| d.config_dir().join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "cardpicker", "cardpicker")
}

/// Parse a `key=value` filter. A comma-separated value becomes a list.
pub fn parse_filter(input: &str) -> std::result::Result<(String, CriteriaValue), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{input}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{input}'"));
    }

    let value = if value.contains(',') {
        CriteriaValue::list(value.split(',').map(str::trim).filter(|v| !v.is_empty()))
    } else {
        CriteriaValue::scalar(value.trim())
    };
    Ok((key.to_string(), value))
}
