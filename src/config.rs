use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::archive::ArchiveLayout;
use crate::domain::OrganizationKey;
use crate::error::ExtractorError;

pub const DEFAULT_CONFIG_FILE: &str = "filing-extractor.json";
pub const USER_AGENT_ENV: &str = "FILING_EXTRACTOR_USER_AGENT";

pub const DEFAULT_DATA_URL: &str = "https://data.sec.gov/submissions";
pub const DEFAULT_ARCHIVE_URL: &str = "https://www.sec.gov/Archives/edgar/data";
pub const DEFAULT_PACING_MS: u64 = 200;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub archive: Option<ArchiveEntry>,
    #[serde(default)]
    pub registry: Option<RegistryEntry>,
    #[serde(default)]
    pub organizations: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ArchiveEntry {
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub layout: Option<ArchiveLayout>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RegistryEntry {
    #[serde(default)]
    pub data_url: Option<String>,
    #[serde(default)]
    pub archive_url: Option<String>,
    #[serde(default)]
    pub pacing_ms: Option<u64>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
    pub data_url: String,
    pub archive_url: String,
    pub pacing: Duration,
    pub timeout: Duration,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            archive_url: DEFAULT_ARCHIVE_URL.to_string(),
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub user_agent: String,
    pub database: Utf8PathBuf,
    pub archive_root: Utf8PathBuf,
    pub archive_layout: ArchiveLayout,
    pub registry: RegistrySettings,
    pub organizations: Vec<OrganizationKey>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, ExtractorError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Err(ExtractorError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ExtractorError::ConfigRead(config_path.clone()))?;
        let mut config: Config = serde_json::from_str(&content)
            .map_err(|err| ExtractorError::ConfigParse(err.to_string()))?;

        if let Ok(user_agent) = std::env::var(USER_AGENT_ENV) {
            if !user_agent.trim().is_empty() {
                config.user_agent = Some(user_agent);
            }
        }

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, ExtractorError> {
        let user_agent = config
            .user_agent
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ExtractorError::ConfigValue(
                    "user_agent is required (e.g. \"Example Corp admin@example.com\")".to_string(),
                )
            })?;

        let archive = config.archive.unwrap_or_default();
        let registry = config.registry.unwrap_or_default();
        let defaults = RegistrySettings::default();

        let organizations = config
            .organizations
            .iter()
            .map(|value| value.parse())
            .collect::<Result<Vec<OrganizationKey>, ExtractorError>>()?;

        Ok(ResolvedConfig {
            user_agent,
            database: Utf8PathBuf::from(
                config
                    .database
                    .unwrap_or_else(|| "filing-extractor.db".to_string()),
            ),
            archive_root: Utf8PathBuf::from(archive.root.unwrap_or_else(|| "archive".to_string())),
            archive_layout: archive.layout.unwrap_or_default(),
            registry: RegistrySettings {
                data_url: registry.data_url.unwrap_or(defaults.data_url),
                archive_url: registry.archive_url.unwrap_or(defaults.archive_url),
                pacing: registry
                    .pacing_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.pacing),
                timeout: registry
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.timeout),
            },
            organizations,
        })
    }
}
