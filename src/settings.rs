//! Process configuration.
//!
//! Loaded once at startup from the environment and passed down by reference.
//! Nothing below `main` reads environment variables.

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com";
pub const DEFAULT_QUICKCHART_URL: &str = "https://quickchart.io";

#[derive(Debug, Default, Deserialize)]
struct EnvSettings {
    notion_api_key: Option<String>,
    notion_database_id: Option<String>,
    notion_api_url: Option<String>,
    quickchart_url: Option<String>,
}

/// Immutable run configuration.
///
/// `Debug` redacts the API key so settings can be logged.
#[derive(Clone)]
pub struct Settings {
    pub notion_api_key: String,
    pub notion_database_id: String,
    pub notion_api_url: String,
    pub quickchart_url: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("notion_api_key", &"[REDACTED]")
            .field("notion_database_id", &self.notion_database_id)
            .field("notion_api_url", &self.notion_api_url)
            .field("quickchart_url", &self.quickchart_url)
            .finish()
    }
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// Required: `NOTION_API_KEY`, `NOTION_DATABASE_ID`.
    /// Optional: `NOTION_API_URL`, `QUICKCHART_URL`.
    pub fn load() -> Result<Self, ConfigError> {
        let source = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;
        Self::from_config(source)
    }

    pub fn from_config(source: config::Config) -> Result<Self, ConfigError> {
        let env: EnvSettings = source.try_deserialize()?;

        Ok(Settings {
            notion_api_key: required(env.notion_api_key, "NOTION_API_KEY")?,
            notion_database_id: required(env.notion_database_id, "NOTION_DATABASE_ID")?,
            notion_api_url: non_empty(env.notion_api_url)
                .unwrap_or_else(|| DEFAULT_NOTION_API_URL.to_string()),
            quickchart_url: non_empty(env.quickchart_url)
                .unwrap_or_else(|| DEFAULT_QUICKCHART_URL.to_string()),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, var: &'static str) -> Result<String, ConfigError> {
    non_empty(value).ok_or(ConfigError::Missing(var))
}
