use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// TOML-backed configuration loaded from disk.
/// Secrets (API keys) stay as env vars.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub storyline: StorylineConfig,
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

/// Overrides for the saved per-purpose model selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelsConfig {
    pub chat: Option<String>,
    pub world: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacingConfig {
    /// Pause between refresh pipeline stages.
    pub stage_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            stage_delay_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorylineConfig {
    /// Summarize the storyline after every N messages in a chat.
    pub every_messages: usize,
}

impl Default for StorylineConfig {
    fn default() -> Self {
        Self { every_messages: 20 }
    }
}

/// Extra row for the model → endpoint table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    pub model: String,
    pub url: String,
    /// Vault slot holding this endpoint's key.
    pub provider: String,
}

impl From<&EndpointConfig> for ai_client::EndpointEntry {
    fn from(e: &EndpointConfig) -> Self {
        ai_client::EndpointEntry::new(e.model.clone(), e.url.clone(), e.provider.clone())
    }
}

pub fn parse_config(content: &str) -> Result<FileConfig> {
    toml::from_str(content).context("Failed to parse config TOML")
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config file: {}", path.display()))
}
