use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use ai_client::registry::{DEEPSEEK_SLOT, GEMINI_SLOT, ZHIPU_SLOT};
use ai_client::redact;

/// Application configuration loaded from environment variables.
/// Contains only secrets and paths; models, pacing and extra endpoints
/// live in the TOML [`FileConfig`](crate::file_config::FileConfig).
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Provider keys, keyed by vault slot
    pub provider_keys: BTreeMap<String, String>,

    // Storage
    pub data_dir: PathBuf,

    // Optional TOML config
    pub config_path: Option<PathBuf>,
}

const KEY_VARS: &[(&str, &str)] = &[
    ("GEMINI_API_KEY", GEMINI_SLOT),
    ("ZHIPU_API_KEY", ZHIPU_SLOT),
    ("DEEPSEEK_API_KEY", DEEPSEEK_SLOT),
];

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let provider_keys = KEY_VARS
            .iter()
            .filter_map(|(var, slot)| {
                env::var(var)
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (slot.to_string(), v))
            })
            .collect();

        Self {
            provider_keys,
            data_dir: env::var("POCKETVERSE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".pocketverse")),
            config_path: env::var("POCKETVERSE_CONFIG").ok().map(PathBuf::from),
        }
    }

    /// Copy env keys into vault slots the saved config leaves empty.
    /// Keys the user saved in settings always win.
    pub fn seed_vault(&self, vault: &mut BTreeMap<String, String>) {
        for (slot, key) in &self.provider_keys {
            let slot_value = vault.entry(slot.clone()).or_default();
            if slot_value.trim().is_empty() {
                *slot_value = key.clone();
            }
        }
    }

    pub fn log_redacted(&self) {
        tracing::info!("Config loaded:");
        for (var, slot) in KEY_VARS {
            let shown = self
                .provider_keys
                .get(*slot)
                .map(|k| redact(k))
                .unwrap_or_else(|| "<not set>".to_string());
            tracing::info!("  {}: {}", var, shown);
        }
        tracing::info!("  POCKETVERSE_DATA_DIR: {}", self.data_dir.display());
        if let Some(ref path) = self.config_path {
            tracing::info!("  POCKETVERSE_CONFIG: {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_vault_fills_only_empty_slots() {
        let config = AppConfig {
            provider_keys: BTreeMap::from([
                ("zhipu".to_string(), "env-z".to_string()),
                ("deepseek".to_string(), "env-d".to_string()),
            ]),
            data_dir: PathBuf::from("/tmp"),
            config_path: None,
        };
        let mut vault = BTreeMap::from([
            ("zhipu".to_string(), "saved-z".to_string()),
            ("deepseek".to_string(), " ".to_string()),
        ]);

        config.seed_vault(&mut vault);

        assert_eq!(vault["zhipu"], "saved-z");
        assert_eq!(vault["deepseek"], "env-d");
    }
}
