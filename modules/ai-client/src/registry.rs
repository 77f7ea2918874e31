//! Model id → provider adapter lookup.
//!
//! Gemini models are served by the first-party adapter. Everything else must
//! appear in the endpoint table and is served by [`OpenAiCompatible`].

use std::sync::Arc;

use tracing::debug;

use crate::error::AiError;
use crate::gemini::Gemini;
use crate::openai::OpenAiCompatible;
use crate::traits::{ChatModel, Credentials, ModelResolver};

pub const ZHIPU_CHAT_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";
pub const DEEPSEEK_CHAT_URL: &str = "https://api.deepseek.com/chat/completions";

/// Vault slot names.
pub const GEMINI_SLOT: &str = "gemini";
pub const ZHIPU_SLOT: &str = "zhipu";
pub const DEEPSEEK_SLOT: &str = "deepseek";

/// One row of the model → endpoint table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointEntry {
    pub model: String,
    pub url: String,
    pub provider: String,
}

impl EndpointEntry {
    pub fn new(
        model: impl Into<String>,
        url: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            url: url.into(),
            provider: provider.into(),
        }
    }
}

fn builtin_endpoints() -> Vec<EndpointEntry> {
    vec![
        EndpointEntry::new("glm-4-plus", ZHIPU_CHAT_URL, ZHIPU_SLOT),
        EndpointEntry::new("glm-4-air", ZHIPU_CHAT_URL, ZHIPU_SLOT),
        EndpointEntry::new("glm-4-flash", ZHIPU_CHAT_URL, ZHIPU_SLOT),
        EndpointEntry::new("glm-4", ZHIPU_CHAT_URL, ZHIPU_SLOT),
        EndpointEntry::new("deepseek-chat", DEEPSEEK_CHAT_URL, DEEPSEEK_SLOT),
        EndpointEntry::new("deepseek-reasoner", DEEPSEEK_CHAT_URL, DEEPSEEK_SLOT),
    ]
}

pub fn is_gemini(model: &str) -> bool {
    model.starts_with("gemini")
}

/// Vault slot implied by a model id, by substring.
pub fn infer_vault_slot(model: &str) -> Option<&'static str> {
    let model = model.to_ascii_lowercase();
    if model.contains("gemini") {
        Some(GEMINI_SLOT)
    } else if model.contains("glm") {
        Some(ZHIPU_SLOT)
    } else if model.contains("deepseek") {
        Some(DEEPSEEK_SLOT)
    } else {
        None
    }
}

/// Credential for `model`: explicit key first, then the inferred vault slot,
/// then the table's provider slot. Blank strings count as absent.
pub fn resolve_credential(
    model: &str,
    table_slot: Option<&str>,
    credentials: Credentials<'_>,
) -> Result<String, AiError> {
    let non_blank = |s: &&str| !s.trim().is_empty();

    if let Some(key) = credentials.explicit.filter(non_blank) {
        return Ok(key.trim().to_string());
    }

    infer_vault_slot(model)
        .into_iter()
        .chain(table_slot)
        .filter_map(|slot| credentials.vault.get(slot).map(String::as_str))
        .find(non_blank)
        .map(|key| key.trim().to_string())
        .ok_or_else(|| AiError::MissingCredential {
            model: model.to_string(),
        })
}

#[derive(Clone)]
pub struct ProviderRegistry {
    endpoints: Vec<EndpointEntry>,
    gemini_base_url: Option<String>,
    http: reqwest::Client,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            endpoints: builtin_endpoints(),
            gemini_base_url: None,
            http: reqwest::Client::new(),
        }
    }

    /// Add or replace a table row. Later rows win over built-ins.
    pub fn with_endpoint(mut self, entry: EndpointEntry) -> Self {
        self.endpoints.retain(|e| e.model != entry.model);
        self.endpoints.push(entry);
        self
    }

    pub fn with_gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.gemini_base_url = Some(url.into());
        self
    }

    pub fn endpoint(&self, model: &str) -> Option<&EndpointEntry> {
        self.endpoints.iter().find(|e| e.model == model)
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.endpoints.iter().map(|e| e.model.as_str())
    }
}

impl ModelResolver for ProviderRegistry {
    fn resolve(
        &self,
        model: &str,
        credentials: Credentials<'_>,
    ) -> Result<Arc<dyn ChatModel>, AiError> {
        if is_gemini(model) {
            let key = resolve_credential(model, Some(GEMINI_SLOT), credentials)?;
            let mut gemini = Gemini::new(key).with_http(self.http.clone());
            if let Some(ref url) = self.gemini_base_url {
                gemini = gemini.with_base_url(url);
            }
            debug!(model, provider = "gemini", "Resolved model");
            return Ok(Arc::new(gemini));
        }

        let entry = self
            .endpoint(model)
            .ok_or_else(|| AiError::UnsupportedModel(model.to_string()))?;
        let key = resolve_credential(model, Some(&entry.provider), credentials)?;

        debug!(model, provider = %entry.provider, "Resolved model");
        Ok(Arc::new(
            OpenAiCompatible::new(entry.provider.clone(), key, entry.url.clone())
                .with_http(self.http.clone()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn vault(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_explicit_key_wins_over_vault() {
        let v = vault(&[("deepseek", "vault-key")]);
        let key = resolve_credential(
            "deepseek-chat",
            Some("deepseek"),
            Credentials::new(Some("explicit-key"), &v),
        )
        .unwrap();
        assert_eq!(key, "explicit-key");
    }

    #[test]
    fn test_vault_slot_inferred_from_model_id() {
        let v = vault(&[("zhipu", "z-key"), ("deepseek", "d-key")]);
        assert_eq!(
            resolve_credential("glm-4-flash", None, Credentials::new(None, &v)).unwrap(),
            "z-key"
        );
        assert_eq!(
            resolve_credential("deepseek-reasoner", None, Credentials::new(None, &v)).unwrap(),
            "d-key"
        );
    }

    #[test]
    fn test_blank_explicit_key_falls_back_to_vault() {
        let v = vault(&[("zhipu", "z-key")]);
        let key =
            resolve_credential("glm-4", None, Credentials::new(Some("   "), &v)).unwrap();
        assert_eq!(key, "z-key");
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        let v = BTreeMap::new();
        let err = ProviderRegistry::new()
            .resolve("deepseek-chat", Credentials::new(None, &v))
            .err()
            .unwrap();
        assert!(matches!(err, AiError::MissingCredential { ref model } if model == "deepseek-chat"));
        assert!(err.is_config());
    }

    #[test]
    fn test_unknown_model_is_unsupported() {
        let v = vault(&[("deepseek", "d-key")]);
        let err = ProviderRegistry::new()
            .resolve("llama-3-70b", Credentials::new(Some("k"), &v))
            .err()
            .unwrap();
        assert!(matches!(err, AiError::UnsupportedModel(ref m) if m == "llama-3-70b"));
    }

    #[test]
    fn test_gemini_resolves_without_table_entry() {
        let v = vault(&[("gemini", "g-key")]);
        let model = ProviderRegistry::new()
            .resolve("gemini-3-flash-preview", Credentials::new(None, &v))
            .unwrap();
        assert_eq!(model.provider(), "gemini");
    }

    #[test]
    fn test_table_resolution_picks_provider() {
        let v = vault(&[("zhipu", "z-key")]);
        let model = ProviderRegistry::new()
            .resolve("glm-4-plus", Credentials::new(None, &v))
            .unwrap();
        assert_eq!(model.provider(), "zhipu");
    }

    #[test]
    fn test_custom_endpoint_uses_its_provider_slot() {
        let v = vault(&[("moonshot", "m-key")]);
        let registry = ProviderRegistry::new().with_endpoint(EndpointEntry::new(
            "moonshot-v1-8k",
            "https://api.moonshot.cn/v1/chat/completions",
            "moonshot",
        ));
        let model = registry
            .resolve("moonshot-v1-8k", Credentials::new(None, &v))
            .unwrap();
        assert_eq!(model.provider(), "moonshot");
    }
}
