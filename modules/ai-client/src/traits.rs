use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::AiError;

// =============================================================================
// Completion Request
// =============================================================================

/// Default temperature for narrative content.
pub const CREATIVE_TEMPERATURE: f32 = 0.8;

/// One system + user exchange sent to a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    /// JSON schema for constrained output. `None` requests free text.
    pub schema: Option<serde_json::Value>,
}

impl CompletionRequest {
    pub fn new(
        model: impl Into<String>,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            user: user.into(),
            temperature: CREATIVE_TEMPERATURE,
            schema: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn wants_json(&self) -> bool {
        self.schema.is_some()
    }
}

// =============================================================================
// ChatModel Trait
// =============================================================================

/// One provider family. Returns the assistant's raw text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn provider(&self) -> &str;
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError>;
}

// =============================================================================
// ModelResolver Trait
// =============================================================================

/// Credentials available for a single call: the per-purpose key, then the vault.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub explicit: Option<&'a str>,
    pub vault: &'a BTreeMap<String, String>,
}

impl<'a> Credentials<'a> {
    pub fn new(explicit: Option<&'a str>, vault: &'a BTreeMap<String, String>) -> Self {
        Self { explicit, vault }
    }
}

/// Maps a model id to the adapter that serves it.
///
/// Resolution never touches the network; every error it returns is a
/// configuration error.
pub trait ModelResolver: Send + Sync {
    fn resolve(&self, model: &str, credentials: Credentials<'_>)
        -> Result<Arc<dyn ChatModel>, AiError>;
}
