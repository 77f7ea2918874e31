mod client;
pub(crate) mod types;

use async_trait::async_trait;

use crate::error::AiError;
use crate::traits::{ChatModel, CompletionRequest};

use client::OpenAiClient;

// =============================================================================
// OpenAI-compatible Adapter
// =============================================================================

/// Any provider exposing an OpenAI-style `chat/completions` endpoint
/// (Zhipu GLM, DeepSeek, ...).
#[derive(Clone)]
pub struct OpenAiCompatible {
    provider: String,
    api_key: String,
    endpoint: String,
    http: reqwest::Client,
}

impl OpenAiCompatible {
    pub fn new(
        provider: impl Into<String>,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    fn client(&self) -> OpenAiClient {
        OpenAiClient::new(self.http.clone(), &self.api_key, &self.endpoint)
    }
}

/// System instruction with the output contract appended.
///
/// `json_object` mode does not take a schema, so the schema travels in the
/// prompt instead. Several providers also reject `json_object` requests whose
/// messages never mention JSON.
pub(crate) fn system_with_schema(system: &str, schema: Option<&serde_json::Value>) -> String {
    match schema {
        Some(schema) => format!(
            "{}\n\n请只输出一个 JSON 对象，严格符合以下 JSON Schema，不要输出任何额外文字：\n{}",
            system.trim_end(),
            schema
        ),
        None => system.to_string(),
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatible {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        let system = system_with_schema(&request.system, request.schema.as_ref());

        let mut wire = types::ChatRequest::new(&request.model)
            .message(types::WireMessage::system(system))
            .message(types::WireMessage::user(&request.user))
            .temperature(request.temperature);

        if request.wants_json() {
            wire = wire.json_object();
        }

        let response = self.client().chat(&wire).await?;

        response
            .text()
            .ok_or_else(|| AiError::EmptyResponse(self.provider.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_compatible_new() {
        let ai = OpenAiCompatible::new(
            "deepseek",
            "sk-test",
            "https://api.deepseek.com/chat/completions",
        );
        assert_eq!(ai.provider(), "deepseek");
        assert_eq!(ai.api_key(), "sk-test");
        assert_eq!(ai.endpoint(), "https://api.deepseek.com/chat/completions");
    }

    #[test]
    fn test_schema_appended_to_system_prompt() {
        let schema = serde_json::json!({"type": "object"});
        let system = system_with_schema("你是记者。", Some(&schema));
        assert!(system.starts_with("你是记者。"));
        assert!(system.contains("JSON"));
        assert!(system.contains("{\"type\":\"object\"}"));
    }

    #[test]
    fn test_free_text_system_prompt_untouched() {
        assert_eq!(system_with_schema("总结剧情。", None), "总结剧情。");
    }
}
