mod client;
pub(crate) mod types;

use async_trait::async_trait;

use crate::error::AiError;
use crate::schema::to_gemini_schema;
use crate::traits::{ChatModel, CompletionRequest};

use client::{GeminiClient, GEMINI_API_URL};
use types::*;

// =============================================================================
// Gemini Adapter
// =============================================================================

/// First-party model family. Schemas are enforced server-side through
/// `responseSchema` instead of being described in the prompt.
#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GEMINI_API_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    fn client(&self) -> GeminiClient {
        GeminiClient::new(self.http.clone(), &self.api_key, &self.base_url)
    }
}

pub(crate) fn build_request(request: &CompletionRequest) -> GenerateRequest {
    let (response_mime_type, response_schema) = match &request.schema {
        Some(schema) => (
            Some("application/json".to_string()),
            Some(to_gemini_schema(schema)),
        ),
        None => (None, None),
    };

    GenerateRequest {
        system_instruction: Content::system(&request.system),
        contents: vec![Content::user(&request.user)],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            response_mime_type,
            response_schema,
        },
    }
}

#[async_trait]
impl ChatModel for Gemini {
    fn provider(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        let body = build_request(request);
        let response = self.client().generate(&request.model, &body).await?;

        response
            .text()
            .ok_or_else(|| AiError::EmptyResponse("gemini".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_with_base_url() {
        let ai = Gemini::new("g-key").with_base_url("https://proxy.example.com/v1beta");
        assert_eq!(ai.base_url, "https://proxy.example.com/v1beta");
        assert_eq!(ai.api_key(), "g-key");
    }

    #[test]
    fn test_free_text_request_has_no_schema() {
        let request = CompletionRequest::new("gemini-3-pro-preview", "sys", "user");
        let body = build_request(&request);
        assert!(body.generation_config.response_schema.is_none());
        assert!(body.generation_config.response_mime_type.is_none());
        assert!((body.generation_config.temperature - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_schema_request_is_converted() {
        let schema = serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {"title": {"type": "string"}},
            "required": ["title"]
        });
        let request = CompletionRequest::new("gemini-3-flash-preview", "sys", "user").schema(schema);
        let body = build_request(&request);

        let converted = body.generation_config.response_schema.unwrap();
        assert_eq!(converted["type"], "OBJECT");
        assert_eq!(converted["properties"]["title"]["type"], "STRING");
        assert_eq!(
            body.generation_config.response_mime_type.as_deref(),
            Some("application/json")
        );
    }
}
