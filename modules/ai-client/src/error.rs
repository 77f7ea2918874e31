use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("Credential missing for model {model}")]
    MissingCredential { model: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Empty response from {0}")]
    EmptyResponse(String),
}

impl AiError {
    /// Configuration errors are raised before any request is sent.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            AiError::Config(_) | AiError::UnsupportedModel(_) | AiError::MissingCredential { .. }
        )
    }
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        AiError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for AiError {
    fn from(e: serde_json::Error) -> Self {
        AiError::Parse(e.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for AiError {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        AiError::Config(format!("invalid header value: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_classification() {
        assert!(AiError::UnsupportedModel("x".into()).is_config());
        assert!(AiError::MissingCredential { model: "glm-4".into() }.is_config());
        assert!(!AiError::Network("reset".into()).is_config());
        assert!(!AiError::Api { status: 500, body: String::new() }.is_config());
    }

    #[test]
    fn test_missing_credential_message_names_model() {
        let err = AiError::MissingCredential {
            model: "deepseek-chat".into(),
        };
        assert_eq!(err.to_string(), "Credential missing for model deepseek-chat");
    }
}
