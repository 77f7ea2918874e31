use ai_client::AiError;
use thiserror::Error;

/// Errors an orchestration operation can return.
///
/// Only configuration problems surface here. Transport and provider
/// failures are absorbed into each operation's fallback value.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("Model configuration error: {0}")]
    Config(#[from] AiError),
}

impl WorldError {
    /// The underlying provider error.
    pub fn source_error(&self) -> &AiError {
        match self {
            WorldError::Config(e) => e,
        }
    }
}

pub type WorldResult<T> = std::result::Result<T, WorldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_message_names_model() {
        let err: WorldError = AiError::MissingCredential {
            model: "glm-4-flash".into(),
        }
        .into();
        assert!(err.to_string().contains("glm-4-flash"));
        assert!(err.source_error().is_config());
    }
}
