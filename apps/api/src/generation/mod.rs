// Document generation: request validation, prompting, and mapping the
// generator's JSON into a typed ContentModel.
// All LLM calls go through llm_client. No direct Gemini calls here.

pub mod handlers;
pub mod prompts;
pub mod request;
pub mod service;

use thiserror::Error;

use crate::llm_client::LlmError;

pub use request::{GenerationRequest, RequestError};
pub use service::{GeminiGenerationService, GenerationService};

/// Generator failures, surfaced verbatim to the caller and never retried here.
#[derive(Debug, Error, PartialEq)]
pub enum GenerationError {
    #[error("no generator API key is configured; set one in your profile or on the server")]
    MissingCredential,

    #[error("the generator rejected the API key: {0}")]
    InvalidCredential(String),

    #[error("the generator could not be reached: {0}")]
    Network(String),

    #[error("the generator returned an empty response")]
    UpstreamEmpty,

    #[error("the generator returned an unusable document: {0}")]
    Malformed(String),
}

impl From<LlmError> for GenerationError {
    fn from(e: LlmError) -> Self {
        if e.is_credential_error() {
            return match e {
                LlmError::Api { message, .. } => GenerationError::InvalidCredential(message),
                other => GenerationError::InvalidCredential(other.to_string()),
            };
        }
        match e {
            LlmError::EmptyContent => GenerationError::UpstreamEmpty,
            LlmError::Parse(e) => GenerationError::Malformed(e.to_string()),
            LlmError::Http(e) => GenerationError::Network(e.to_string()),
            other @ (LlmError::Api { .. } | LlmError::RateLimited { .. }) => {
                GenerationError::Network(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_message_maps_to_invalid_credential() {
        let err = GenerationError::from(LlmError::Api {
            status: 400,
            message: "API key not valid. Please pass a valid API key.".to_string(),
        });
        assert_eq!(
            err,
            GenerationError::InvalidCredential(
                "API key not valid. Please pass a valid API key.".to_string()
            )
        );
    }

    #[test]
    fn test_forbidden_maps_to_invalid_credential() {
        let err = GenerationError::from(LlmError::Api {
            status: 403,
            message: "permission denied".to_string(),
        });
        assert!(matches!(err, GenerationError::InvalidCredential(_)));
    }

    #[test]
    fn test_server_errors_map_to_network() {
        let err = GenerationError::from(LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        });
        assert!(matches!(err, GenerationError::Network(m) if m.contains("503")));
        assert!(matches!(
            GenerationError::from(LlmError::RateLimited { retries: 3 }),
            GenerationError::Network(_)
        ));
    }

    #[test]
    fn test_empty_and_unparsable_output() {
        assert_eq!(
            GenerationError::from(LlmError::EmptyContent),
            GenerationError::UpstreamEmpty
        );
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(
            GenerationError::from(LlmError::Parse(parse_err)),
            GenerationError::Malformed(_)
        ));
    }
}
