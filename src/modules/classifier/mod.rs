//! Classifier capability
//!
//! Opaque text-in/text-out access to an external content classifier. The
//! response is untrusted free-form text; parsing happens in the adapter.

mod tensorzero;

pub use tensorzero::TensorZeroClassifierClient;

use async_trait::async_trait;
use thiserror::Error;

/// Failures of the classifier layer. Never surfaced to submitters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    /// Network error, timeout or gateway not configured
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    /// Response could not be parsed or lacked required fields
    #[error("Classifier response invalid: {0}")]
    ResponseInvalid(String),
}

impl ClassifierError {
    /// Only transport failures are worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, ClassifierError::Unavailable(_))
    }
}

#[async_trait]
pub trait ClassifierClient: Send + Sync {
    /// Send one prompt pair, returning the raw response text
    async fn infer(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, ClassifierError>;
}

/// Stand-in used when no gateway is configured; every call takes the fallback path
pub struct DisabledClassifierClient;

#[async_trait]
impl ClassifierClient for DisabledClassifierClient {
    async fn infer(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String, ClassifierError> {
        Err(ClassifierError::Unavailable(
            "classifier gateway is not configured".to_string(),
        ))
    }
}
