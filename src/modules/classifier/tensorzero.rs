use async_trait::async_trait;
use balungpisah_tensorzero::{InferenceRequestBuilder, InputMessage, TensorZeroClient};

use super::{ClassifierClient, ClassifierError};
use crate::core::config::ClassifierConfig;

/// Classifier backed by the TensorZero gateway
pub struct TensorZeroClassifierClient {
    client: TensorZeroClient,
    api_key: String,
    model_name: String,
}

impl TensorZeroClassifierClient {
    pub fn new(tensorzero_url: &str, config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let client = TensorZeroClient::new(tensorzero_url).map_err(|e| {
            tracing::error!("Failed to create TensorZero client: {:?}", e);
            ClassifierError::Unavailable(format!("Failed to create TensorZero client: {}", e))
        })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model_name: config.model_name.clone(),
        })
    }
}

#[async_trait]
impl ClassifierClient for TensorZeroClassifierClient {
    async fn infer(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ClassifierError> {
        // Schema travels in the system prompt rather than as an output schema
        let request = InferenceRequestBuilder::new()
            .model(self.model_name.clone())
            .system(system_prompt.to_string())
            .message(InputMessage::user(user_prompt.to_string()))
            .credentials(serde_json::json!({
                "system_api_key": self.api_key
            }))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build inference request: {:?}", e);
                ClassifierError::Unavailable(format!("Failed to build inference request: {}", e))
            })?;

        let response = self.client.inference(request).await.map_err(|e| {
            tracing::warn!("TensorZero inference failed: {:?}", e);
            ClassifierError::Unavailable(format!("Classifier inference failed: {}", e))
        })?;

        let text = response.text();

        tracing::debug!(
            "Raw classifier response (first 500 chars): {}",
            text.chars().take(500).collect::<String>()
        );

        Ok(text)
    }
}
