use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::types::CompletionRequest;

/// Anything that can answer a `generateContent` request.
///
/// The relay's upstream client and the chat client's relay connection both
/// implement this, so the conversation controller never knows which side of
/// the trust boundary it is talking to.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the service's raw JSON response. Non-success upstream
    /// statuses are errors.
    async fn generate_content(&self, request: &CompletionRequest) -> Result<Value>;
}
