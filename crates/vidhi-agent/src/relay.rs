use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use vidhi_core::{
    backend::CompletionBackend,
    types::{ChatRequest, CompletionRequest, ErrorBody},
};

/// Client side of the relay: posts the whole history to `/api/chat` and
/// hands back whatever the relay returned. Holds no credential.
pub struct RelayClient {
    client: Client,
    pub base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl CompletionBackend for RelayClient {
    async fn generate_content(&self, request: &CompletionRequest) -> Result<Value> {
        let body = ChatRequest::from(request);
        debug!(
            url = %self.endpoint(),
            structured = body.response_schema.is_some(),
            "posting to relay"
        );

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .context("relay request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or(text);
            warn!(status = %status, "relay returned an error: {message}");
            bail!("relay request failed with status {status}: {message}");
        }

        response
            .json()
            .await
            .context("failed to decode relay response")
    }
}
