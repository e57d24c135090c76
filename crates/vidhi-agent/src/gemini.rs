use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};
use vidhi_core::{backend::CompletionBackend, config::Config, types::CompletionRequest};

/// Calls Gemini's `generateContent` API with a server-held key.
///
/// This is the only type in the workspace that ever sees the credential.
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    pub base_url: String,
    pub model: String,
    /// Per-request timeout in seconds (0 = no limit).
    pub timeout_secs: u64,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: vidhi_core::config::DEFAULT_API_BASE.to_string(),
            model: model.into(),
            timeout_secs: 0,
        }
    }

    /// `None` when no credential is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let key = config.gemini_api_key.as_deref()?;
        Some(
            Self::new(key, &config.gemini_model)
                .with_base_url(&config.gemini_api_base)
                .with_timeout(config.upstream_timeout_s),
        )
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Serialize)]
struct GenerateContentBody<'a> {
    contents: &'a Value,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn generate_content(&self, request: &CompletionRequest) -> Result<Value> {
        let body = GenerateContentBody {
            contents: &request.contents,
            generation_config: request.response_schema.as_ref().map(|schema| GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            }),
        };

        info!(
            model = %self.model,
            turns = request.contents.as_array().map_or(0, Vec::len),
            structured = request.response_schema.is_some(),
            "calling gemini generateContent"
        );

        let mut builder = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body);
        if self.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(self.timeout_secs));
        }

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(timeout_secs = self.timeout_secs, "gemini request timed out");
                bail!("gemini request timed out after {}s", self.timeout_secs);
            }
            Err(e) => {
                warn!("gemini request failed: {e}");
                return Err(e).context("gemini request failed");
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "gemini API error: {body}");
            bail!("gemini request failed with status {status}");
        }

        let data: Value = response
            .json()
            .await
            .context("failed to decode gemini response")?;

        info!(
            model = %self.model,
            candidates = data["candidates"].as_array().map_or(0, Vec::len),
            "gemini response received"
        );

        Ok(data)
    }
}
