use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    config::config_model::ProviderEndpoint,
    domain::{
        repositories::generation_providers::ProviderAdapter,
        value_objects::{
            generation_requests::NormalizedRequest,
            provider_results::{ProviderOutcome, ProviderPoll},
        },
    },
    infrastructure::providers::ensure_success,
};

/// Long-running-operation video backend: submission returns an operation
/// name that is polled until `done`.
pub struct VeoVideoProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct VeoSubmitBody<'a> {
    prompt: &'a str,
    duration_seconds: u32,
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct VeoOperation {
    name: Option<String>,
    #[serde(default)]
    done: bool,
    error: Option<VeoOperationError>,
    response: Option<VeoOperationResponse>,
}

#[derive(Debug, Deserialize)]
struct VeoOperationError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct VeoOperationResponse {
    video_uri: Option<String>,
}

impl VeoVideoProvider {
    pub fn new(endpoint: &ProviderEndpoint) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: endpoint.base_url.clone(),
            api_key: endpoint.api_key.clone(),
        }
    }

    fn require_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            bail!("veo api key is not configured");
        }
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for VeoVideoProvider {
    fn name(&self) -> &'static str {
        "veo-video"
    }

    async fn attempt(&self, request: &NormalizedRequest) -> Result<ProviderOutcome> {
        self.require_key()?;

        let body = VeoSubmitBody {
            prompt: &request.prompt,
            duration_seconds: request.duration_seconds.unwrap_or(5),
            aspect_ratio: format!("{}:{}", request.width, request.height),
        };

        let resp = self
            .http
            .post(format!(
                "{}/v1/models/veo-3:predictLongRunning",
                self.base_url
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(resp, "veo submit").await?;
        let operation: VeoOperation = resp.json().await?;

        if let Some(error) = operation.error {
            return Ok(ProviderOutcome::Failed {
                reason: error.message,
            });
        }
        match operation.name {
            Some(name) => Ok(ProviderOutcome::Accepted { handle: name }),
            None => Ok(ProviderOutcome::Failed {
                reason: "veo accepted without an operation name".to_string(),
            }),
        }
    }

    async fn check_status(&self, handle: &str) -> Result<ProviderPoll> {
        self.require_key()?;

        let resp = self
            .http
            .get(format!("{}/v1/{}", self.base_url, handle))
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;
        let resp = ensure_success(resp, "veo status").await?;
        let operation: VeoOperation = resp.json().await?;

        if !operation.done {
            return Ok(ProviderPoll::Pending);
        }
        if let Some(error) = operation.error {
            return Ok(ProviderPoll::Failed {
                reason: error.message,
            });
        }
        match operation.response.and_then(|r| r.video_uri) {
            Some(url) => Ok(ProviderPoll::Completed { url }),
            None => Ok(ProviderPoll::Failed {
                reason: "veo finished without a video uri".to_string(),
            }),
        }
    }
}
