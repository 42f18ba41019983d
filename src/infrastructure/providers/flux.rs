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

/// Queue-style image backend: submissions come back with a request id that
/// is polled until the render finishes.
pub struct FluxQueueProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct FluxSubmitBody<'a> {
    prompt: &'a str,
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct FluxQueueResponse {
    request_id: String,
    status: String,
    #[serde(default)]
    images: Vec<FluxImage>,
}

#[derive(Debug, Deserialize)]
struct FluxImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct FluxStatusResponse {
    status: String,
    #[serde(default)]
    images: Vec<FluxImage>,
    error: Option<String>,
}

impl FluxQueueProvider {
    pub fn new(endpoint: &ProviderEndpoint) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: endpoint.base_url.clone(),
            api_key: endpoint.api_key.clone(),
        }
    }

    fn auth_header(&self) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("flux api key is not configured");
        }
        Ok(format!("Key {}", self.api_key))
    }
}

#[async_trait]
impl ProviderAdapter for FluxQueueProvider {
    fn name(&self) -> &'static str {
        "flux-queue"
    }

    async fn attempt(&self, request: &NormalizedRequest) -> Result<ProviderOutcome> {
        let auth = self.auth_header()?;
        let body = FluxSubmitBody {
            prompt: &request.prompt,
            width: request.width,
            height: request.height,
        };

        let resp = self
            .http
            .post(format!("{}/v1/queue/flux-pro", self.base_url))
            .header(reqwest::header::AUTHORIZATION, auth)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(resp, "flux submit").await?;
        let queued: FluxQueueResponse = resp.json().await?;

        // Small renders occasionally finish inline.
        if let Some(image) = queued.images.first() {
            return Ok(ProviderOutcome::Completed {
                url: image.url.clone(),
                metadata: None,
            });
        }
        if queued.status == "FAILED" {
            return Ok(ProviderOutcome::Failed {
                reason: "flux rejected the request at submission".to_string(),
            });
        }

        Ok(ProviderOutcome::Accepted {
            handle: queued.request_id,
        })
    }

    async fn check_status(&self, handle: &str) -> Result<ProviderPoll> {
        let auth = self.auth_header()?;
        let resp = self
            .http
            .get(format!("{}/v1/queue/requests/{}", self.base_url, handle))
            .header(reqwest::header::AUTHORIZATION, auth)
            .send()
            .await?;
        let resp = ensure_success(resp, "flux status").await?;
        let status: FluxStatusResponse = resp.json().await?;

        match status.status.as_str() {
            "COMPLETED" => match status.images.first() {
                Some(image) => Ok(ProviderPoll::Completed {
                    url: image.url.clone(),
                }),
                None => Ok(ProviderPoll::Failed {
                    reason: "flux completed without an image".to_string(),
                }),
            },
            "FAILED" => Ok(ProviderPoll::Failed {
                reason: status
                    .error
                    .unwrap_or_else(|| "flux reported failure".to_string()),
            }),
            _ => Ok(ProviderPoll::Pending),
        }
    }
}
