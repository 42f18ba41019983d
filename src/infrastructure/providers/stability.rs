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

/// Synchronous image backend: the render is finished (or refused) within a
/// single request, so `check_status` never applies.
pub struct StabilityImageProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct StabilityGenerateBody<'a> {
    prompt: &'a str,
    width: u32,
    height: u32,
    output_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct StabilityGenerateResponse {
    finish_reason: String,
    asset_url: Option<String>,
}

impl StabilityImageProvider {
    pub fn new(endpoint: &ProviderEndpoint) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: endpoint.base_url.clone(),
            api_key: endpoint.api_key.clone(),
        }
    }
}

#[async_trait]
impl ProviderAdapter for StabilityImageProvider {
    fn name(&self) -> &'static str {
        "stability-core"
    }

    async fn attempt(&self, request: &NormalizedRequest) -> Result<ProviderOutcome> {
        if self.api_key.is_empty() {
            bail!("stability api key is not configured");
        }

        let body = StabilityGenerateBody {
            prompt: &request.prompt,
            width: request.width,
            height: request.height,
            output_format: "png",
        };

        let resp = self
            .http
            .post(format!(
                "{}/v2beta/stable-image/generate/core",
                self.base_url
            ))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(resp, "stability generate").await?;
        let generated: StabilityGenerateResponse = resp.json().await?;

        match (generated.finish_reason.as_str(), generated.asset_url) {
            ("SUCCESS", Some(url)) => Ok(ProviderOutcome::Completed {
                url,
                metadata: None,
            }),
            (reason, _) => Ok(ProviderOutcome::Failed {
                reason: format!("stability finished with {}", reason),
            }),
        }
    }

    async fn check_status(&self, handle: &str) -> Result<ProviderPoll> {
        bail!(
            "stability-core serves synchronously; no deferred handle {} exists",
            handle
        )
    }
}
