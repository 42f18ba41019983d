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

/// Dream-machine-style video backend: generation ids are polled through
/// queued/dreaming states until completed or failed.
pub struct LumaDreamMachineProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct LumaSubmitBody<'a> {
    prompt: &'a str,
    duration: String,
    resolution: String,
}

#[derive(Debug, Deserialize)]
struct LumaGeneration {
    id: String,
    state: String,
    failure_reason: Option<String>,
    assets: Option<LumaAssets>,
}

#[derive(Debug, Deserialize)]
struct LumaAssets {
    video: Option<String>,
}

impl LumaDreamMachineProvider {
    pub fn new(endpoint: &ProviderEndpoint) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: endpoint.base_url.clone(),
            api_key: endpoint.api_key.clone(),
        }
    }

    fn require_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            bail!("luma api key is not configured");
        }
        Ok(())
    }

    fn poll_from(generation: LumaGeneration) -> ProviderPoll {
        match generation.state.as_str() {
            "completed" => match generation.assets.and_then(|assets| assets.video) {
                Some(url) => ProviderPoll::Completed { url },
                None => ProviderPoll::Failed {
                    reason: "luma completed without a video asset".to_string(),
                },
            },
            "failed" => ProviderPoll::Failed {
                reason: generation
                    .failure_reason
                    .unwrap_or_else(|| "luma reported failure".to_string()),
            },
            _ => ProviderPoll::Pending,
        }
    }
}

#[async_trait]
impl ProviderAdapter for LumaDreamMachineProvider {
    fn name(&self) -> &'static str {
        "luma-dream-machine"
    }

    async fn attempt(&self, request: &NormalizedRequest) -> Result<ProviderOutcome> {
        self.require_key()?;

        let body = LumaSubmitBody {
            prompt: &request.prompt,
            duration: format!("{}s", request.duration_seconds.unwrap_or(5)),
            resolution: format!("{}p", request.height.min(request.width)),
        };

        let resp = self
            .http
            .post(format!(
                "{}/dream-machine/v1/generations",
                self.base_url
            ))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(resp, "luma submit").await?;
        let generation: LumaGeneration = resp.json().await?;

        let handle = generation.id.clone();
        match Self::poll_from(generation) {
            ProviderPoll::Completed { url } => Ok(ProviderOutcome::Completed {
                url,
                metadata: None,
            }),
            ProviderPoll::Failed { reason } => Ok(ProviderOutcome::Failed { reason }),
            ProviderPoll::Pending => Ok(ProviderOutcome::Accepted { handle }),
        }
    }

    async fn check_status(&self, handle: &str) -> Result<ProviderPoll> {
        self.require_key()?;

        let resp = self
            .http
            .get(format!(
                "{}/dream-machine/v1/generations/{}",
                self.base_url, handle
            ))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let resp = ensure_success(resp, "luma status").await?;
        let generation: LumaGeneration = resp.json().await?;

        Ok(Self::poll_from(generation))
    }
}
