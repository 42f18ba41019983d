use std::{sync::Arc, time::Duration};

use anyhow::{Result, anyhow, bail};
use tokio::time::timeout;
use tracing::{debug, error};

use crate::domain::{
    repositories::generation_providers::ProviderAdapter,
    value_objects::{
        enums::generation_kinds::GenerationKind,
        generation_requests::NormalizedRequest,
        provider_results::{ProviderOutcome, ProviderPoll},
    },
};

/// Failure criteria for one chain: how long a single adapter attempt or
/// status poll may take, and how much polling a deferred job gets before it
/// is forced to fail.
#[derive(Debug, Clone)]
pub struct ChainPolicy {
    pub attempt_timeout: Duration,
    pub poll_timeout: Duration,
    pub max_poll_attempts: i32,
    pub max_poll_window: Duration,
}

/// What the chain as a whole produced for one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainOutcome {
    Completed { provider: &'static str, url: String },
    Accepted { provider: &'static str, handle: String },
    Exhausted { attempts: usize, last_reason: String },
}

/// Ordered fallback chain for one generation kind. Adapters are tried
/// strictly in priority order; the first `Completed` or `Accepted` wins.
/// The final adapter is expected to be the deterministic stock fallback,
/// so a fully exhausted chain indicates misconfiguration.
pub struct ProviderChain {
    kind: GenerationKind,
    adapters: Vec<Arc<dyn ProviderAdapter + Send + Sync>>,
    policy: ChainPolicy,
}

impl ProviderChain {
    pub fn new(
        kind: GenerationKind,
        adapters: Vec<Arc<dyn ProviderAdapter + Send + Sync>>,
        policy: ChainPolicy,
    ) -> Self {
        Self {
            kind,
            adapters,
            policy,
        }
    }

    pub fn kind(&self) -> &GenerationKind {
        &self.kind
    }

    pub fn policy(&self) -> &ChainPolicy {
        &self.policy
    }

    pub async fn dispatch(&self, request: &NormalizedRequest) -> ChainOutcome {
        let mut last_reason = "no adapters configured".to_string();

        for adapter in &self.adapters {
            match timeout(self.policy.attempt_timeout, adapter.attempt(request)).await {
                Ok(Ok(ProviderOutcome::Completed { url, metadata })) => {
                    debug!(
                        provider = adapter.name(),
                        kind = %self.kind,
                        metadata = ?metadata,
                        "provider completed synchronously"
                    );
                    return ChainOutcome::Completed {
                        provider: adapter.name(),
                        url,
                    };
                }
                Ok(Ok(ProviderOutcome::Accepted { handle })) => {
                    debug!(
                        provider = adapter.name(),
                        kind = %self.kind,
                        "provider accepted for deferred completion"
                    );
                    return ChainOutcome::Accepted {
                        provider: adapter.name(),
                        handle,
                    };
                }
                Ok(Ok(ProviderOutcome::Failed { reason })) => {
                    debug!(
                        provider = adapter.name(),
                        kind = %self.kind,
                        %reason,
                        "provider declined; falling through"
                    );
                    last_reason = reason;
                }
                Ok(Err(err)) => {
                    error!(
                        provider = adapter.name(),
                        kind = %self.kind,
                        error = ?err,
                        "provider transport fault; falling through"
                    );
                    last_reason = err.to_string();
                }
                Err(_) => {
                    error!(
                        provider = adapter.name(),
                        kind = %self.kind,
                        timeout = ?self.policy.attempt_timeout,
                        "provider attempt timed out; falling through"
                    );
                    last_reason = format!(
                        "{} timed out after {:?}",
                        adapter.name(),
                        self.policy.attempt_timeout
                    );
                }
            }
        }

        ChainOutcome::Exhausted {
            attempts: self.adapters.len(),
            last_reason,
        }
    }

    /// Re-queries the named adapter for a deferred generation.
    pub async fn poll(&self, provider: &str, handle: &str) -> Result<ProviderPoll> {
        let adapter = self
            .adapters
            .iter()
            .find(|adapter| adapter.name() == provider)
            .ok_or_else(|| anyhow!("no adapter named {} in the {} chain", provider, self.kind))?;

        match timeout(self.policy.poll_timeout, adapter.check_status(handle)).await {
            Ok(result) => result,
            Err(_) => bail!(
                "{} status poll timed out after {:?}",
                provider,
                self.policy.poll_timeout
            ),
        }
    }
}
