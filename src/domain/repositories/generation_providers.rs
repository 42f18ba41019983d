use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::{
    generation_requests::NormalizedRequest,
    provider_results::{ProviderOutcome, ProviderPoll},
};

/// One external (or local fallback) generation backend.
///
/// Transport faults (timeout, auth failure, malformed response) surface as
/// `Err`; the fallback chain treats them like `ProviderOutcome::Failed` but
/// logs them with detail.
#[async_trait]
#[automock]
pub trait ProviderAdapter {
    fn name(&self) -> &'static str;

    async fn attempt(&self, request: &NormalizedRequest) -> Result<ProviderOutcome>;

    /// Re-queries a previously accepted request by its external handle.
    async fn check_status(&self, handle: &str) -> Result<ProviderPoll>;
}
