use std::sync::Arc;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    domain::{
        entities::generation_jobs::{
            GenerationJobEntity, InsertGenerationJobEntity, UpdateGenerationJobEntity,
        },
        repositories::{
            credit_ledger::{CreditError, CreditLedger},
            generation_jobs::{GenerationJobRepository, TransitionOutcome},
        },
        value_objects::{
            enums::{generation_kinds::GenerationKind, generation_statuses::GenerationStatus},
            generation_requests::{GenerationRequestModel, NormalizedRequest, normalize_request},
            model_catalog,
            provider_results::ProviderPoll,
        },
    },
    infrastructure::providers::chain::{ChainOutcome, ProviderChain},
};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(String),
    #[error("insufficient credits: required {required}, available {available}")]
    InsufficientCredits { required: i64, available: i64 },
    #[error("generation job not found")]
    NotFound,
    #[error("access denied")]
    AccessDenied,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<CreditError> for GenerationError {
    fn from(err: CreditError) -> Self {
        match err {
            CreditError::Insufficient {
                required,
                available,
            } => GenerationError::InsufficientCredits {
                required,
                available,
            },
            other => GenerationError::Internal(anyhow::Error::new(other)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitGenerationDto {
    pub job_id: Uuid,
    pub status: GenerationStatus,
    pub estimated_cost: i64,
    pub estimated_seconds: u32,
}

#[derive(Debug, Serialize)]
pub struct GenerationJobDto {
    pub job_id: Uuid,
    pub kind: GenerationKind,
    pub status: GenerationStatus,
    pub prompt: String,
    pub model: String,
    pub provider: Option<String>,
    pub cost: i64,
    pub result_location: Option<String>,
    pub failure_reason: Option<String>,
    pub liked: bool,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GenerationJobEntity> for GenerationJobDto {
    fn from(value: GenerationJobEntity) -> Self {
        Self {
            job_id: value.id,
            kind: value.kind,
            status: value.status,
            prompt: value.prompt,
            model: value.model,
            provider: value.provider,
            cost: value.cost,
            result_location: value.result_location,
            failure_reason: value.failure_reason,
            liked: value.liked,
            pinned: value.pinned,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// The generation job lifecycle manager.
///
/// `submit` validates, reserves credits and creates the job, then hands the
/// provider-chain walk to a background task so the caller gets its response
/// before any provider is tried. Terminal states are written here and only
/// here; every transition into `failed` refunds the job's cost exactly once.
pub struct GenerationUseCase<L, J>
where
    L: CreditLedger + Send + Sync + 'static,
    J: GenerationJobRepository + Send + Sync + 'static,
{
    ledger: Arc<L>,
    jobs: Arc<J>,
    image_chain: Arc<ProviderChain>,
    video_chain: Arc<ProviderChain>,
}

impl<L, J> GenerationUseCase<L, J>
where
    L: CreditLedger + Send + Sync + 'static,
    J: GenerationJobRepository + Send + Sync + 'static,
{
    pub fn new(
        ledger: Arc<L>,
        jobs: Arc<J>,
        image_chain: Arc<ProviderChain>,
        video_chain: Arc<ProviderChain>,
    ) -> Self {
        Self {
            ledger,
            jobs,
            image_chain,
            video_chain,
        }
    }

    fn chain_for(&self, kind: &GenerationKind) -> &Arc<ProviderChain> {
        match kind {
            GenerationKind::Image => &self.image_chain,
            GenerationKind::Video => &self.video_chain,
        }
    }

    pub async fn submit(
        &self,
        owner_id: Uuid,
        raw: GenerationRequestModel,
    ) -> Result<SubmitGenerationDto, GenerationError> {
        let model = model_catalog::find_model(&raw.model)
            .ok_or_else(|| GenerationError::Validation(format!("unknown model: {}", raw.model)))?;
        if model.kind != raw.kind {
            return Err(GenerationError::Validation(format!(
                "model {} does not produce {} output",
                model.id, raw.kind
            )));
        }
        if !model.is_available {
            return Err(GenerationError::Validation(format!(
                "model {} is not available yet",
                model.id
            )));
        }
        let normalized = normalize_request(model, &raw)
            .map_err(|err| GenerationError::Validation(err.to_string()))?;

        self.ledger.reserve(owner_id, model.cost_credits).await?;

        let insert_entity = InsertGenerationJobEntity {
            owner_id,
            kind: raw.kind.clone(),
            prompt: raw.prompt.trim().to_string(),
            model: model.id.to_string(),
            cost: model.cost_credits,
        };
        let job = match self.jobs.create(insert_entity).await {
            Ok(job) => job,
            Err(err) => {
                // The reservation must not outlive a job that was never created.
                if let Err(refund_err) = self.ledger.refund(owner_id, model.cost_credits).await {
                    error!(
                        %owner_id,
                        error = ?refund_err,
                        "generations: refund after failed job creation also failed"
                    );
                }
                return Err(GenerationError::Internal(err));
            }
        };

        info!(
            %owner_id,
            job_id = %job.id,
            model = model.id,
            cost = model.cost_credits,
            "generations: job accepted; dispatching in background"
        );

        let ledger = Arc::clone(&self.ledger);
        let jobs = Arc::clone(&self.jobs);
        let chain = Arc::clone(self.chain_for(&job.kind));
        let job_for_dispatch = job.clone();
        tokio::spawn(async move {
            Self::run_dispatch(ledger, jobs, chain, job_for_dispatch, normalized).await;
        });

        Ok(SubmitGenerationDto {
            job_id: job.id,
            status: job.status,
            estimated_cost: model.cost_credits,
            estimated_seconds: model.estimated_seconds,
        })
    }

    /// Returns the job for its owner. For a deferred job this also advances
    /// the provider poll state machine, so callers drive completion by
    /// polling this endpoint.
    pub async fn job_status(
        &self,
        requester_id: Uuid,
        job_id: Uuid,
    ) -> Result<GenerationJobDto, GenerationError> {
        let job = self
            .jobs
            .find_by_id(job_id)
            .await
            .map_err(GenerationError::Internal)?
            .ok_or(GenerationError::NotFound)?;
        if job.owner_id != requester_id {
            return Err(GenerationError::AccessDenied);
        }

        if job.status == GenerationStatus::Processing && job.external_handle.is_some() {
            self.advance_deferred(&job).await?;
            let refreshed = self
                .jobs
                .find_by_id(job_id)
                .await
                .map_err(GenerationError::Internal)?
                .ok_or(GenerationError::NotFound)?;
            return Ok(GenerationJobDto::from(refreshed));
        }

        Ok(GenerationJobDto::from(job))
    }

    async fn run_dispatch(
        ledger: Arc<L>,
        jobs: Arc<J>,
        chain: Arc<ProviderChain>,
        job: GenerationJobEntity,
        request: NormalizedRequest,
    ) {
        match jobs
            .transition(job.id, UpdateGenerationJobEntity::begin_processing())
            .await
        {
            Ok(TransitionOutcome::Applied(_)) => {}
            Ok(TransitionOutcome::Rejected { current }) => {
                warn!(
                    job_id = %job.id,
                    status = %current.status,
                    "generations: job was not pending at dispatch; skipping"
                );
                return;
            }
            Err(err) => {
                error!(
                    job_id = %job.id,
                    error = ?err,
                    "generations: failed to mark job processing"
                );
                return;
            }
        }

        match chain.dispatch(&request).await {
            ChainOutcome::Completed { provider, url } => {
                match jobs
                    .transition(
                        job.id,
                        UpdateGenerationJobEntity::completed(Some(provider.to_string()), url),
                    )
                    .await
                {
                    Ok(TransitionOutcome::Applied(_)) => {
                        info!(job_id = %job.id, provider, "generations: job completed");
                    }
                    Ok(TransitionOutcome::Rejected { current }) => {
                        warn!(
                            job_id = %job.id,
                            status = %current.status,
                            "generations: completion discarded; job already terminal"
                        );
                    }
                    Err(err) => {
                        error!(
                            job_id = %job.id,
                            error = ?err,
                            "generations: failed to record completion"
                        );
                    }
                }
            }
            ChainOutcome::Accepted { provider, handle } => {
                match jobs
                    .transition(
                        job.id,
                        UpdateGenerationJobEntity::accepted(provider.to_string(), handle),
                    )
                    .await
                {
                    Ok(_) => {
                        info!(
                            job_id = %job.id,
                            provider,
                            "generations: provider accepted; awaiting status polls"
                        );
                    }
                    Err(err) => {
                        error!(
                            job_id = %job.id,
                            error = ?err,
                            "generations: failed to record provider handle"
                        );
                    }
                }
            }
            ChainOutcome::Exhausted {
                attempts,
                last_reason,
            } => {
                let reason = format!("all {} providers failed: {}", attempts, last_reason);
                if let Err(err) = Self::mark_failed_and_refund(&ledger, &jobs, &job, &reason).await
                {
                    error!(
                        job_id = %job.id,
                        error = ?err,
                        "generations: failed to finalize exhausted job"
                    );
                }
            }
        }
    }

    async fn advance_deferred(&self, job: &GenerationJobEntity) -> Result<(), GenerationError> {
        let chain = self.chain_for(&job.kind);
        let policy = chain.policy();

        let handle = job.external_handle.as_deref().ok_or_else(|| {
            GenerationError::Internal(anyhow!("deferred job {} has no external handle", job.id))
        })?;
        let provider = job.provider.as_deref().ok_or_else(|| {
            GenerationError::Internal(anyhow!("deferred job {} has no provider", job.id))
        })?;

        if let Some(dispatched_at) = job.dispatched_at {
            let window = ChronoDuration::from_std(policy.max_poll_window)
                .map_err(|err| GenerationError::Internal(anyhow!("invalid poll window: {}", err)))?;
            if Utc::now().signed_duration_since(dispatched_at) > window {
                Self::mark_failed_and_refund(
                    &self.ledger,
                    &self.jobs,
                    job,
                    "generation timed out before the provider finished",
                )
                .await
                .map_err(GenerationError::Internal)?;
                return Ok(());
            }
        }

        let attempts = self
            .jobs
            .record_poll_attempt(job.id)
            .await
            .map_err(GenerationError::Internal)?;

        match chain.poll(provider, handle).await {
            Ok(ProviderPoll::Completed { url }) => {
                match self
                    .jobs
                    .transition(job.id, UpdateGenerationJobEntity::completed(None, url))
                    .await
                    .map_err(GenerationError::Internal)?
                {
                    TransitionOutcome::Applied(_) => {
                        info!(job_id = %job.id, provider, "generations: deferred job completed");
                    }
                    TransitionOutcome::Rejected { current } => {
                        debug!(
                            job_id = %job.id,
                            status = %current.status,
                            "generations: deferred completion discarded; job already terminal"
                        );
                    }
                }
            }
            Ok(ProviderPoll::Failed { reason }) => {
                Self::mark_failed_and_refund(&self.ledger, &self.jobs, job, &reason)
                    .await
                    .map_err(GenerationError::Internal)?;
            }
            Ok(ProviderPoll::Pending) => {
                if attempts >= policy.max_poll_attempts {
                    Self::mark_failed_and_refund(
                        &self.ledger,
                        &self.jobs,
                        job,
                        "provider did not finish within the poll budget",
                    )
                    .await
                    .map_err(GenerationError::Internal)?;
                }
            }
            Err(err) => {
                error!(
                    job_id = %job.id,
                    provider,
                    error = ?err,
                    "generations: status poll faulted"
                );
                if attempts >= policy.max_poll_attempts {
                    Self::mark_failed_and_refund(
                        &self.ledger,
                        &self.jobs,
                        job,
                        "status polling kept failing within the poll budget",
                    )
                    .await
                    .map_err(GenerationError::Internal)?;
                }
            }
        }

        Ok(())
    }

    /// The transition outcome is the refund guard: only the caller whose
    /// update lands the job in `failed` credits the cost back, so a job can
    /// never be refunded twice.
    async fn mark_failed_and_refund(
        ledger: &Arc<L>,
        jobs: &Arc<J>,
        job: &GenerationJobEntity,
        reason: &str,
    ) -> Result<()> {
        match jobs
            .transition(job.id, UpdateGenerationJobEntity::failed(reason.to_string()))
            .await?
        {
            TransitionOutcome::Applied(_) => {
                ledger
                    .refund(job.owner_id, job.cost)
                    .await
                    .map_err(anyhow::Error::new)?;
                info!(
                    job_id = %job.id,
                    owner_id = %job.owner_id,
                    cost = job.cost,
                    %reason,
                    "generations: job failed; credits refunded"
                );
            }
            TransitionOutcome::Rejected { current } => {
                debug!(
                    job_id = %job.id,
                    status = %current.status,
                    "generations: terminal state already set; refund skipped"
                );
            }
        }
        Ok(())
    }
}
