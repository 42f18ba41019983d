use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::generation_jobs::{
        GenerationJobEntity, InsertGenerationJobEntity, UpdateGenerationJobEntity,
    },
    value_objects::enums::generation_kinds::GenerationKind,
};

/// Result of a lifecycle transition request. `Rejected` means the update
/// would have moved the status backwards or touched a terminal job; the
/// caller that gets `Applied` for a terminal transition is the only one
/// allowed to run its side effects (refund).
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    Applied(GenerationJobEntity),
    Rejected { current: GenerationJobEntity },
}

#[derive(Debug, Clone, Default)]
pub struct JobListFilter {
    pub kind: Option<GenerationKind>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone)]
pub struct JobPage {
    pub jobs: Vec<GenerationJobEntity>,
    pub total: i64,
    pub has_more: bool,
}

#[async_trait]
#[automock]
pub trait GenerationJobRepository {
    async fn create(&self, insert_entity: InsertGenerationJobEntity)
    -> Result<GenerationJobEntity>;

    async fn find_by_id(&self, job_id: Uuid) -> Result<Option<GenerationJobEntity>>;

    /// Merges the partial update, enforcing monotonic status transitions.
    /// Unknown job ids are an error, not a rejection.
    async fn transition(
        &self,
        job_id: Uuid,
        update_entity: UpdateGenerationJobEntity,
    ) -> Result<TransitionOutcome>;

    /// Increments and returns the job's poll-attempt counter.
    async fn record_poll_attempt(&self, job_id: Uuid) -> Result<i32>;

    async fn toggle_like(&self, job_id: Uuid) -> Result<GenerationJobEntity>;

    async fn toggle_pin(&self, job_id: Uuid) -> Result<GenerationJobEntity>;

    /// Jobs owned by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: Uuid, filter: JobListFilter) -> Result<JobPage>;
}
