use std::collections::HashMap;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    entities::generation_jobs::{
        GenerationJobEntity, InsertGenerationJobEntity, UpdateGenerationJobEntity,
    },
    repositories::generation_jobs::{
        GenerationJobRepository, JobListFilter, JobPage, TransitionOutcome,
    },
    value_objects::enums::generation_statuses::GenerationStatus,
};

/// Process-memory job store keyed by job id. Lifecycle writes go through
/// `transition`, which holds the write lock for the whole check-and-merge,
/// so concurrent readers can never observe a status regression.
pub struct MemoryGenerationJobs {
    jobs: RwLock<HashMap<Uuid, GenerationJobEntity>>,
}

impl MemoryGenerationJobs {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryGenerationJobs {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationJobRepository for MemoryGenerationJobs {
    async fn create(
        &self,
        insert_entity: InsertGenerationJobEntity,
    ) -> Result<GenerationJobEntity> {
        let now = Utc::now();
        let entity = GenerationJobEntity {
            id: Uuid::new_v4(),
            owner_id: insert_entity.owner_id,
            kind: insert_entity.kind,
            prompt: insert_entity.prompt,
            model: insert_entity.model,
            provider: None,
            external_handle: None,
            poll_attempts: 0,
            cost: insert_entity.cost,
            status: GenerationStatus::Pending,
            result_location: None,
            failure_reason: None,
            liked: false,
            pinned: false,
            created_at: now,
            updated_at: now,
            dispatched_at: None,
        };

        let mut jobs = self.jobs.write().await;
        jobs.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, job_id: Uuid) -> Result<Option<GenerationJobEntity>> {
        let jobs = self.jobs.read().await;
        Ok(jobs.get(&job_id).cloned())
    }

    async fn transition(
        &self,
        job_id: Uuid,
        update_entity: UpdateGenerationJobEntity,
    ) -> Result<TransitionOutcome> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&job_id)
            .ok_or_else(|| anyhow!("generation job {} not found", job_id))?;

        if job.status.is_terminal() {
            return Ok(TransitionOutcome::Rejected {
                current: job.clone(),
            });
        }
        if let Some(next) = &update_entity.status {
            if next.rank() <= job.status.rank() {
                return Ok(TransitionOutcome::Rejected {
                    current: job.clone(),
                });
            }
        }

        if let Some(status) = update_entity.status {
            job.status = status;
        }
        if let Some(result_location) = update_entity.result_location {
            job.result_location = Some(result_location);
        }
        if let Some(failure_reason) = update_entity.failure_reason {
            job.failure_reason = Some(failure_reason);
        }
        if let Some(provider) = update_entity.provider {
            job.provider = Some(provider);
        }
        if let Some(external_handle) = update_entity.external_handle {
            job.external_handle = Some(external_handle);
        }
        if let Some(dispatched_at) = update_entity.dispatched_at {
            job.dispatched_at = Some(dispatched_at);
        }
        job.updated_at = update_entity.updated_at;

        Ok(TransitionOutcome::Applied(job.clone()))
    }

    async fn record_poll_attempt(&self, job_id: Uuid) -> Result<i32> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&job_id)
            .ok_or_else(|| anyhow!("generation job {} not found", job_id))?;
        job.poll_attempts += 1;
        job.updated_at = Utc::now();
        Ok(job.poll_attempts)
    }

    async fn toggle_like(&self, job_id: Uuid) -> Result<GenerationJobEntity> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&job_id)
            .ok_or_else(|| anyhow!("generation job {} not found", job_id))?;
        job.liked = !job.liked;
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    async fn toggle_pin(&self, job_id: Uuid) -> Result<GenerationJobEntity> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&job_id)
            .ok_or_else(|| anyhow!("generation job {} not found", job_id))?;
        job.pinned = !job.pinned;
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    async fn list_by_owner(&self, owner_id: Uuid, filter: JobListFilter) -> Result<JobPage> {
        let jobs = self.jobs.read().await;
        let mut owned: Vec<GenerationJobEntity> = jobs
            .values()
            .filter(|job| job.owner_id == owner_id)
            .filter(|job| {
                filter
                    .kind
                    .as_ref()
                    .map(|kind| job.kind == *kind)
                    .unwrap_or(true)
            })
            .cloned()
            .collect();

        // Newest first; id breaks created_at ties deterministically.
        owned.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = owned.len() as i64;
        let offset = filter.offset.max(0) as usize;
        let limit = filter.limit.max(0) as usize;
        let page: Vec<GenerationJobEntity> = owned.into_iter().skip(offset).take(limit).collect();
        let has_more = (offset + limit) < total as usize;

        Ok(JobPage {
            jobs: page,
            total,
            has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::enums::generation_kinds::GenerationKind;

    fn insert_entity(owner_id: Uuid) -> InsertGenerationJobEntity {
        InsertGenerationJobEntity {
            owner_id,
            kind: GenerationKind::Image,
            prompt: "a quiet harbor".to_string(),
            model: "flux-pro".to_string(),
            cost: 2,
        }
    }

    async fn advance_to_processing(repo: &MemoryGenerationJobs, job_id: Uuid) {
        let outcome = repo
            .transition(job_id, UpdateGenerationJobEntity::begin_processing())
            .await
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::Applied(_)));
    }

    #[tokio::test]
    async fn jobs_are_created_pending() {
        let repo = MemoryGenerationJobs::new();
        let job = repo.create(insert_entity(Uuid::new_v4())).await.unwrap();
        assert_eq!(job.status, GenerationStatus::Pending);
        assert_eq!(job.poll_attempts, 0);
        assert!(job.result_location.is_none());
    }

    #[tokio::test]
    async fn status_never_moves_backwards() {
        let repo = MemoryGenerationJobs::new();
        let job = repo.create(insert_entity(Uuid::new_v4())).await.unwrap();
        advance_to_processing(&repo, job.id).await;

        // processing -> processing is a regression under the strict order.
        let outcome = repo
            .transition(job.id, UpdateGenerationJobEntity::begin_processing())
            .await
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::Rejected { .. }));

        let current = repo.find_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(current.status, GenerationStatus::Processing);
    }

    #[tokio::test]
    async fn terminal_jobs_reject_every_transition() {
        let repo = MemoryGenerationJobs::new();
        let job = repo.create(insert_entity(Uuid::new_v4())).await.unwrap();
        advance_to_processing(&repo, job.id).await;

        let outcome = repo
            .transition(
                job.id,
                UpdateGenerationJobEntity::completed(
                    Some("stock-gallery".to_string()),
                    "https://assets.example/stock.jpg".to_string(),
                ),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::Applied(_)));

        let outcome = repo
            .transition(
                job.id,
                UpdateGenerationJobEntity::failed("too late".to_string()),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, TransitionOutcome::Rejected { .. }));

        let current = repo.find_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(current.status, GenerationStatus::Completed);
        assert!(current.failure_reason.is_none());
    }

    #[tokio::test]
    async fn exactly_one_terminal_transition_is_applied() {
        let repo = MemoryGenerationJobs::new();
        let job = repo.create(insert_entity(Uuid::new_v4())).await.unwrap();
        advance_to_processing(&repo, job.id).await;

        let mut applied = 0;
        for _ in 0..3 {
            let outcome = repo
                .transition(
                    job.id,
                    UpdateGenerationJobEntity::failed("provider chain exhausted".to_string()),
                )
                .await
                .unwrap();
            if matches!(outcome, TransitionOutcome::Applied(_)) {
                applied += 1;
            }
        }
        assert_eq!(applied, 1);
    }

    #[tokio::test]
    async fn unknown_job_transition_is_an_error() {
        let repo = MemoryGenerationJobs::new();
        let result = repo
            .transition(
                Uuid::new_v4(),
                UpdateGenerationJobEntity::begin_processing(),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn listing_is_newest_first_with_paging() {
        let repo = MemoryGenerationJobs::new();
        let owner_id = Uuid::new_v4();
        for _ in 0..5 {
            repo.create(insert_entity(owner_id)).await.unwrap();
        }
        repo.create(insert_entity(Uuid::new_v4())).await.unwrap();

        let page = repo
            .list_by_owner(
                owner_id,
                JobListFilter {
                    kind: None,
                    limit: 2,
                    offset: 0,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.jobs.len(), 2);
        assert_eq!(page.total, 5);
        assert!(page.has_more);
        assert!(page.jobs[0].created_at >= page.jobs[1].created_at);

        let last_page = repo
            .list_by_owner(
                owner_id,
                JobListFilter {
                    kind: None,
                    limit: 2,
                    offset: 4,
                },
            )
            .await
            .unwrap();
        assert_eq!(last_page.jobs.len(), 1);
        assert!(!last_page.has_more);
    }

    #[tokio::test]
    async fn listing_filters_by_kind() {
        let repo = MemoryGenerationJobs::new();
        let owner_id = Uuid::new_v4();
        repo.create(insert_entity(owner_id)).await.unwrap();
        repo.create(InsertGenerationJobEntity {
            kind: GenerationKind::Video,
            model: "ray-2".to_string(),
            cost: 8,
            ..insert_entity(owner_id)
        })
        .await
        .unwrap();

        let videos = repo
            .list_by_owner(
                owner_id,
                JobListFilter {
                    kind: Some(GenerationKind::Video),
                    limit: 10,
                    offset: 0,
                },
            )
            .await
            .unwrap();
        assert_eq!(videos.total, 1);
        assert_eq!(videos.jobs[0].kind, GenerationKind::Video);
    }

    #[tokio::test]
    async fn toggles_flip_and_flip_back() {
        let repo = MemoryGenerationJobs::new();
        let job = repo.create(insert_entity(Uuid::new_v4())).await.unwrap();

        assert!(repo.toggle_like(job.id).await.unwrap().liked);
        assert!(!repo.toggle_like(job.id).await.unwrap().liked);
        assert!(repo.toggle_pin(job.id).await.unwrap().pinned);
        assert!(!repo.toggle_pin(job.id).await.unwrap().pinned);
    }
}
