use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    application::usecases::generations::{GenerationError, GenerationJobDto},
    domain::{
        repositories::generation_jobs::{GenerationJobRepository, JobListFilter},
        value_objects::enums::generation_kinds::GenerationKind,
    },
};

#[derive(Debug, Serialize)]
pub struct JobPageDto {
    pub jobs: Vec<GenerationJobDto>,
    pub total: i64,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct LikeToggleDto {
    pub job_id: Uuid,
    pub liked: bool,
}

#[derive(Debug, Serialize)]
pub struct PinToggleDto {
    pub job_id: Uuid,
    pub pinned: bool,
}

/// Owner-scoped listing plus the like/pin toggles. Toggles are independent
/// of the job lifecycle and follow the same access rules as status queries.
pub struct GalleryUseCase<J>
where
    J: GenerationJobRepository + Send + Sync + 'static,
{
    jobs: Arc<J>,
}

impl<J> GalleryUseCase<J>
where
    J: GenerationJobRepository + Send + Sync + 'static,
{
    pub fn new(jobs: Arc<J>) -> Self {
        Self { jobs }
    }

    pub async fn list(
        &self,
        owner_id: Uuid,
        kind: Option<GenerationKind>,
        limit: i64,
        offset: i64,
    ) -> Result<JobPageDto, GenerationError> {
        let page = self
            .jobs
            .list_by_owner(
                owner_id,
                JobListFilter {
                    kind,
                    limit,
                    offset,
                },
            )
            .await
            .map_err(GenerationError::Internal)?;

        Ok(JobPageDto {
            jobs: page.jobs.into_iter().map(GenerationJobDto::from).collect(),
            total: page.total,
            has_more: page.has_more,
        })
    }

    pub async fn toggle_like(
        &self,
        requester_id: Uuid,
        job_id: Uuid,
    ) -> Result<LikeToggleDto, GenerationError> {
        self.authorize(requester_id, job_id).await?;
        let job = self
            .jobs
            .toggle_like(job_id)
            .await
            .map_err(GenerationError::Internal)?;
        Ok(LikeToggleDto {
            job_id: job.id,
            liked: job.liked,
        })
    }

    pub async fn toggle_pin(
        &self,
        requester_id: Uuid,
        job_id: Uuid,
    ) -> Result<PinToggleDto, GenerationError> {
        self.authorize(requester_id, job_id).await?;
        let job = self
            .jobs
            .toggle_pin(job_id)
            .await
            .map_err(GenerationError::Internal)?;
        Ok(PinToggleDto {
            job_id: job.id,
            pinned: job.pinned,
        })
    }

    async fn authorize(&self, requester_id: Uuid, job_id: Uuid) -> Result<(), GenerationError> {
        let job = self
            .jobs
            .find_by_id(job_id)
            .await
            .map_err(GenerationError::Internal)?
            .ok_or(GenerationError::NotFound)?;
        if job.owner_id != requester_id {
            return Err(GenerationError::AccessDenied);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            entities::generation_jobs::InsertGenerationJobEntity,
            repositories::generation_jobs::{JobPage, MockGenerationJobRepository},
        },
        infrastructure::memory::repositories::generation_jobs::MemoryGenerationJobs,
    };

    fn insert_entity(owner_id: Uuid, kind: GenerationKind) -> InsertGenerationJobEntity {
        InsertGenerationJobEntity {
            owner_id,
            kind,
            prompt: "a quiet harbor".to_string(),
            model: "flux-pro".to_string(),
            cost: 2,
        }
    }

    #[tokio::test]
    async fn listing_maps_the_repository_page() {
        let owner_id = Uuid::new_v4();

        let mut jobs = MockGenerationJobRepository::new();
        jobs.expect_list_by_owner()
            .withf(move |id, filter| {
                *id == owner_id && filter.limit == 24 && filter.offset == 0
            })
            .returning(|_, _| {
                Box::pin(async {
                    Ok(JobPage {
                        jobs: vec![],
                        total: 0,
                        has_more: false,
                    })
                })
            });

        let usecase = GalleryUseCase::new(Arc::new(jobs));
        let page = usecase.list(owner_id, None, 24, 0).await.unwrap();
        assert_eq!(page.total, 0);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn toggles_require_ownership() {
        let jobs = Arc::new(MemoryGenerationJobs::new());
        let owner_id = Uuid::new_v4();
        let stranger_id = Uuid::new_v4();
        let job = jobs
            .create(insert_entity(owner_id, GenerationKind::Image))
            .await
            .unwrap();

        let usecase = GalleryUseCase::new(Arc::clone(&jobs));
        assert!(matches!(
            usecase.toggle_like(stranger_id, job.id).await,
            Err(GenerationError::AccessDenied)
        ));
        assert!(matches!(
            usecase.toggle_pin(stranger_id, job.id).await,
            Err(GenerationError::AccessDenied)
        ));
        assert!(matches!(
            usecase.toggle_like(owner_id, Uuid::new_v4()).await,
            Err(GenerationError::NotFound)
        ));
    }

    #[tokio::test]
    async fn toggles_flip_deterministically() {
        let jobs = Arc::new(MemoryGenerationJobs::new());
        let owner_id = Uuid::new_v4();
        let job = jobs
            .create(insert_entity(owner_id, GenerationKind::Image))
            .await
            .unwrap();

        let usecase = GalleryUseCase::new(Arc::clone(&jobs));
        assert!(usecase.toggle_like(owner_id, job.id).await.unwrap().liked);
        assert!(!usecase.toggle_like(owner_id, job.id).await.unwrap().liked);
        assert!(usecase.toggle_pin(owner_id, job.id).await.unwrap().pinned);
    }

    #[tokio::test]
    async fn listing_respects_the_kind_filter() {
        let jobs = Arc::new(MemoryGenerationJobs::new());
        let owner_id = Uuid::new_v4();
        jobs.create(insert_entity(owner_id, GenerationKind::Image))
            .await
            .unwrap();
        jobs.create(insert_entity(owner_id, GenerationKind::Video))
            .await
            .unwrap();

        let usecase = GalleryUseCase::new(Arc::clone(&jobs));
        let page = usecase
            .list(owner_id, Some(GenerationKind::Video), 10, 0)
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.jobs[0].kind, GenerationKind::Video);
    }
}
