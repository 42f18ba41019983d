use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_objects::enums::{
    generation_kinds::GenerationKind, generation_statuses::GenerationStatus,
};

/// One request to produce one generated asset and its tracked lifecycle.
///
/// `cost` is immutable once set; `result_location` is only ever written on
/// the transition to completed, `failure_reason` on the transition to
/// failed. `liked`/`pinned` are user-toggleable and independent of the
/// lifecycle.
#[derive(Debug, Clone)]
pub struct GenerationJobEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: GenerationKind,
    pub prompt: String,
    pub model: String,
    pub provider: Option<String>,
    pub external_handle: Option<String>,
    pub poll_attempts: i32,
    pub cost: i64,
    pub status: GenerationStatus,
    pub result_location: Option<String>,
    pub failure_reason: Option<String>,
    pub liked: bool,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub dispatched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct InsertGenerationJobEntity {
    pub owner_id: Uuid,
    pub kind: GenerationKind,
    pub prompt: String,
    pub model: String,
    pub cost: i64,
}

/// Partial lifecycle update merged by the job store. `status: None` leaves
/// the status untouched (used when recording the serving provider and
/// external handle of a deferred job).
#[derive(Debug, Clone)]
pub struct UpdateGenerationJobEntity {
    pub status: Option<GenerationStatus>,
    pub result_location: Option<String>,
    pub failure_reason: Option<String>,
    pub provider: Option<String>,
    pub external_handle: Option<String>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl UpdateGenerationJobEntity {
    pub fn begin_processing() -> Self {
        Self {
            status: Some(GenerationStatus::Processing),
            result_location: None,
            failure_reason: None,
            provider: None,
            external_handle: None,
            dispatched_at: Some(Utc::now()),
            updated_at: Utc::now(),
        }
    }

    pub fn completed(provider: Option<String>, url: String) -> Self {
        Self {
            status: Some(GenerationStatus::Completed),
            result_location: Some(url),
            failure_reason: None,
            provider,
            external_handle: None,
            dispatched_at: None,
            updated_at: Utc::now(),
        }
    }

    pub fn accepted(provider: String, handle: String) -> Self {
        Self {
            status: None,
            result_location: None,
            failure_reason: None,
            provider: Some(provider),
            external_handle: Some(handle),
            dispatched_at: None,
            updated_at: Utc::now(),
        }
    }

    pub fn failed(reason: String) -> Self {
        Self {
            status: Some(GenerationStatus::Failed),
            result_location: None,
            failure_reason: Some(reason),
            provider: None,
            external_handle: None,
            dispatched_at: None,
            updated_at: Utc::now(),
        }
    }
}
