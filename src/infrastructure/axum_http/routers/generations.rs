use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    application::usecases::{
        gallery::GalleryUseCase,
        generations::{GenerationError, GenerationUseCase},
    },
    domain::{
        repositories::{credit_ledger::CreditLedger, generation_jobs::GenerationJobRepository},
        value_objects::{
            enums::generation_kinds::GenerationKind,
            generation_requests::GenerationRequestModel,
        },
    },
    infrastructure::{
        axum_http::auth::AuthUser,
        memory::repositories::{
            credit_ledger::MemoryCreditLedger, generation_jobs::MemoryGenerationJobs,
        },
        providers::chain::ProviderChain,
    },
};

const DEFAULT_LIST_LIMIT: i64 = 24;
const MAX_LIST_LIMIT: i64 = 96;

#[derive(Debug, Deserialize)]
pub struct ListGenerationsQuery {
    kind: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

/// Both usecases share the generation routes' prefix, so they travel
/// together as one router state.
pub struct GenerationsState<L, J>
where
    L: CreditLedger + Send + Sync + 'static,
    J: GenerationJobRepository + Send + Sync + 'static,
{
    generations: Arc<GenerationUseCase<L, J>>,
    gallery: Arc<GalleryUseCase<J>>,
}

impl<L, J> Clone for GenerationsState<L, J>
where
    L: CreditLedger + Send + Sync + 'static,
    J: GenerationJobRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            generations: Arc::clone(&self.generations),
            gallery: Arc::clone(&self.gallery),
        }
    }
}

pub fn routes(
    ledger: Arc<MemoryCreditLedger>,
    jobs: Arc<MemoryGenerationJobs>,
    image_chain: Arc<ProviderChain>,
    video_chain: Arc<ProviderChain>,
) -> Router {
    let state = GenerationsState {
        generations: Arc::new(GenerationUseCase::new(
            ledger,
            Arc::clone(&jobs),
            image_chain,
            video_chain,
        )),
        gallery: Arc::new(GalleryUseCase::new(jobs)),
    };

    Router::new()
        .route("/", post(create_generation).get(list_generations))
        .route("/:id", get(generation_status))
        .route("/:id/like", post(toggle_like))
        .route("/:id/pin", post(toggle_pin))
        .with_state(state)
}

pub async fn create_generation<L, J>(
    State(state): State<GenerationsState<L, J>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(payload): Json<GenerationRequestModel>,
) -> impl IntoResponse
where
    L: CreditLedger + Send + Sync + 'static,
    J: GenerationJobRepository + Send + Sync + 'static,
{
    info!(
        %user_id,
        kind = %payload.kind,
        model = %payload.model,
        "generations: create request received"
    );
    match state.generations.submit(user_id, payload).await {
        Ok(dto) => (StatusCode::CREATED, Json(dto)).into_response(),
        Err(err) => {
            error!(%user_id, error = %err, "generations: submit rejected");
            err.into_response()
        }
    }
}

pub async fn generation_status<L, J>(
    State(state): State<GenerationsState<L, J>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(job_id): Path<Uuid>,
) -> impl IntoResponse
where
    L: CreditLedger + Send + Sync + 'static,
    J: GenerationJobRepository + Send + Sync + 'static,
{
    match state.generations.job_status(user_id, job_id).await {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => {
            if matches!(err, GenerationError::Internal(_)) {
                error!(%user_id, %job_id, error = %err, "generations: status query failed");
            }
            err.into_response()
        }
    }
}

pub async fn list_generations<L, J>(
    State(state): State<GenerationsState<L, J>>,
    AuthUser { user_id, .. }: AuthUser,
    Query(query): Query<ListGenerationsQuery>,
) -> impl IntoResponse
where
    L: CreditLedger + Send + Sync + 'static,
    J: GenerationJobRepository + Send + Sync + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    if limit <= 0 {
        return (
            StatusCode::BAD_REQUEST,
            "limit must be a positive number".to_string(),
        )
            .into_response();
    }
    if limit > MAX_LIST_LIMIT {
        return (
            StatusCode::BAD_REQUEST,
            format!("limit must be <= {}", MAX_LIST_LIMIT),
        )
            .into_response();
    }
    let offset = query.offset.unwrap_or(0);
    if offset < 0 {
        return (
            StatusCode::BAD_REQUEST,
            "offset must not be negative".to_string(),
        )
            .into_response();
    }

    let kind = match query.kind.as_deref() {
        None => None,
        Some("image") => Some(GenerationKind::Image),
        Some("video") => Some(GenerationKind::Video),
        Some(other) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("kind must be image or video, got: {}", other),
            )
                .into_response();
        }
    };

    match state.gallery.list(user_id, kind, limit, offset).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => {
            error!(%user_id, error = %err, "generations: failed to list jobs");
            err.into_response()
        }
    }
}

pub async fn toggle_like<L, J>(
    State(state): State<GenerationsState<L, J>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(job_id): Path<Uuid>,
) -> impl IntoResponse
where
    L: CreditLedger + Send + Sync + 'static,
    J: GenerationJobRepository + Send + Sync + 'static,
{
    match state.gallery.toggle_like(user_id, job_id).await {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => {
            if matches!(err, GenerationError::Internal(_)) {
                error!(%user_id, %job_id, error = %err, "generations: toggle like failed");
            }
            err.into_response()
        }
    }
}

pub async fn toggle_pin<L, J>(
    State(state): State<GenerationsState<L, J>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(job_id): Path<Uuid>,
) -> impl IntoResponse
where
    L: CreditLedger + Send + Sync + 'static,
    J: GenerationJobRepository + Send + Sync + 'static,
{
    match state.gallery.toggle_pin(user_id, job_id).await {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => {
            if matches!(err, GenerationError::Internal(_)) {
                error!(%user_id, %job_id, error = %err, "generations: toggle pin failed");
            }
            err.into_response()
        }
    }
}
