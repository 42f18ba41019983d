use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    enums::generation_kinds::GenerationKind,
    model_catalog::{self, GenerationModel},
};

#[derive(Debug, Deserialize)]
pub struct ModelsQuery {
    kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModelDto {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: GenerationKind,
    pub cost_credits: i64,
    pub estimated_seconds: u32,
    pub max_duration_seconds: Option<u32>,
    pub is_available: bool,
}

impl From<&'static GenerationModel> for ModelDto {
    fn from(value: &'static GenerationModel) -> Self {
        Self {
            id: value.id,
            name: value.name,
            kind: value.kind.clone(),
            cost_credits: value.cost_credits,
            estimated_seconds: value.estimated_seconds,
            max_duration_seconds: value.max_duration_seconds,
            is_available: value.is_available,
        }
    }
}

pub fn routes() -> Router {
    Router::new().route("/", get(list_models))
}

pub async fn list_models(Query(query): Query<ModelsQuery>) -> impl IntoResponse {
    let models: Vec<&'static GenerationModel> = match query.kind.as_deref() {
        None => model_catalog::catalog().iter().collect(),
        Some("image") => model_catalog::models_for_kind(&GenerationKind::Image),
        Some("video") => model_catalog::models_for_kind(&GenerationKind::Video),
        Some(other) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("kind must be image or video, got: {}", other),
            )
                .into_response();
        }
    };

    let models: Vec<ModelDto> = models.into_iter().map(ModelDto::from).collect();
    Json(models).into_response()
}
