use serde::Serialize;

use crate::domain::value_objects::enums::generation_kinds::GenerationKind;

/// Static metadata for one generation model a user can request.
///
/// Cost is charged in credits at reservation time; the dimension floor and
/// cap drive output-size expansion during request normalization.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationModel {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: GenerationKind,
    pub cost_credits: i64,
    pub estimated_seconds: u32,
    pub min_dimension: u32,
    pub max_dimension: u32,
    pub default_width: u32,
    pub default_height: u32,
    pub max_duration_seconds: Option<u32>,
    pub is_available: bool,
}

const CATALOG: [GenerationModel; 4] = [
    GenerationModel {
        id: "flux-pro",
        name: "Flux Pro",
        kind: GenerationKind::Image,
        cost_credits: 2,
        estimated_seconds: 20,
        min_dimension: 2048,
        max_dimension: 4096,
        default_width: 1024,
        default_height: 1024,
        max_duration_seconds: None,
        is_available: true,
    },
    GenerationModel {
        id: "sd-core",
        name: "Stable Core",
        kind: GenerationKind::Image,
        cost_credits: 1,
        estimated_seconds: 10,
        min_dimension: 1024,
        max_dimension: 2048,
        default_width: 1024,
        default_height: 1024,
        max_duration_seconds: None,
        is_available: true,
    },
    GenerationModel {
        id: "ray-2",
        name: "Ray 2",
        kind: GenerationKind::Video,
        cost_credits: 8,
        estimated_seconds: 120,
        min_dimension: 720,
        max_dimension: 1920,
        default_width: 1280,
        default_height: 720,
        max_duration_seconds: Some(9),
        is_available: true,
    },
    GenerationModel {
        id: "veo-3",
        name: "Veo 3",
        kind: GenerationKind::Video,
        cost_credits: 10,
        estimated_seconds: 180,
        min_dimension: 720,
        max_dimension: 1920,
        default_width: 1280,
        default_height: 720,
        max_duration_seconds: Some(8),
        is_available: true,
    },
];

pub fn catalog() -> &'static [GenerationModel] {
    &CATALOG
}

pub fn find_model(id: &str) -> Option<&'static GenerationModel> {
    CATALOG.iter().find(|model| model.id == id)
}

pub fn models_for_kind(kind: &GenerationKind) -> Vec<&'static GenerationModel> {
    CATALOG.iter().filter(|model| model.kind == *kind).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_models_by_id() {
        assert_eq!(find_model("flux-pro").unwrap().cost_credits, 2);
        assert_eq!(find_model("ray-2").unwrap().cost_credits, 8);
        assert!(find_model("does-not-exist").is_none());
    }

    #[test]
    fn filters_models_by_kind() {
        let video_models = models_for_kind(&GenerationKind::Video);
        assert_eq!(video_models.len(), 2);
        assert!(video_models.iter().all(|m| m.kind == GenerationKind::Video));
    }

    #[test]
    fn video_models_carry_a_duration_cap() {
        for model in models_for_kind(&GenerationKind::Video) {
            assert!(model.max_duration_seconds.is_some(), "{}", model.id);
        }
    }
}
