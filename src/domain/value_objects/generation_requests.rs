use serde::Deserialize;
use thiserror::Error;

use crate::domain::value_objects::{
    enums::generation_kinds::GenerationKind, model_catalog::GenerationModel,
};

pub const MAX_IMAGE_PROMPT_CHARS: usize = 1000;
pub const MAX_VIDEO_PROMPT_CHARS: usize = 500;

const IMAGE_QUALITY_SUFFIX: &str = "highly detailed, 8k resolution";
const VIDEO_QUALITY_SUFFIX: &str = "smooth motion, high frame rate";

const STYLE_SUFFIXES: &[(&str, &str)] = &[
    (
        "photorealistic",
        "ultra photorealistic, natural lighting, sharp focus",
    ),
    ("anime", "anime style, vibrant colors, clean line art"),
    (
        "cinematic",
        "cinematic composition, dramatic lighting, film grain",
    ),
    ("watercolor", "watercolor painting, soft washes, textured paper"),
    ("3d", "3d render, volumetric lighting, global illumination"),
];

/// Raw create-generation payload as received from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequestModel {
    pub prompt: String,
    pub kind: GenerationKind,
    pub model: String,
    pub style: Option<String>,
    pub size: Option<String>,
    pub duration_seconds: Option<u32>,
}

/// Request after validation and enrichment, ready for adapter dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub prompt: String,
    pub kind: GenerationKind,
    pub model_id: String,
    pub width: u32,
    pub height: u32,
    pub duration_seconds: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestValidationError {
    #[error("prompt must not be empty")]
    EmptyPrompt,
    #[error("prompt exceeds the {max} character limit for {kind} generation ({actual} characters)")]
    PromptTooLong {
        kind: GenerationKind,
        max: usize,
        actual: usize,
    },
    #[error("unknown style preset: {0}")]
    UnknownStyle(String),
    #[error("size must look like 1024x768, got: {0}")]
    InvalidSize(String),
    #[error("duration must be between 1 and {max} seconds")]
    InvalidDuration { max: u32 },
}

pub fn max_prompt_chars(kind: &GenerationKind) -> usize {
    match kind {
        GenerationKind::Image => MAX_IMAGE_PROMPT_CHARS,
        GenerationKind::Video => MAX_VIDEO_PROMPT_CHARS,
    }
}

/// Trim and bound the prompt, append style and quality suffixes, and expand
/// the requested size to the model's quality floor.
pub fn normalize_request(
    model: &GenerationModel,
    raw: &GenerationRequestModel,
) -> Result<NormalizedRequest, RequestValidationError> {
    let trimmed = raw.prompt.trim();
    if trimmed.is_empty() {
        return Err(RequestValidationError::EmptyPrompt);
    }

    let max = max_prompt_chars(&raw.kind);
    let actual = trimmed.chars().count();
    if actual > max {
        return Err(RequestValidationError::PromptTooLong {
            kind: raw.kind.clone(),
            max,
            actual,
        });
    }

    let style_suffix = match &raw.style {
        Some(style) => {
            let lowered = style.trim().to_ascii_lowercase();
            let suffix = STYLE_SUFFIXES
                .iter()
                .find(|(name, _)| *name == lowered)
                .map(|(_, suffix)| *suffix)
                .ok_or_else(|| RequestValidationError::UnknownStyle(style.clone()))?;
            Some(suffix)
        }
        None => None,
    };

    let quality_suffix = match raw.kind {
        GenerationKind::Image => IMAGE_QUALITY_SUFFIX,
        GenerationKind::Video => VIDEO_QUALITY_SUFFIX,
    };

    let prompt = match style_suffix {
        Some(style) => format!("{}, {}, {}", trimmed, style, quality_suffix),
        None => format!("{}, {}", trimmed, quality_suffix),
    };

    let (raw_width, raw_height) = match &raw.size {
        Some(size) => parse_size(size)?,
        None => (model.default_width, model.default_height),
    };
    let (width, height) = expand_dimensions(
        raw_width,
        raw_height,
        model.min_dimension,
        model.max_dimension,
    );

    let duration_seconds = match raw.kind {
        GenerationKind::Image => None,
        GenerationKind::Video => {
            let max_duration = model.max_duration_seconds.unwrap_or(5);
            let requested = raw.duration_seconds.unwrap_or(max_duration);
            if requested == 0 || requested > max_duration {
                return Err(RequestValidationError::InvalidDuration { max: max_duration });
            }
            Some(requested)
        }
    };

    Ok(NormalizedRequest {
        prompt,
        kind: raw.kind.clone(),
        model_id: model.id.to_string(),
        width,
        height,
        duration_seconds,
    })
}

fn parse_size(raw: &str) -> Result<(u32, u32), RequestValidationError> {
    let invalid = || RequestValidationError::InvalidSize(raw.to_string());

    let (width, height) = raw.split_once('x').ok_or_else(invalid)?;
    let width: u32 = width.trim().parse().map_err(|_| invalid())?;
    let height: u32 = height.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}

/// Scale so the smaller side meets `floor` (never downscales), then apply
/// the output-size contract: dim' = floor(clamp(dim * scale, min, max) / 8) * 8.
pub fn expand_dimensions(width: u32, height: u32, floor: u32, cap: u32) -> (u32, u32) {
    let smaller = width.min(height).max(1);
    let scale = if smaller < floor {
        f64::from(floor) / f64::from(smaller)
    } else {
        1.0
    };

    let expand = |dim: u32| -> u32 {
        let scaled = (f64::from(dim) * scale).clamp(f64::from(floor), f64::from(cap));
        (scaled as u32 / 8) * 8
    };

    (expand(width), expand(height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::model_catalog::find_model;

    fn image_request(prompt: &str) -> GenerationRequestModel {
        GenerationRequestModel {
            prompt: prompt.to_string(),
            kind: GenerationKind::Image,
            model: "flux-pro".to_string(),
            style: None,
            size: None,
            duration_seconds: None,
        }
    }

    #[test]
    fn quality_floor_expands_small_sizes() {
        assert_eq!(expand_dimensions(512, 512, 2048, 4096), (2048, 2048));
    }

    #[test]
    fn expanded_dimensions_are_multiples_of_eight() {
        for (w, h) in [(512, 512), (500, 375), (1023, 767), (300, 1000)] {
            let (width, height) = expand_dimensions(w, h, 2048, 4096);
            assert_eq!(width % 8, 0, "{}x{}", w, h);
            assert_eq!(height % 8, 0, "{}x{}", w, h);
            assert!(width >= 2048 && width <= 4096);
            assert!(height >= 2048 && height <= 4096);
        }
    }

    #[test]
    fn sizes_above_the_floor_are_not_downscaled() {
        assert_eq!(expand_dimensions(2048, 3072, 2048, 4096), (2048, 3072));
    }

    #[test]
    fn scaled_dimensions_are_clamped_to_the_cap() {
        // 512 scales x4 to meet the 2048 floor; 4096 would become 16384.
        let (width, height) = expand_dimensions(512, 4096, 2048, 4096);
        assert_eq!((width, height), (2048, 4096));
    }

    #[test]
    fn prompt_is_trimmed_and_suffixed() {
        let model = find_model("flux-pro").unwrap();
        let normalized = normalize_request(model, &image_request("  a quiet harbor  ")).unwrap();
        assert_eq!(
            normalized.prompt,
            "a quiet harbor, highly detailed, 8k resolution"
        );
    }

    #[test]
    fn style_preset_is_appended_before_the_quality_suffix() {
        let model = find_model("flux-pro").unwrap();
        let mut raw = image_request("a quiet harbor");
        raw.style = Some("Cinematic".to_string());
        let normalized = normalize_request(model, &raw).unwrap();
        assert_eq!(
            normalized.prompt,
            "a quiet harbor, cinematic composition, dramatic lighting, film grain, highly detailed, 8k resolution"
        );
    }

    #[test]
    fn unknown_style_is_rejected() {
        let model = find_model("flux-pro").unwrap();
        let mut raw = image_request("a quiet harbor");
        raw.style = Some("vaporwave".to_string());
        assert_eq!(
            normalize_request(model, &raw),
            Err(RequestValidationError::UnknownStyle("vaporwave".to_string()))
        );
    }

    #[test]
    fn empty_prompt_is_rejected() {
        let model = find_model("flux-pro").unwrap();
        assert_eq!(
            normalize_request(model, &image_request("   ")),
            Err(RequestValidationError::EmptyPrompt)
        );
    }

    #[test]
    fn oversized_prompt_is_rejected_per_kind() {
        let model = find_model("ray-2").unwrap();
        let raw = GenerationRequestModel {
            prompt: "x".repeat(MAX_VIDEO_PROMPT_CHARS + 1),
            kind: GenerationKind::Video,
            model: "ray-2".to_string(),
            style: None,
            size: None,
            duration_seconds: None,
        };
        assert!(matches!(
            normalize_request(model, &raw),
            Err(RequestValidationError::PromptTooLong { max: 500, .. })
        ));
    }

    #[test]
    fn requested_size_is_parsed_and_expanded() {
        let model = find_model("flux-pro").unwrap();
        let mut raw = image_request("a quiet harbor");
        raw.size = Some("512x512".to_string());
        let normalized = normalize_request(model, &raw).unwrap();
        assert_eq!((normalized.width, normalized.height), (2048, 2048));
    }

    #[test]
    fn malformed_size_is_rejected() {
        let model = find_model("flux-pro").unwrap();
        for size in ["512", "512x", "x512", "512by512", "0x512"] {
            let mut raw = image_request("a quiet harbor");
            raw.size = Some(size.to_string());
            assert!(
                matches!(
                    normalize_request(model, &raw),
                    Err(RequestValidationError::InvalidSize(_))
                ),
                "size {:?} should be rejected",
                size
            );
        }
    }

    #[test]
    fn video_duration_defaults_to_the_model_cap() {
        let model = find_model("ray-2").unwrap();
        let raw = GenerationRequestModel {
            prompt: "waves at dusk".to_string(),
            kind: GenerationKind::Video,
            model: "ray-2".to_string(),
            style: None,
            size: None,
            duration_seconds: None,
        };
        let normalized = normalize_request(model, &raw).unwrap();
        assert_eq!(normalized.duration_seconds, Some(9));
    }

    #[test]
    fn video_duration_above_the_cap_is_rejected() {
        let model = find_model("ray-2").unwrap();
        let raw = GenerationRequestModel {
            prompt: "waves at dusk".to_string(),
            kind: GenerationKind::Video,
            model: "ray-2".to_string(),
            style: None,
            size: None,
            duration_seconds: Some(30),
        };
        assert_eq!(
            normalize_request(model, &raw),
            Err(RequestValidationError::InvalidDuration { max: 9 })
        );
    }
}
