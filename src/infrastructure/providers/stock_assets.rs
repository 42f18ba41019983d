use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::json;

use crate::domain::{
    repositories::generation_providers::ProviderAdapter,
    value_objects::{
        enums::generation_kinds::GenerationKind,
        generation_requests::NormalizedRequest,
        provider_results::{ProviderOutcome, ProviderPoll},
    },
};

const STOCK_IMAGE_ASSETS: &[(&str, &str)] = &[
    ("sunset", "https://assets.prompt-forge.dev/stock/images/sunset-golden-hour.jpg"),
    ("mountain", "https://assets.prompt-forge.dev/stock/images/mountain-ridge.jpg"),
    ("ocean", "https://assets.prompt-forge.dev/stock/images/ocean-swell.jpg"),
    ("forest", "https://assets.prompt-forge.dev/stock/images/forest-canopy.jpg"),
    ("city", "https://assets.prompt-forge.dev/stock/images/city-skyline.jpg"),
    ("portrait", "https://assets.prompt-forge.dev/stock/images/studio-portrait.jpg"),
    ("dog", "https://assets.prompt-forge.dev/stock/images/golden-retriever.jpg"),
    ("cat", "https://assets.prompt-forge.dev/stock/images/tabby-cat.jpg"),
    ("space", "https://assets.prompt-forge.dev/stock/images/nebula-field.jpg"),
    ("flower", "https://assets.prompt-forge.dev/stock/images/wildflower-meadow.jpg"),
];

const STOCK_VIDEO_ASSETS: &[(&str, &str)] = &[
    ("sunset", "https://assets.prompt-forge.dev/stock/videos/sunset-timelapse.mp4"),
    ("ocean", "https://assets.prompt-forge.dev/stock/videos/waves-loop.mp4"),
    ("city", "https://assets.prompt-forge.dev/stock/videos/city-night-drive.mp4"),
    ("rain", "https://assets.prompt-forge.dev/stock/videos/rain-on-window.mp4"),
    ("clouds", "https://assets.prompt-forge.dev/stock/videos/cloud-timelapse.mp4"),
    ("fire", "https://assets.prompt-forge.dev/stock/videos/campfire-loop.mp4"),
];

const DEFAULT_IMAGE_ASSET: &str =
    "https://assets.prompt-forge.dev/stock/images/abstract-gradient.jpg";
const DEFAULT_VIDEO_ASSET: &str =
    "https://assets.prompt-forge.dev/stock/videos/abstract-particles.mp4";

/// Always-available final fallback: maps prompt keywords to pre-selected
/// stock assets, deterministically. Lowest quality, guaranteed to serve.
pub struct StockAssetProvider {
    kind: GenerationKind,
}

impl StockAssetProvider {
    pub fn new(kind: GenerationKind) -> Self {
        Self { kind }
    }

    fn select_asset(&self, prompt: &str) -> (&'static str, Option<&'static str>) {
        let lowered = prompt.to_lowercase();
        let (table, default) = match self.kind {
            GenerationKind::Image => (STOCK_IMAGE_ASSETS, DEFAULT_IMAGE_ASSET),
            GenerationKind::Video => (STOCK_VIDEO_ASSETS, DEFAULT_VIDEO_ASSET),
        };

        // First keyword in table order wins, so selection is stable across runs.
        for (keyword, url) in table {
            if lowered.contains(keyword) {
                return (url, Some(keyword));
            }
        }
        (default, None)
    }
}

#[async_trait]
impl ProviderAdapter for StockAssetProvider {
    fn name(&self) -> &'static str {
        "stock-gallery"
    }

    async fn attempt(&self, request: &NormalizedRequest) -> Result<ProviderOutcome> {
        let (url, keyword) = self.select_asset(&request.prompt);
        Ok(ProviderOutcome::Completed {
            url: url.to_string(),
            metadata: Some(json!({
                "source": "stock-gallery",
                "matched_keyword": keyword,
            })),
        })
    }

    async fn check_status(&self, handle: &str) -> Result<ProviderPoll> {
        bail!(
            "stock-gallery serves synchronously; no deferred handle {} exists",
            handle
        )
    }
}
