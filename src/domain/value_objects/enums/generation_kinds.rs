use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    #[default]
    Image,
    Video,
}

impl Display for GenerationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            GenerationKind::Image => "image",
            GenerationKind::Video => "video",
        };
        write!(f, "{}", kind)
    }
}
