use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Lifecycle of a generation job. Transitions are monotonic:
/// pending -> processing -> completed | failed.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl GenerationStatus {
    /// Position in the lifecycle order; both terminal states share a rank.
    pub fn rank(&self) -> u8 {
        match self {
            GenerationStatus::Pending => 0,
            GenerationStatus::Processing => 1,
            GenerationStatus::Completed | GenerationStatus::Failed => 2,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationStatus::Completed | GenerationStatus::Failed
        )
    }
}

impl Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::Processing => "processing",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Failed => "failed",
        };
        write!(f, "{}", status)
    }
}
