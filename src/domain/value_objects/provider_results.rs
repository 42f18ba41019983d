use serde_json::Value;

/// What a single adapter attempt produced.
///
/// Transport-level faults are not modeled here; adapters surface them as
/// errors and the chain folds them into the same "try the next adapter"
/// path, logged with more detail.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    /// The provider finished synchronously.
    Completed { url: String, metadata: Option<Value> },
    /// The provider accepted the request; poll `check_status` with the
    /// handle until it reports a terminal outcome.
    Accepted { handle: String },
    /// The provider declined the request; the chain moves on.
    Failed { reason: String },
}

/// Result of re-querying an accepted (deferred) generation.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderPoll {
    Completed { url: String },
    Pending,
    Failed { reason: String },
}
