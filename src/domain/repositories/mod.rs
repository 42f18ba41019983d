pub mod credit_ledger;
pub mod generation_jobs;
pub mod generation_providers;
pub mod sessions;
pub mod users;
