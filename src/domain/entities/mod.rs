pub mod generation_jobs;
pub mod sessions;
pub mod users;
