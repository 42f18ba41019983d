pub mod accounts;
pub mod gallery;
pub mod generations;
