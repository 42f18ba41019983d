pub mod generation_kinds;
pub mod generation_statuses;
pub mod plan_tiers;
