//! Service layer: business logic orchestration.
//!
//! [`RewardService`] coordinates storage access and delegates all reward
//! arithmetic and state transitions to [`crate::domain`].

pub mod reward_service;

pub use reward_service::{EarningsSummary, ReviewDecision, RewardService};
