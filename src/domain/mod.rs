//! Domain layer: identifiers, reward-rule holders, submissions, and the
//! earnings calculator.
//!
//! Everything here is synchronous and storage-agnostic. The service layer
//! loads entities, calls into this module, and writes the results back.

pub mod campaign;
pub mod ids;
pub mod invitation;
pub mod performance_metric;
pub mod reward_calculator;
pub mod reward_rule;
pub mod submission;

pub use campaign::{Campaign, CampaignStatus};
pub use ids::{CampaignId, InvitationId, MetricId, SubmissionId, UserId};
pub use invitation::{InvitationStatus, PrivateInvitation};
pub use performance_metric::PerformanceMetric;
pub use reward_calculator::{Snapshot, apply_snapshot, calculate_earnings};
pub use reward_rule::{RewardOwner, RewardRule, RewardRuleHolder};
pub use submission::{Submission, SubmissionStatus};
