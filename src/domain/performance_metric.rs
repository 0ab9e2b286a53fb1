//! Append-only performance snapshots.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{MetricId, SubmissionId, UserId};

/// Admin-entered view/like counts for a submission at a point in time.
///
/// Never modified after creation. A submission's history is the list of
/// these ordered by `recorded_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    /// Snapshot identifier.
    pub id: MetricId,
    /// Submission the snapshot belongs to.
    pub submission_id: SubmissionId,
    /// Observed total views.
    pub view_count: u64,
    /// Observed total likes.
    pub like_count: u64,
    /// Earnings derived from `view_count` under the owner's reward rule.
    pub calculated_earnings: Decimal,
    /// Actor who recorded the snapshot.
    pub recorded_by: UserId,
    /// Recording timestamp.
    pub recorded_at: DateTime<Utc>,
}
