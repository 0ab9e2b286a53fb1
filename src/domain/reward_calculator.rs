//! Earnings formula and the snapshot overwrite rule.
//!
//! Both public campaign submissions and private invitation submissions go
//! through the same two functions:
//!
//! - [`calculate_earnings`]: `(view_count / reward_views) * reward_amount`
//! - [`apply_snapshot`]: builds the immutable [`PerformanceMetric`] and the
//!   submission with its cached fields replaced by the snapshot's values.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::performance_metric::PerformanceMetric;
use super::reward_rule::RewardRule;
use super::submission::Submission;
use super::{MetricId, UserId};
use crate::error::RewardsError;

/// Observed counters for one recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Total views at recording time.
    pub views: u64,
    /// Total likes at recording time.
    pub likes: u64,
}

/// Computes earnings owed for `view_count` views under `rule`.
///
/// Linear with no cap. Multiplication happens before division so results
/// are exact whenever the true value fits in a [`Decimal`].
///
/// # Errors
///
/// Returns [`RewardsError::InvalidRule`] if `rule.reward_views <= 0` or the
/// amount is negative, and [`RewardsError::InvalidRequest`] if the result
/// overflows [`Decimal`].
pub fn calculate_earnings(view_count: u64, rule: &RewardRule) -> Result<Decimal, RewardsError> {
    rule.validate()?;

    let earnings = Decimal::from(view_count)
        .checked_mul(rule.reward_amount)
        .and_then(|scaled| scaled.checked_div(Decimal::from(rule.reward_views)))
        .ok_or_else(|| {
            RewardsError::InvalidRequest(format!(
                "earnings overflow for {view_count} views at {} per {}",
                rule.reward_amount, rule.reward_views
            ))
        })?;

    Ok(earnings.normalize())
}

/// Applies a snapshot to an approved submission.
///
/// Returns the metric to append and a copy of `submission` whose `views`,
/// `likes` and `earnings` equal the snapshot. Previous cached values are
/// discarded. The input is left untouched so a failed write leaves the
/// caller's copy intact.
///
/// # Errors
///
/// Returns [`RewardsError::NotApproved`] if the submission is not approved,
/// or any error from [`calculate_earnings`].
pub fn apply_snapshot(
    submission: &Submission,
    rule: &RewardRule,
    snapshot: Snapshot,
    recorded_by: UserId,
    recorded_at: DateTime<Utc>,
) -> Result<(PerformanceMetric, Submission), RewardsError> {
    submission.ensure_approved()?;
    let earnings = calculate_earnings(snapshot.views, rule)?;

    let metric = PerformanceMetric {
        id: MetricId::new(),
        submission_id: submission.id,
        view_count: snapshot.views,
        like_count: snapshot.likes,
        calculated_earnings: earnings,
        recorded_by,
        recorded_at,
    };

    let mut updated = submission.clone();
    updated.views = snapshot.views;
    updated.likes = snapshot.likes;
    updated.earnings = earnings;
    updated.updated_at = recorded_at;

    Ok((metric, updated))
}
