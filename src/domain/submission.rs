//! Influencer content submissions and their review state machine.
//!
//! A [`Submission`] is made against exactly one [`RewardOwner`]. Its
//! `views`, `likes` and `earnings` are a cache of the most recent
//! performance snapshot; they start at zero and are only ever replaced,
//! never incremented.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::reward_rule::RewardOwner;
use super::{SubmissionId, UserId};
use crate::error::RewardsError;

/// Review status: `pending -> approved | rejected`, both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Awaiting restaurant/admin review.
    Pending,
    /// Accepted; performance snapshots may be recorded.
    Approved,
    /// Refused; no further changes.
    Rejected,
}

impl SubmissionStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns `true` if moving from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected)
        )
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = RewardsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(RewardsError::InvalidRequest(format!(
                "unknown submission status: {other}"
            ))),
        }
    }
}

/// One piece of influencer content submitted against a campaign or
/// invitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Submission identifier.
    pub id: SubmissionId,
    /// Campaign or invitation the content was submitted against.
    pub owner: RewardOwner,
    /// Influencer who submitted the content.
    pub influencer_id: UserId,
    /// Link to the published content.
    pub content_url: String,
    /// Review status.
    pub status: SubmissionStatus,
    /// View count from the latest snapshot.
    pub views: u64,
    /// Like count from the latest snapshot.
    pub likes: u64,
    /// Earnings computed from the latest snapshot.
    pub earnings: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last status change or snapshot.
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// Creates a pending submission with zeroed performance fields.
    #[must_use]
    pub fn new(owner: RewardOwner, influencer_id: UserId, content_url: String) -> Self {
        let now = Utc::now();
        Self {
            id: SubmissionId::new(),
            owner,
            influencer_id,
            content_url,
            status: SubmissionStatus::Pending,
            views: 0,
            likes: 0,
            earnings: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the submission to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::InvalidTransition`] unless the submission is
    /// pending and `next` is approved or rejected.
    pub fn transition_to(&mut self, next: SubmissionStatus) -> Result<(), RewardsError> {
        if !self.status.can_transition_to(next) {
            return Err(RewardsError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Ensures performance data may be recorded for this submission.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::NotApproved`] unless the status is approved.
    pub fn ensure_approved(&self) -> Result<(), RewardsError> {
        if self.status == SubmissionStatus::Approved {
            Ok(())
        } else {
            Err(RewardsError::NotApproved {
                submission_id: *self.id.as_uuid(),
                status: self.status,
            })
        }
    }
}
