//! Private one-to-one invitations from a restaurant to an influencer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reward_rule::{RewardOwner, RewardRule, RewardRuleHolder};
use super::{InvitationId, UserId};
use crate::error::RewardsError;

/// Invitation lifecycle: `pending -> accepted | declined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    /// Waiting for the influencer to respond.
    Pending,
    /// Influencer agreed; submissions are allowed.
    Accepted,
    /// Influencer turned the offer down.
    Declined,
}

impl InvitationStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvitationStatus {
    type Err = RewardsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            other => Err(RewardsError::InvalidRequest(format!(
                "unknown invitation status: {other}"
            ))),
        }
    }
}

/// A one-to-one offer carrying its own reward rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateInvitation {
    /// Invitation identifier.
    pub id: InvitationId,
    /// Restaurant that sent the invitation.
    pub restaurant_id: UserId,
    /// The only influencer allowed to respond and submit.
    pub influencer_id: UserId,
    /// Short headline.
    pub title: String,
    /// Personal note from the restaurant.
    pub message: String,
    /// Payout rate for submissions made against this invitation.
    pub reward_rule: RewardRule,
    /// Lifecycle status.
    pub status: InvitationStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl PrivateInvitation {
    /// Creates a new pending invitation.
    #[must_use]
    pub fn new(
        restaurant_id: UserId,
        influencer_id: UserId,
        title: String,
        message: String,
        reward_rule: RewardRule,
    ) -> Self {
        Self {
            id: InvitationId::new(),
            restaurant_id,
            influencer_id,
            title,
            message,
            reward_rule,
            status: InvitationStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Records the invited influencer's answer.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::NotInvited`] if `influencer_id` is not the
    /// addressee, or [`RewardsError::InvalidTransition`] if the invitation
    /// was already answered.
    pub fn respond(&mut self, influencer_id: UserId, accept: bool) -> Result<(), RewardsError> {
        if influencer_id != self.influencer_id {
            return Err(RewardsError::NotInvited {
                invitation_id: *self.id.as_uuid(),
                influencer_id: *influencer_id.as_uuid(),
            });
        }
        let next = if accept {
            InvitationStatus::Accepted
        } else {
            InvitationStatus::Declined
        };
        if self.status != InvitationStatus::Pending {
            return Err(RewardsError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

impl RewardRuleHolder for PrivateInvitation {
    fn owner(&self) -> RewardOwner {
        RewardOwner::Invitation(self.id)
    }

    fn reward_rule(&self) -> RewardRule {
        self.reward_rule
    }
}
