//! Reward rules and the entities that carry them.
//!
//! A [`RewardRule`] reads as "pay `reward_amount` for every `reward_views`
//! views". Campaigns and private invitations both carry one; the
//! [`RewardOwner`] tag tells a submission which of the two it belongs to.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CampaignId, InvitationId};
use crate::error::RewardsError;

/// Payout rate attached to a campaign or invitation.
///
/// Fields are public because rules are read back from storage verbatim;
/// [`RewardRule::validate`] is re-checked before every calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRule {
    /// Amount paid per milestone, in dollars.
    pub reward_amount: Decimal,
    /// Number of views that make up one milestone. Must be positive.
    pub reward_views: i64,
}

impl RewardRule {
    /// Builds a validated rule.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::InvalidRule`] if `reward_views <= 0` or
    /// `reward_amount` is negative.
    pub fn new(reward_amount: Decimal, reward_views: i64) -> Result<Self, RewardsError> {
        let rule = Self {
            reward_amount,
            reward_views,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Checks the rule invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::InvalidRule`] if `reward_views <= 0` or
    /// `reward_amount` is negative.
    pub fn validate(&self) -> Result<(), RewardsError> {
        if self.reward_views <= 0 {
            return Err(RewardsError::InvalidRule(format!(
                "reward_views must be positive, got {}",
                self.reward_views
            )));
        }
        if self.reward_amount < Decimal::ZERO {
            return Err(RewardsError::InvalidRule(format!(
                "reward_amount must not be negative, got {}",
                self.reward_amount
            )));
        }
        Ok(())
    }
}

/// Which reward-rule holder a submission was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RewardOwner {
    /// A public campaign visible to every influencer.
    Campaign(CampaignId),
    /// A private invitation addressed to a single influencer.
    Invitation(InvitationId),
}

impl RewardOwner {
    /// Returns the owner's UUID regardless of kind.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        match self {
            Self::Campaign(id) => id.as_uuid(),
            Self::Invitation(id) => id.as_uuid(),
        }
    }
}

impl fmt::Display for RewardOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Campaign(id) => write!(f, "campaign {id}"),
            Self::Invitation(id) => write!(f, "invitation {id}"),
        }
    }
}

/// Anything that carries a [`RewardRule`] and can own submissions.
pub trait RewardRuleHolder {
    /// Tag identifying this holder from a submission's point of view.
    fn owner(&self) -> RewardOwner;

    /// The payout rate submissions against this holder earn.
    fn reward_rule(&self) -> RewardRule;
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_views() {
        let result = RewardRule::new(Decimal::from(50), 0);
        assert!(matches!(result, Err(RewardsError::InvalidRule(_))));
    }

    #[test]
    fn rejects_negative_views() {
        let result = RewardRule::new(Decimal::from(50), -10);
        assert!(matches!(result, Err(RewardsError::InvalidRule(_))));
    }

    #[test]
    fn rejects_negative_amount() {
        let result = RewardRule::new(Decimal::from(-1), 1000);
        assert!(matches!(result, Err(RewardsError::InvalidRule(_))));
    }

    #[test]
    fn accepts_zero_amount() {
        assert!(RewardRule::new(Decimal::ZERO, 1000).is_ok());
    }

    #[test]
    fn owner_serializes_tagged() {
        let id = CampaignId::new();
        let Ok(json) = serde_json::to_value(RewardOwner::Campaign(id)) else {
            panic!("serialization failed");
        };
        assert_eq!(json.get("kind").and_then(|v| v.as_str()), Some("campaign"));
        assert_eq!(
            json.get("id").and_then(|v| v.as_str()),
            Some(id.to_string().as_str())
        );
    }

    #[test]
    fn owner_display_names_kind() {
        let id = InvitationId::new();
        assert_eq!(
            RewardOwner::Invitation(id).to_string(),
            format!("invitation {id}")
        );
    }

    #[test]
    fn owner_uuid_ignores_kind() {
        let id = InvitationId::new();
        assert_eq!(RewardOwner::Invitation(id).as_uuid(), id.as_uuid());
    }
}
