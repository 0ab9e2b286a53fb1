//! Public restaurant campaigns.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reward_rule::{RewardOwner, RewardRule, RewardRuleHolder};
use super::{CampaignId, UserId};
use crate::error::RewardsError;

/// Whether a campaign still accepts submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Open to new submissions.
    Active,
    /// No longer accepting submissions. Existing ones keep earning.
    Closed,
}

impl CampaignStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = RewardsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            other => Err(RewardsError::InvalidRequest(format!(
                "unknown campaign status: {other}"
            ))),
        }
    }
}

/// A public offer from a restaurant, visible to all influencers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    /// Campaign identifier.
    pub id: CampaignId,
    /// Restaurant account that created the campaign.
    pub restaurant_id: UserId,
    /// Short headline.
    pub title: String,
    /// Free-form brief for influencers.
    pub description: String,
    /// Payout rate for every submission made against this campaign.
    pub reward_rule: RewardRule,
    /// Lifecycle status.
    pub status: CampaignStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// Creates a new active campaign.
    #[must_use]
    pub fn new(
        restaurant_id: UserId,
        title: String,
        description: String,
        reward_rule: RewardRule,
    ) -> Self {
        Self {
            id: CampaignId::new(),
            restaurant_id,
            title,
            description,
            reward_rule,
            status: CampaignStatus::Active,
            created_at: Utc::now(),
        }
    }
}

impl RewardRuleHolder for Campaign {
    fn owner(&self) -> RewardOwner {
        RewardOwner::Campaign(self.id)
    }

    fn reward_rule(&self) -> RewardRule {
        self.reward_rule
    }
}
