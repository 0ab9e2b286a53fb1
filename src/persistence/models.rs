//! Database row types and their conversion into domain entities.
//!
//! Counts are `BIGINT` in PostgreSQL and `u64` in the domain; money is
//! `NUMERIC` on both sides via `rust_decimal`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    Campaign, CampaignId, InvitationId, PerformanceMetric, PrivateInvitation, RewardOwner,
    RewardRule, Submission, UserId,
};
use crate::error::RewardsError;

/// A row from the `campaigns` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CampaignRow {
    /// Primary key.
    pub id: Uuid,
    /// Creating restaurant.
    pub restaurant_id: Uuid,
    /// Headline.
    pub title: String,
    /// Brief.
    pub description: String,
    /// Amount per milestone.
    pub reward_amount: Decimal,
    /// Views per milestone.
    pub reward_views: i64,
    /// `active` or `closed`.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = RewardsError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CampaignId::from_uuid(row.id),
            restaurant_id: UserId::from_uuid(row.restaurant_id),
            title: row.title,
            description: row.description,
            reward_rule: RewardRule {
                reward_amount: row.reward_amount,
                reward_views: row.reward_views,
            },
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

/// A row from the `private_invitations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvitationRow {
    /// Primary key.
    pub id: Uuid,
    /// Inviting restaurant.
    pub restaurant_id: Uuid,
    /// Invited influencer.
    pub influencer_id: Uuid,
    /// Headline.
    pub title: String,
    /// Personal note.
    pub message: String,
    /// Amount per milestone.
    pub reward_amount: Decimal,
    /// Views per milestone.
    pub reward_views: i64,
    /// `pending`, `accepted` or `declined`.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<InvitationRow> for PrivateInvitation {
    type Error = RewardsError;

    fn try_from(row: InvitationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: InvitationId::from_uuid(row.id),
            restaurant_id: UserId::from_uuid(row.restaurant_id),
            influencer_id: UserId::from_uuid(row.influencer_id),
            title: row.title,
            message: row.message,
            reward_rule: RewardRule {
                reward_amount: row.reward_amount,
                reward_views: row.reward_views,
            },
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

/// A row from the `submissions` table. Exactly one of `campaign_id` and
/// `invitation_id` is set.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubmissionRow {
    /// Primary key.
    pub id: Uuid,
    /// Owning campaign, for public submissions.
    pub campaign_id: Option<Uuid>,
    /// Owning invitation, for private submissions.
    pub invitation_id: Option<Uuid>,
    /// Submitting influencer.
    pub influencer_id: Uuid,
    /// Content link.
    pub content_url: String,
    /// `pending`, `approved` or `rejected`.
    pub status: String,
    /// Cached views.
    pub views: i64,
    /// Cached likes.
    pub likes: i64,
    /// Cached earnings.
    pub earnings: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = RewardsError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let owner = match (row.campaign_id, row.invitation_id) {
            (Some(id), None) => RewardOwner::Campaign(CampaignId::from_uuid(id)),
            (None, Some(id)) => RewardOwner::Invitation(InvitationId::from_uuid(id)),
            _ => {
                return Err(RewardsError::PersistenceError(format!(
                    "submission {} must reference exactly one campaign or invitation",
                    row.id
                )));
            }
        };
        Ok(Self {
            id: row.id.into(),
            owner,
            influencer_id: UserId::from_uuid(row.influencer_id),
            content_url: row.content_url,
            status: row.status.parse()?,
            views: count_from_db(row.views)?,
            likes: count_from_db(row.likes)?,
            earnings: row.earnings,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row from the `performance_metrics` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MetricRow {
    /// Primary key.
    pub id: Uuid,
    /// Parent submission.
    pub submission_id: Uuid,
    /// Observed views.
    pub view_count: i64,
    /// Observed likes.
    pub like_count: i64,
    /// Earnings at recording time.
    pub calculated_earnings: Decimal,
    /// Recording actor.
    pub recorded_by: Uuid,
    /// Recording timestamp.
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<MetricRow> for PerformanceMetric {
    type Error = RewardsError;

    fn try_from(row: MetricRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            submission_id: row.submission_id.into(),
            view_count: count_from_db(row.view_count)?,
            like_count: count_from_db(row.like_count)?,
            calculated_earnings: row.calculated_earnings,
            recorded_by: UserId::from_uuid(row.recorded_by),
            recorded_at: row.recorded_at,
        })
    }
}

/// Splits an owner into the `(campaign_id, invitation_id)` column pair.
#[must_use]
pub fn owner_columns(owner: RewardOwner) -> (Option<Uuid>, Option<Uuid>) {
    let id = Some(*owner.as_uuid());
    match owner {
        RewardOwner::Campaign(_) => (id, None),
        RewardOwner::Invitation(_) => (None, id),
    }
}

/// Converts a domain count to its `BIGINT` column value.
///
/// # Errors
///
/// Returns [`RewardsError::InvalidRequest`] if the count exceeds `i64::MAX`.
pub fn count_to_db(count: u64) -> Result<i64, RewardsError> {
    i64::try_from(count)
        .map_err(|_| RewardsError::InvalidRequest(format!("count {count} exceeds storage range")))
}

/// Converts a `BIGINT` column value to a domain count.
///
/// # Errors
///
/// Returns [`RewardsError::PersistenceError`] for negative stored values.
pub fn count_from_db(value: i64) -> Result<u64, RewardsError> {
    u64::try_from(value)
        .map_err(|_| RewardsError::PersistenceError(format!("negative count {value} in storage")))
}
