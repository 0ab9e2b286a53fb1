//! PostgreSQL storage backend.
//!
//! Table layout lives in `migrations/0001_reward_schema.sql`.

use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{
    CampaignRow, InvitationRow, MetricRow, SubmissionRow, count_to_db, owner_columns,
};
use super::{Storage, SubmissionFilter, ensure_same_submission};
use crate::domain::{
    Campaign, CampaignId, CampaignStatus, InvitationId, PerformanceMetric, PrivateInvitation,
    Submission, SubmissionId,
};
use crate::error::RewardsError;

const CAMPAIGN_COLUMNS: &str =
    "id, restaurant_id, title, description, reward_amount, reward_views, status, created_at";

const INVITATION_COLUMNS: &str = "id, restaurant_id, influencer_id, title, message, \
     reward_amount, reward_views, status, created_at";

const SUBMISSION_COLUMNS: &str = "id, campaign_id, invitation_id, influencer_id, content_url, \
     status, views, likes, earnings, created_at, updated_at";

const UPDATE_SUBMISSION: &str = "UPDATE submissions SET status = $2, views = $3, likes = $4, \
     earnings = $5, updated_at = $6 WHERE id = $1";

const INSERT_METRIC: &str = "INSERT INTO performance_metrics \
     (id, submission_id, view_count, like_count, calculated_earnings, recorded_by, recorded_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7)";

/// Timestamps only carry microseconds, so history order follows the
/// insert sequence instead.
const LIST_METRICS: &str = "SELECT id, submission_id, view_count, like_count, \
     calculated_earnings, recorded_by, recorded_at FROM performance_metrics \
     WHERE submission_id = $1 ORDER BY seq ASC";

fn db_err(e: sqlx::Error) -> RewardsError {
    RewardsError::PersistenceError(e.to_string())
}

/// PostgreSQL-backed storage using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Creates a storage handle over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), RewardsError> {
        sqlx::query(
            "INSERT INTO campaigns (id, restaurant_id, title, description, reward_amount, \
             reward_views, status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(campaign.id.as_uuid())
        .bind(campaign.restaurant_id.as_uuid())
        .bind(&campaign.title)
        .bind(&campaign.description)
        .bind(campaign.reward_rule.reward_amount)
        .bind(campaign.reward_rule.reward_views)
        .bind(campaign.status.as_str())
        .bind(campaign.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_campaign(&self, id: CampaignId) -> Result<Option<Campaign>, RewardsError> {
        let row = sqlx::query_as::<_, CampaignRow>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(Campaign::try_from).transpose()
    }

    async fn update_campaign(&self, campaign: &Campaign) -> Result<(), RewardsError> {
        let result = sqlx::query(
            "UPDATE campaigns SET title = $2, description = $3, reward_amount = $4, \
             reward_views = $5, status = $6 WHERE id = $1",
        )
        .bind(campaign.id.as_uuid())
        .bind(&campaign.title)
        .bind(&campaign.description)
        .bind(campaign.reward_rule.reward_amount)
        .bind(campaign.reward_rule.reward_views)
        .bind(campaign.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(RewardsError::CampaignNotFound(*campaign.id.as_uuid()));
        }
        Ok(())
    }

    async fn list_campaigns(
        &self,
        status: Option<CampaignStatus>,
    ) -> Result<Vec<Campaign>, RewardsError> {
        let rows = sqlx::query_as::<_, CampaignRow>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns \
             WHERE ($1::text IS NULL OR status = $1) ORDER BY created_at DESC"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(Campaign::try_from).collect()
    }

    async fn insert_invitation(&self, invitation: &PrivateInvitation) -> Result<(), RewardsError> {
        sqlx::query(
            "INSERT INTO private_invitations (id, restaurant_id, influencer_id, title, message, \
             reward_amount, reward_views, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(invitation.id.as_uuid())
        .bind(invitation.restaurant_id.as_uuid())
        .bind(invitation.influencer_id.as_uuid())
        .bind(&invitation.title)
        .bind(&invitation.message)
        .bind(invitation.reward_rule.reward_amount)
        .bind(invitation.reward_rule.reward_views)
        .bind(invitation.status.as_str())
        .bind(invitation.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_invitation(
        &self,
        id: InvitationId,
    ) -> Result<Option<PrivateInvitation>, RewardsError> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM private_invitations WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(PrivateInvitation::try_from).transpose()
    }

    async fn update_invitation(&self, invitation: &PrivateInvitation) -> Result<(), RewardsError> {
        let result = sqlx::query(
            "UPDATE private_invitations SET title = $2, message = $3, reward_amount = $4, \
             reward_views = $5, status = $6 WHERE id = $1",
        )
        .bind(invitation.id.as_uuid())
        .bind(&invitation.title)
        .bind(&invitation.message)
        .bind(invitation.reward_rule.reward_amount)
        .bind(invitation.reward_rule.reward_views)
        .bind(invitation.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(RewardsError::InvitationNotFound(*invitation.id.as_uuid()));
        }
        Ok(())
    }

    async fn insert_submission(&self, submission: &Submission) -> Result<(), RewardsError> {
        let (campaign_id, invitation_id) = owner_columns(submission.owner);
        sqlx::query(&format!(
            "INSERT INTO submissions ({SUBMISSION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(submission.id.as_uuid())
        .bind(campaign_id)
        .bind(invitation_id)
        .bind(submission.influencer_id.as_uuid())
        .bind(&submission.content_url)
        .bind(submission.status.as_str())
        .bind(count_to_db(submission.views)?)
        .bind(count_to_db(submission.likes)?)
        .bind(submission.earnings)
        .bind(submission.created_at)
        .bind(submission.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_submission(&self, id: SubmissionId) -> Result<Option<Submission>, RewardsError> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(Submission::try_from).transpose()
    }

    async fn update_submission(&self, submission: &Submission) -> Result<(), RewardsError> {
        let result = sqlx::query(UPDATE_SUBMISSION)
            .bind(submission.id.as_uuid())
            .bind(submission.status.as_str())
            .bind(count_to_db(submission.views)?)
            .bind(count_to_db(submission.likes)?)
            .bind(submission.earnings)
            .bind(submission.updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(RewardsError::SubmissionNotFound(*submission.id.as_uuid()));
        }
        Ok(())
    }

    async fn list_submissions(
        &self,
        filter: &SubmissionFilter,
    ) -> Result<Vec<Submission>, RewardsError> {
        let (campaign_id, invitation_id) = filter.owner.map_or((None, None), owner_columns);
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions \
             WHERE ($1::uuid IS NULL OR campaign_id = $1) \
             AND ($2::uuid IS NULL OR invitation_id = $2) \
             AND ($3::uuid IS NULL OR influencer_id = $3) \
             AND ($4::text IS NULL OR status = $4) \
             ORDER BY created_at ASC"
        ))
        .bind(campaign_id)
        .bind(invitation_id)
        .bind(filter.influencer_id.map(uuid::Uuid::from))
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(Submission::try_from).collect()
    }

    async fn append_metric(&self, metric: &PerformanceMetric) -> Result<(), RewardsError> {
        sqlx::query(INSERT_METRIC)
            .bind(metric.id.as_uuid())
            .bind(metric.submission_id.as_uuid())
            .bind(count_to_db(metric.view_count)?)
            .bind(count_to_db(metric.like_count)?)
            .bind(metric.calculated_earnings)
            .bind(metric.recorded_by.as_uuid())
            .bind(metric.recorded_at)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn list_metrics(
        &self,
        submission_id: SubmissionId,
    ) -> Result<Vec<PerformanceMetric>, RewardsError> {
        let rows = sqlx::query_as::<_, MetricRow>(LIST_METRICS)
            .bind(submission_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(PerformanceMetric::try_from).collect()
    }

    /// Appends the metric and overwrites the submission in one transaction.
    async fn record_snapshot(
        &self,
        metric: &PerformanceMetric,
        submission: &Submission,
    ) -> Result<(), RewardsError> {
        ensure_same_submission(metric, submission)?;
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(INSERT_METRIC)
            .bind(metric.id.as_uuid())
            .bind(metric.submission_id.as_uuid())
            .bind(count_to_db(metric.view_count)?)
            .bind(count_to_db(metric.like_count)?)
            .bind(metric.calculated_earnings)
            .bind(metric.recorded_by.as_uuid())
            .bind(metric.recorded_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let result = sqlx::query(UPDATE_SUBMISSION)
            .bind(submission.id.as_uuid())
            .bind(submission.status.as_str())
            .bind(count_to_db(submission.views)?)
            .bind(count_to_db(submission.likes)?)
            .bind(submission.earnings)
            .bind(submission.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            // Dropping `tx` rolls back the metric insert.
            return Err(RewardsError::SubmissionNotFound(*submission.id.as_uuid()));
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = include_str!("../../migrations/0001_reward_schema.sql");

    #[test]
    fn metric_history_follows_insert_sequence() {
        assert!(LIST_METRICS.ends_with("ORDER BY seq ASC"));
        assert!(!LIST_METRICS.contains("recorded_at ASC"));
        assert!(SCHEMA.contains("seq                 BIGSERIAL"));
        // The insert leaves `seq` to its default.
        assert!(!INSERT_METRIC.contains("seq"));
    }
}
