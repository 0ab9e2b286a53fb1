//! Persistence layer: the [`Storage`] seam and its backends.
//!
//! The service layer only talks to `Arc<dyn Storage>`. Two backends exist:
//! [`memory::InMemoryStorage`] for tests and local runs, and
//! [`postgres::PostgresStorage`] backed by `sqlx::PgPool`.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;

use crate::config::{RewardsConfig, StorageBackend};
use crate::domain::{
    Campaign, CampaignId, CampaignStatus, InvitationId, PerformanceMetric, PrivateInvitation,
    RewardOwner, Submission, SubmissionId, SubmissionStatus, UserId,
};
use crate::error::RewardsError;

pub use memory::InMemoryStorage;
pub use postgres::PostgresStorage;

/// Optional criteria for [`Storage::list_submissions`]. Unset fields match
/// everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionFilter {
    /// Only submissions made against this campaign or invitation.
    pub owner: Option<RewardOwner>,
    /// Only submissions by this influencer.
    pub influencer_id: Option<UserId>,
    /// Only submissions in this status.
    pub status: Option<SubmissionStatus>,
}

impl SubmissionFilter {
    /// Returns `true` if `submission` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, submission: &Submission) -> bool {
        self.owner.is_none_or(|owner| submission.owner == owner)
            && self
                .influencer_id
                .is_none_or(|id| submission.influencer_id == id)
            && self.status.is_none_or(|status| submission.status == status)
    }
}

/// Storage operations the reward service depends on.
///
/// `get_*` return `Ok(None)` for missing rows so callers can pick the
/// error that fits their context. `update_*` fail with the matching
/// `*NotFound` variant when the row does not exist.
#[async_trait]
pub trait Storage: Send + Sync + fmt::Debug {
    /// Stores a new campaign.
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), RewardsError>;

    /// Loads a campaign by id.
    async fn get_campaign(&self, id: CampaignId) -> Result<Option<Campaign>, RewardsError>;

    /// Replaces a stored campaign.
    async fn update_campaign(&self, campaign: &Campaign) -> Result<(), RewardsError>;

    /// Lists campaigns, newest first, optionally filtered by status.
    async fn list_campaigns(
        &self,
        status: Option<CampaignStatus>,
    ) -> Result<Vec<Campaign>, RewardsError>;

    /// Stores a new private invitation.
    async fn insert_invitation(&self, invitation: &PrivateInvitation) -> Result<(), RewardsError>;

    /// Loads an invitation by id.
    async fn get_invitation(
        &self,
        id: InvitationId,
    ) -> Result<Option<PrivateInvitation>, RewardsError>;

    /// Replaces a stored invitation.
    async fn update_invitation(&self, invitation: &PrivateInvitation) -> Result<(), RewardsError>;

    /// Stores a new submission.
    async fn insert_submission(&self, submission: &Submission) -> Result<(), RewardsError>;

    /// Loads a submission by id.
    async fn get_submission(&self, id: SubmissionId) -> Result<Option<Submission>, RewardsError>;

    /// Replaces a stored submission (single-row overwrite).
    async fn update_submission(&self, submission: &Submission) -> Result<(), RewardsError>;

    /// Lists submissions matching `filter`, oldest first.
    async fn list_submissions(
        &self,
        filter: &SubmissionFilter,
    ) -> Result<Vec<Submission>, RewardsError>;

    /// Appends a performance snapshot to its submission's history.
    async fn append_metric(&self, metric: &PerformanceMetric) -> Result<(), RewardsError>;

    /// Returns a submission's snapshots in the order they were appended.
    async fn list_metrics(
        &self,
        submission_id: SubmissionId,
    ) -> Result<Vec<PerformanceMetric>, RewardsError>;

    /// Appends `metric` and overwrites `submission`.
    ///
    /// The default runs the two writes back to back. Backends that can
    /// make the pair atomic should override it.
    async fn record_snapshot(
        &self,
        metric: &PerformanceMetric,
        submission: &Submission,
    ) -> Result<(), RewardsError> {
        ensure_same_submission(metric, submission)?;
        self.append_metric(metric).await?;
        self.update_submission(submission).await
    }
}

/// Rejects a snapshot whose metric and submission disagree on the id.
pub(crate) fn ensure_same_submission(
    metric: &PerformanceMetric,
    submission: &Submission,
) -> Result<(), RewardsError> {
    if metric.submission_id != submission.id {
        return Err(RewardsError::InvalidRequest(format!(
            "metric {} belongs to submission {}, not {}",
            metric.id, metric.submission_id, submission.id
        )));
    }
    Ok(())
}

/// Builds the storage backend selected by `config`.
///
/// # Errors
///
/// Returns [`RewardsError::PersistenceError`] if the PostgreSQL pool cannot
/// be established.
pub async fn connect(config: &RewardsConfig) -> Result<Arc<dyn Storage>, RewardsError> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::info!("using in-memory storage");
            Ok(Arc::new(InMemoryStorage::new()))
        }
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .min_connections(config.database_min_connections)
                .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
                .connect(&config.database_url)
                .await
                .map_err(|e| RewardsError::PersistenceError(e.to_string()))?;
            tracing::info!(
                max_connections = config.database_max_connections,
                "connected to postgres"
            );
            Ok(Arc::new(PostgresStorage::new(pool)))
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_submission(influencer_id: UserId) -> Submission {
        Submission::new(
            RewardOwner::Campaign(CampaignId::new()),
            influencer_id,
            "https://video.example/1".to_string(),
        )
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(SubmissionFilter::default().matches(&make_submission(UserId::new())));
    }

    #[test]
    fn filter_checks_every_field() {
        let influencer = UserId::new();
        let submission = make_submission(influencer);

        let by_influencer = SubmissionFilter {
            influencer_id: Some(influencer),
            ..SubmissionFilter::default()
        };
        assert!(by_influencer.matches(&submission));

        let wrong_owner = SubmissionFilter {
            owner: Some(RewardOwner::Invitation(InvitationId::new())),
            influencer_id: Some(influencer),
            status: None,
        };
        assert!(!wrong_owner.matches(&submission));

        let wrong_status = SubmissionFilter {
            status: Some(SubmissionStatus::Approved),
            ..SubmissionFilter::default()
        };
        assert!(!wrong_status.matches(&submission));
    }

    #[test]
    fn snapshot_pair_must_share_submission() {
        let submission = make_submission(UserId::new());
        let mut metric = PerformanceMetric {
            id: crate::domain::MetricId::new(),
            submission_id: submission.id,
            view_count: 10,
            like_count: 1,
            calculated_earnings: rust_decimal::Decimal::ZERO,
            recorded_by: UserId::new(),
            recorded_at: chrono::Utc::now(),
        };
        assert!(ensure_same_submission(&metric, &submission).is_ok());

        metric.submission_id = SubmissionId::new();
        assert!(matches!(
            ensure_same_submission(&metric, &submission),
            Err(RewardsError::InvalidRequest(_))
        ));
    }
}
