//! In-memory storage backend.
//!
//! Each table is a `HashMap` behind its own [`tokio::sync::RwLock`]. Locks
//! are always taken in the order submissions → metrics so that
//! [`Storage::record_snapshot`] can hold both without deadlocking.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Storage, SubmissionFilter, ensure_same_submission};
use crate::domain::{
    Campaign, CampaignId, CampaignStatus, InvitationId, PerformanceMetric, PrivateInvitation,
    Submission, SubmissionId,
};
use crate::error::RewardsError;

/// Process-local storage, lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    campaigns: RwLock<HashMap<CampaignId, Campaign>>,
    invitations: RwLock<HashMap<InvitationId, PrivateInvitation>>,
    submissions: RwLock<HashMap<SubmissionId, Submission>>,
    metrics: RwLock<HashMap<SubmissionId, Vec<PerformanceMetric>>>,
}

impl InMemoryStorage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn already_exists(kind: &str, id: impl std::fmt::Display) -> RewardsError {
    RewardsError::InvalidRequest(format!("{kind} {id} already exists"))
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), RewardsError> {
        let mut map = self.campaigns.write().await;
        if map.contains_key(&campaign.id) {
            return Err(already_exists("campaign", campaign.id));
        }
        map.insert(campaign.id, campaign.clone());
        Ok(())
    }

    async fn get_campaign(&self, id: CampaignId) -> Result<Option<Campaign>, RewardsError> {
        Ok(self.campaigns.read().await.get(&id).cloned())
    }

    async fn update_campaign(&self, campaign: &Campaign) -> Result<(), RewardsError> {
        let mut map = self.campaigns.write().await;
        let slot = map
            .get_mut(&campaign.id)
            .ok_or(RewardsError::CampaignNotFound(*campaign.id.as_uuid()))?;
        *slot = campaign.clone();
        Ok(())
    }

    async fn list_campaigns(
        &self,
        status: Option<CampaignStatus>,
    ) -> Result<Vec<Campaign>, RewardsError> {
        let map = self.campaigns.read().await;
        let mut campaigns: Vec<Campaign> = map
            .values()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(campaigns)
    }

    async fn insert_invitation(&self, invitation: &PrivateInvitation) -> Result<(), RewardsError> {
        let mut map = self.invitations.write().await;
        if map.contains_key(&invitation.id) {
            return Err(already_exists("invitation", invitation.id));
        }
        map.insert(invitation.id, invitation.clone());
        Ok(())
    }

    async fn get_invitation(
        &self,
        id: InvitationId,
    ) -> Result<Option<PrivateInvitation>, RewardsError> {
        Ok(self.invitations.read().await.get(&id).cloned())
    }

    async fn update_invitation(&self, invitation: &PrivateInvitation) -> Result<(), RewardsError> {
        let mut map = self.invitations.write().await;
        let slot = map
            .get_mut(&invitation.id)
            .ok_or(RewardsError::InvitationNotFound(*invitation.id.as_uuid()))?;
        *slot = invitation.clone();
        Ok(())
    }

    async fn insert_submission(&self, submission: &Submission) -> Result<(), RewardsError> {
        let mut map = self.submissions.write().await;
        if map.contains_key(&submission.id) {
            return Err(already_exists("submission", submission.id));
        }
        map.insert(submission.id, submission.clone());
        Ok(())
    }

    async fn get_submission(&self, id: SubmissionId) -> Result<Option<Submission>, RewardsError> {
        Ok(self.submissions.read().await.get(&id).cloned())
    }

    async fn update_submission(&self, submission: &Submission) -> Result<(), RewardsError> {
        let mut map = self.submissions.write().await;
        let slot = map
            .get_mut(&submission.id)
            .ok_or(RewardsError::SubmissionNotFound(*submission.id.as_uuid()))?;
        *slot = submission.clone();
        Ok(())
    }

    async fn list_submissions(
        &self,
        filter: &SubmissionFilter,
    ) -> Result<Vec<Submission>, RewardsError> {
        let map = self.submissions.read().await;
        let mut submissions: Vec<Submission> =
            map.values().filter(|s| filter.matches(s)).cloned().collect();
        submissions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(submissions)
    }

    async fn append_metric(&self, metric: &PerformanceMetric) -> Result<(), RewardsError> {
        let submissions = self.submissions.read().await;
        if !submissions.contains_key(&metric.submission_id) {
            return Err(RewardsError::SubmissionNotFound(
                *metric.submission_id.as_uuid(),
            ));
        }
        self.metrics
            .write()
            .await
            .entry(metric.submission_id)
            .or_default()
            .push(metric.clone());
        Ok(())
    }

    async fn list_metrics(
        &self,
        submission_id: SubmissionId,
    ) -> Result<Vec<PerformanceMetric>, RewardsError> {
        Ok(self
            .metrics
            .read()
            .await
            .get(&submission_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn record_snapshot(
        &self,
        metric: &PerformanceMetric,
        submission: &Submission,
    ) -> Result<(), RewardsError> {
        ensure_same_submission(metric, submission)?;
        let mut submissions = self.submissions.write().await;
        let slot = submissions
            .get_mut(&submission.id)
            .ok_or(RewardsError::SubmissionNotFound(*submission.id.as_uuid()))?;
        let mut metrics = self.metrics.write().await;
        metrics
            .entry(metric.submission_id)
            .or_default()
            .push(metric.clone());
        *slot = submission.clone();
        Ok(())
    }
}
