//! Reward service: campaign/invitation lifecycle, submissions, and
//! performance recording.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{
    Campaign, CampaignId, CampaignStatus, InvitationId, InvitationStatus, PerformanceMetric,
    PrivateInvitation, RewardOwner, RewardRule, RewardRuleHolder, Snapshot, Submission,
    SubmissionId, SubmissionStatus, UserId, apply_snapshot, calculate_earnings,
};
use crate::error::RewardsError;
use crate::persistence::{Storage, SubmissionFilter};

/// Outcome of a submission review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Approve the content; it starts accruing earnings.
    Approve,
    /// Reject the content.
    Reject,
}

impl From<ReviewDecision> for SubmissionStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approve => Self::Approved,
            ReviewDecision::Reject => Self::Rejected,
        }
    }
}

/// Aggregate performance of one influencer across all submissions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsSummary {
    /// Influencer the totals belong to.
    pub influencer_id: UserId,
    /// Number of submissions in any status.
    pub submission_count: usize,
    /// Number of approved submissions.
    pub approved_count: usize,
    /// Sum of cached views.
    pub total_views: u64,
    /// Sum of cached likes.
    pub total_likes: u64,
    /// Sum of cached earnings.
    pub total_earnings: Decimal,
}

/// Orchestration layer for all marketplace operations.
///
/// Stateless coordinator over a [`Storage`] backend. Mutations follow the
/// pattern: load → validate in the domain layer → write → log.
#[derive(Debug, Clone)]
pub struct RewardService {
    storage: Arc<dyn Storage>,
}

impl RewardService {
    /// Creates a new `RewardService`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Returns a reference to the underlying storage.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    // ── Campaigns ───────────────────────────────────────────────────────

    /// Publishes a new campaign.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::InvalidRule`] for an invalid rule,
    /// [`RewardsError::InvalidRequest`] for an empty title, or a storage
    /// error.
    pub async fn create_campaign(
        &self,
        restaurant_id: UserId,
        title: &str,
        description: &str,
        reward_rule: RewardRule,
    ) -> Result<Campaign, RewardsError> {
        reward_rule.validate()?;
        let title = require_text("title", title)?;

        let campaign = Campaign::new(
            restaurant_id,
            title,
            description.trim().to_string(),
            reward_rule,
        );
        self.storage.insert_campaign(&campaign).await?;

        tracing::info!(
            campaign_id = %campaign.id,
            %restaurant_id,
            reward_amount = %reward_rule.reward_amount,
            reward_views = reward_rule.reward_views,
            "campaign created"
        );
        Ok(campaign)
    }

    /// Loads a campaign.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::CampaignNotFound`] if it does not exist.
    pub async fn get_campaign(&self, id: CampaignId) -> Result<Campaign, RewardsError> {
        self.storage
            .get_campaign(id)
            .await?
            .ok_or(RewardsError::CampaignNotFound(*id.as_uuid()))
    }

    /// Stops a campaign from accepting new submissions.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::CampaignNotFound`],
    /// [`RewardsError::InvalidTransition`] if already closed, or a storage
    /// error.
    pub async fn close_campaign(&self, id: CampaignId) -> Result<Campaign, RewardsError> {
        let mut campaign = self.get_campaign(id).await?;
        if campaign.status == CampaignStatus::Closed {
            return Err(RewardsError::InvalidTransition {
                from: campaign.status.to_string(),
                to: CampaignStatus::Closed.to_string(),
            });
        }
        campaign.status = CampaignStatus::Closed;
        self.storage.update_campaign(&campaign).await?;

        tracing::info!(campaign_id = %id, "campaign closed");
        Ok(campaign)
    }

    /// Lists campaigns, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn list_campaigns(
        &self,
        status: Option<CampaignStatus>,
    ) -> Result<Vec<Campaign>, RewardsError> {
        self.storage.list_campaigns(status).await
    }

    // ── Private invitations ─────────────────────────────────────────────

    /// Sends a private invitation to one influencer.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::InvalidRule`] for an invalid rule,
    /// [`RewardsError::InvalidRequest`] for an empty title or a
    /// self-invitation, or a storage error.
    pub async fn create_invitation(
        &self,
        restaurant_id: UserId,
        influencer_id: UserId,
        title: &str,
        message: &str,
        reward_rule: RewardRule,
    ) -> Result<PrivateInvitation, RewardsError> {
        reward_rule.validate()?;
        let title = require_text("title", title)?;
        if restaurant_id == influencer_id {
            return Err(RewardsError::InvalidRequest(
                "a restaurant cannot invite itself".to_string(),
            ));
        }

        let invitation = PrivateInvitation::new(
            restaurant_id,
            influencer_id,
            title,
            message.trim().to_string(),
            reward_rule,
        );
        self.storage.insert_invitation(&invitation).await?;

        tracing::info!(
            invitation_id = %invitation.id,
            %restaurant_id,
            %influencer_id,
            "invitation sent"
        );
        Ok(invitation)
    }

    /// Loads an invitation.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::InvitationNotFound`] if it does not exist.
    pub async fn get_invitation(&self, id: InvitationId) -> Result<PrivateInvitation, RewardsError> {
        self.storage
            .get_invitation(id)
            .await?
            .ok_or(RewardsError::InvitationNotFound(*id.as_uuid()))
    }

    /// Accepts or declines an invitation on behalf of its addressee.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::InvitationNotFound`],
    /// [`RewardsError::NotInvited`], [`RewardsError::InvalidTransition`],
    /// or a storage error.
    pub async fn respond_to_invitation(
        &self,
        id: InvitationId,
        influencer_id: UserId,
        accept: bool,
    ) -> Result<PrivateInvitation, RewardsError> {
        let mut invitation = self.get_invitation(id).await?;
        if let Err(err) = invitation.respond(influencer_id, accept) {
            tracing::warn!(invitation_id = %id, %influencer_id, error = %err, "invitation response refused");
            return Err(err);
        }
        self.storage.update_invitation(&invitation).await?;

        tracing::info!(invitation_id = %id, status = %invitation.status, "invitation answered");
        Ok(invitation)
    }

    // ── Submissions ─────────────────────────────────────────────────────

    /// Submits content against a campaign or invitation.
    ///
    /// Campaigns must be active. Invitations must be accepted and addressed
    /// to `influencer_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::InvalidRequest`] for a malformed URL or a
    /// closed campaign, the owner's `*NotFound` variant,
    /// [`RewardsError::NotInvited`], [`RewardsError::InvalidTransition`] for
    /// an unaccepted invitation, or a storage error.
    pub async fn submit_content(
        &self,
        owner: RewardOwner,
        influencer_id: UserId,
        content_url: &str,
    ) -> Result<Submission, RewardsError> {
        let content_url = validate_content_url(content_url)?;

        match owner {
            RewardOwner::Campaign(id) => {
                let campaign = self.get_campaign(id).await?;
                if campaign.status != CampaignStatus::Active {
                    return Err(RewardsError::InvalidRequest(format!(
                        "campaign {id} is {}",
                        campaign.status
                    )));
                }
            }
            RewardOwner::Invitation(id) => {
                let invitation = self.get_invitation(id).await?;
                if invitation.influencer_id != influencer_id {
                    return Err(RewardsError::NotInvited {
                        invitation_id: *id.as_uuid(),
                        influencer_id: *influencer_id.as_uuid(),
                    });
                }
                if invitation.status != InvitationStatus::Accepted {
                    return Err(RewardsError::InvalidTransition {
                        from: invitation.status.to_string(),
                        to: "submitted".to_string(),
                    });
                }
            }
        }

        let submission = Submission::new(owner, influencer_id, content_url);
        self.storage.insert_submission(&submission).await?;

        tracing::info!(submission_id = %submission.id, %owner, %influencer_id, "content submitted");
        Ok(submission)
    }

    /// Loads a submission.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::SubmissionNotFound`] if it does not exist.
    pub async fn get_submission(&self, id: SubmissionId) -> Result<Submission, RewardsError> {
        self.storage
            .get_submission(id)
            .await?
            .ok_or(RewardsError::SubmissionNotFound(*id.as_uuid()))
    }

    /// Lists submissions matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn list_submissions(
        &self,
        filter: &SubmissionFilter,
    ) -> Result<Vec<Submission>, RewardsError> {
        self.storage.list_submissions(filter).await
    }

    /// Approves or rejects a pending submission.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::SubmissionNotFound`],
    /// [`RewardsError::InvalidTransition`] if already reviewed, or a
    /// storage error.
    pub async fn review_submission(
        &self,
        id: SubmissionId,
        decision: ReviewDecision,
    ) -> Result<Submission, RewardsError> {
        let mut submission = self.get_submission(id).await?;
        submission.transition_to(decision.into())?;
        self.storage.update_submission(&submission).await?;

        tracing::info!(submission_id = %id, status = %submission.status, "submission reviewed");
        Ok(submission)
    }

    // ── Rewards ─────────────────────────────────────────────────────────

    /// Resolves the reward rule governing submissions against `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::MissingRewardRule`] if the campaign or
    /// invitation no longer exists, or a storage error.
    pub async fn resolve_reward_rule(&self, owner: RewardOwner) -> Result<RewardRule, RewardsError> {
        let rule = match owner {
            RewardOwner::Campaign(id) => self
                .storage
                .get_campaign(id)
                .await?
                .map(|c| c.reward_rule()),
            RewardOwner::Invitation(id) => self
                .storage
                .get_invitation(id)
                .await?
                .map(|i| i.reward_rule()),
        };
        rule.ok_or(RewardsError::MissingRewardRule(owner))
    }

    /// Projects earnings for `views` under `owner`'s current rule.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::MissingRewardRule`] or any
    /// [`calculate_earnings`] error.
    pub async fn preview_earnings(
        &self,
        owner: RewardOwner,
        views: u64,
    ) -> Result<Decimal, RewardsError> {
        let rule = self.resolve_reward_rule(owner).await?;
        calculate_earnings(views, &rule)
    }

    /// Records a performance snapshot for an approved submission.
    ///
    /// Appends a [`PerformanceMetric`] and replaces the submission's cached
    /// `views`, `likes` and `earnings` with the snapshot's values. On any
    /// precondition failure nothing is written. Two concurrent recordings
    /// for the same submission resolve as last-write-wins.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::SubmissionNotFound`],
    /// [`RewardsError::NotApproved`], [`RewardsError::MissingRewardRule`],
    /// [`RewardsError::InvalidRule`], or a storage error.
    pub async fn record_performance_snapshot(
        &self,
        submission_id: SubmissionId,
        views: u64,
        likes: u64,
        recorded_by: UserId,
    ) -> Result<(PerformanceMetric, Submission), RewardsError> {
        let submission = self.get_submission(submission_id).await?;
        if let Err(err) = submission.ensure_approved() {
            tracing::warn!(%submission_id, status = %submission.status, "snapshot on unapproved submission");
            return Err(err);
        }

        let rule = self.resolve_reward_rule(submission.owner).await?;
        let (metric, updated) = apply_snapshot(
            &submission,
            &rule,
            Snapshot { views, likes },
            recorded_by,
            Utc::now(),
        )?;
        self.storage.record_snapshot(&metric, &updated).await?;

        tracing::info!(
            %submission_id,
            metric_id = %metric.id,
            views,
            likes,
            earnings = %metric.calculated_earnings,
            previous_earnings = %submission.earnings,
            %recorded_by,
            "performance recorded"
        );
        Ok((metric, updated))
    }

    /// Returns a submission's snapshot history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::SubmissionNotFound`] or a storage error.
    pub async fn metric_history(
        &self,
        submission_id: SubmissionId,
    ) -> Result<Vec<PerformanceMetric>, RewardsError> {
        self.get_submission(submission_id).await?;
        self.storage.list_metrics(submission_id).await
    }

    /// Totals an influencer's cached performance across submissions.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn influencer_earnings(
        &self,
        influencer_id: UserId,
    ) -> Result<EarningsSummary, RewardsError> {
        let filter = SubmissionFilter {
            influencer_id: Some(influencer_id),
            ..SubmissionFilter::default()
        };
        let submissions = self.storage.list_submissions(&filter).await?;

        let mut summary = EarningsSummary {
            influencer_id,
            submission_count: submissions.len(),
            approved_count: 0,
            total_views: 0,
            total_likes: 0,
            total_earnings: Decimal::ZERO,
        };
        for s in &submissions {
            if s.status == SubmissionStatus::Approved {
                summary.approved_count += 1;
            }
            summary.total_views = summary.total_views.saturating_add(s.views);
            summary.total_likes = summary.total_likes.saturating_add(s.likes);
            summary.total_earnings = summary
                .total_earnings
                .checked_add(s.earnings)
                .ok_or_else(|| {
                    RewardsError::InvalidRequest(format!(
                        "earnings total overflow for influencer {influencer_id}"
                    ))
                })?;
        }
        Ok(summary)
    }
}

fn require_text(field: &str, value: &str) -> Result<String, RewardsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RewardsError::InvalidRequest(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn validate_content_url(url: &str) -> Result<String, RewardsError> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host_and_path) if !host_and_path.is_empty() && !url.contains(char::is_whitespace) => {
            Ok(url.to_string())
        }
        _ => Err(RewardsError::InvalidRequest(format!(
            "content_url must be an http(s) link: {url}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryStorage;

    fn make_service() -> RewardService {
        RewardService::new(Arc::new(InMemoryStorage::new()))
    }

    fn rule(amount: i64, views: i64) -> RewardRule {
        let Ok(rule) = RewardRule::new(Decimal::from(amount), views) else {
            panic!("valid rule");
        };
        rule
    }

    async fn approved_submission(service: &RewardService) -> Submission {
        let Ok(campaign) = service
            .create_campaign(UserId::new(), "Ramen week", "", rule(50, 10_000))
            .await
        else {
            panic!("campaign creation failed");
        };
        let Ok(submission) = service
            .submit_content(
                RewardOwner::Campaign(campaign.id),
                UserId::new(),
                "https://video.example/ramen",
            )
            .await
        else {
            panic!("submission failed");
        };
        let Ok(approved) = service
            .review_submission(submission.id, ReviewDecision::Approve)
            .await
        else {
            panic!("approval failed");
        };
        approved
    }

    #[test]
    fn content_url_must_be_http() {
        assert!(validate_content_url("https://tiktok.example/v/1").is_ok());
        assert!(validate_content_url("  http://x.example  ").is_ok());
        assert!(validate_content_url("ftp://x.example").is_err());
        assert!(validate_content_url("https://").is_err());
        assert!(validate_content_url("https://a b").is_err());
    }

    #[tokio::test]
    async fn create_campaign_rejects_blank_title() {
        let service = make_service();
        let result = service
            .create_campaign(UserId::new(), "   ", "desc", rule(1, 1))
            .await;
        assert!(matches!(result, Err(RewardsError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn create_campaign_rejects_zero_reward_views() {
        let service = make_service();
        let bad = RewardRule {
            reward_amount: Decimal::from(50),
            reward_views: 0,
        };
        let result = service.create_campaign(UserId::new(), "Pho", "", bad).await;
        assert!(matches!(result, Err(RewardsError::InvalidRule(_))));
    }

    #[tokio::test]
    async fn closed_campaign_refuses_submissions() {
        let service = make_service();
        let Ok(campaign) = service
            .create_campaign(UserId::new(), "Dumplings", "", rule(5, 100))
            .await
        else {
            panic!("campaign creation failed");
        };
        assert!(service.close_campaign(campaign.id).await.is_ok());
        assert!(service.close_campaign(campaign.id).await.is_err());

        let result = service
            .submit_content(
                RewardOwner::Campaign(campaign.id),
                UserId::new(),
                "https://video.example/d",
            )
            .await;
        assert!(matches!(result, Err(RewardsError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn record_snapshot_overwrites_and_appends() {
        let service = make_service();
        let submission = approved_submission(&service).await;
        let admin = UserId::new();

        assert!(
            service
                .record_performance_snapshot(submission.id, 100, 10, admin)
                .await
                .is_ok()
        );
        let Ok((metric, updated)) = service
            .record_performance_snapshot(submission.id, 500, 50, admin)
            .await
        else {
            panic!("second snapshot failed");
        };

        assert_eq!(updated.views, 500);
        assert_eq!(updated.likes, 50);
        assert_eq!(updated.earnings, Decimal::new(25, 1));
        assert_eq!(metric.recorded_by, admin);

        let Ok(stored) = service.get_submission(submission.id).await else {
            panic!("submission missing");
        };
        assert_eq!(stored, updated);

        let Ok(history) = service.metric_history(submission.id).await else {
            panic!("history failed");
        };
        let views: Vec<u64> = history.iter().map(|m| m.view_count).collect();
        assert_eq!(views, vec![100, 500]);
    }

    #[tokio::test]
    async fn pending_submission_rejects_snapshot_without_side_effects() {
        let service = make_service();
        let Ok(campaign) = service
            .create_campaign(UserId::new(), "Gelato", "", rule(50, 10_000))
            .await
        else {
            panic!("campaign creation failed");
        };
        let Ok(submission) = service
            .submit_content(
                RewardOwner::Campaign(campaign.id),
                UserId::new(),
                "https://video.example/gelato",
            )
            .await
        else {
            panic!("submission failed");
        };

        let result = service
            .record_performance_snapshot(submission.id, 100, 10, UserId::new())
            .await;
        assert!(matches!(result, Err(RewardsError::NotApproved { .. })));

        let Ok(stored) = service.get_submission(submission.id).await else {
            panic!("submission missing");
        };
        assert_eq!(stored, submission);
        let Ok(history) = service.metric_history(submission.id).await else {
            panic!("history failed");
        };
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn missing_submission_is_not_found() {
        let service = make_service();
        let result = service
            .record_performance_snapshot(SubmissionId::new(), 1, 1, UserId::new())
            .await;
        assert!(matches!(result, Err(RewardsError::SubmissionNotFound(_))));
    }

    #[tokio::test]
    async fn orphaned_submission_reports_missing_rule() {
        let service = make_service();
        let mut orphan = Submission::new(
            RewardOwner::Campaign(CampaignId::new()),
            UserId::new(),
            "https://video.example/orphan".to_string(),
        );
        orphan.status = SubmissionStatus::Approved;
        assert!(service.storage().insert_submission(&orphan).await.is_ok());

        let result = service
            .record_performance_snapshot(orphan.id, 10, 1, UserId::new())
            .await;
        assert!(matches!(result, Err(RewardsError::MissingRewardRule(_))));

        let Ok(history) = service.metric_history(orphan.id).await else {
            panic!("history failed");
        };
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn preview_uses_owner_rule() {
        let service = make_service();
        let Ok(campaign) = service
            .create_campaign(UserId::new(), "Burgers", "", rule(50, 10_000))
            .await
        else {
            panic!("campaign creation failed");
        };
        let preview = service
            .preview_earnings(RewardOwner::Campaign(campaign.id), 12_500)
            .await;
        assert_eq!(preview.ok(), Some(Decimal::new(625, 1)));

        let missing = service
            .preview_earnings(RewardOwner::Invitation(InvitationId::new()), 1)
            .await;
        assert!(matches!(missing, Err(RewardsError::MissingRewardRule(_))));
    }
}
