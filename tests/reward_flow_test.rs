//! End-to-end reward flows over in-memory storage.

#![allow(clippy::panic)]

use std::sync::Arc;

use rust_decimal::Decimal;

use campaign_rewards::domain::{InvitationStatus, RewardOwner, RewardRule, SubmissionStatus, UserId};
use campaign_rewards::error::RewardsError;
use campaign_rewards::persistence::{InMemoryStorage, SubmissionFilter};
use campaign_rewards::service::{ReviewDecision, RewardService};

fn make_service() -> RewardService {
    RewardService::new(Arc::new(InMemoryStorage::new()))
}

fn rule(amount: i64, views: i64) -> RewardRule {
    let Ok(rule) = RewardRule::new(Decimal::from(amount), views) else {
        panic!("valid rule");
    };
    rule
}

#[tokio::test]
async fn public_campaign_flow() {
    let service = make_service();
    let restaurant = UserId::new();
    let influencer = UserId::new();
    let admin = UserId::new();

    let Ok(campaign) = service
        .create_campaign(restaurant, "Taco Tuesday", "Film the al pastor", rule(50, 10_000))
        .await
    else {
        panic!("campaign creation failed");
    };

    let Ok(submission) = service
        .submit_content(
            RewardOwner::Campaign(campaign.id),
            influencer,
            "https://video.example/tacos",
        )
        .await
    else {
        panic!("submission failed");
    };
    assert_eq!(submission.status, SubmissionStatus::Pending);

    let Ok(_) = service
        .review_submission(submission.id, ReviewDecision::Approve)
        .await
    else {
        panic!("approval failed");
    };

    let Ok((metric, updated)) = service
        .record_performance_snapshot(submission.id, 12_500, 900, admin)
        .await
    else {
        panic!("snapshot failed");
    };
    assert_eq!(metric.calculated_earnings, Decimal::new(625, 1));
    assert_eq!(updated.earnings, Decimal::new(625, 1));
    assert_eq!(updated.likes, 900);
}

#[tokio::test]
async fn private_invitation_flow_uses_invitation_rule() {
    let service = make_service();
    let restaurant = UserId::new();
    let influencer = UserId::new();

    let Ok(invitation) = service
        .create_invitation(
            restaurant,
            influencer,
            "Chef's tasting",
            "Come try the new menu",
            rule(20, 1_000),
        )
        .await
    else {
        panic!("invitation failed");
    };
    let owner = RewardOwner::Invitation(invitation.id);

    // Not accepted yet.
    let early = service
        .submit_content(owner, influencer, "https://video.example/tasting")
        .await;
    assert!(matches!(early, Err(RewardsError::InvalidTransition { .. })));

    // Someone else cannot accept on the influencer's behalf.
    let hijack = service
        .respond_to_invitation(invitation.id, UserId::new(), true)
        .await;
    assert!(matches!(hijack, Err(RewardsError::NotInvited { .. })));

    let Ok(accepted) = service
        .respond_to_invitation(invitation.id, influencer, true)
        .await
    else {
        panic!("accept failed");
    };
    assert_eq!(accepted.status, InvitationStatus::Accepted);

    let stranger = service
        .submit_content(owner, UserId::new(), "https://video.example/other")
        .await;
    assert!(matches!(stranger, Err(RewardsError::NotInvited { .. })));

    let Ok(submission) = service
        .submit_content(owner, influencer, "https://video.example/tasting")
        .await
    else {
        panic!("submission failed");
    };
    let Ok(_) = service
        .review_submission(submission.id, ReviewDecision::Approve)
        .await
    else {
        panic!("approval failed");
    };

    let Ok((_, updated)) = service
        .record_performance_snapshot(submission.id, 2_500, 40, UserId::new())
        .await
    else {
        panic!("snapshot failed");
    };
    assert_eq!(updated.earnings, Decimal::from(50));
}

#[tokio::test]
async fn successive_snapshots_replace_rather_than_sum() {
    let service = make_service();
    let Ok(campaign) = service
        .create_campaign(UserId::new(), "Noodles", "", rule(50, 10_000))
        .await
    else {
        panic!("campaign creation failed");
    };
    let Ok(submission) = service
        .submit_content(
            RewardOwner::Campaign(campaign.id),
            UserId::new(),
            "https://video.example/noodles",
        )
        .await
    else {
        panic!("submission failed");
    };
    let Ok(_) = service
        .review_submission(submission.id, ReviewDecision::Approve)
        .await
    else {
        panic!("approval failed");
    };

    let admin = UserId::new();
    for (views, likes) in [(100, 10), (500, 50)] {
        let Ok(_) = service
            .record_performance_snapshot(submission.id, views, likes, admin)
            .await
        else {
            panic!("snapshot failed");
        };
    }

    let Ok(stored) = service.get_submission(submission.id).await else {
        panic!("submission missing");
    };
    assert_eq!(stored.views, 500);
    assert_eq!(stored.likes, 50);
    assert_eq!(stored.earnings, Decimal::new(25, 1));

    let Ok(history) = service.metric_history(submission.id).await else {
        panic!("history failed");
    };
    let counts: Vec<(u64, u64)> = history
        .iter()
        .map(|m| (m.view_count, m.like_count))
        .collect();
    assert_eq!(counts, vec![(100, 10), (500, 50)]);
}

#[tokio::test]
async fn rejected_submission_never_earns() {
    let service = make_service();
    let Ok(campaign) = service
        .create_campaign(UserId::new(), "Sushi", "", rule(10, 100))
        .await
    else {
        panic!("campaign creation failed");
    };
    let Ok(submission) = service
        .submit_content(
            RewardOwner::Campaign(campaign.id),
            UserId::new(),
            "https://video.example/sushi",
        )
        .await
    else {
        panic!("submission failed");
    };
    let Ok(_) = service
        .review_submission(submission.id, ReviewDecision::Reject)
        .await
    else {
        panic!("reject failed");
    };

    let again = service
        .review_submission(submission.id, ReviewDecision::Approve)
        .await;
    assert!(matches!(again, Err(RewardsError::InvalidTransition { .. })));

    let result = service
        .record_performance_snapshot(submission.id, 1_000, 5, UserId::new())
        .await;
    assert!(matches!(
        result,
        Err(RewardsError::NotApproved {
            status: SubmissionStatus::Rejected,
            ..
        })
    ));
}

#[tokio::test]
async fn influencer_summary_totals_latest_values() {
    let service = make_service();
    let influencer = UserId::new();
    let Ok(campaign) = service
        .create_campaign(UserId::new(), "Pizza", "", rule(1, 10))
        .await
    else {
        panic!("campaign creation failed");
    };
    let owner = RewardOwner::Campaign(campaign.id);

    let mut ids = Vec::new();
    for url in ["https://video.example/p1", "https://video.example/p2"] {
        let Ok(s) = service.submit_content(owner, influencer, url).await else {
            panic!("submission failed");
        };
        ids.push(s.id);
    }
    // A third one stays pending.
    let Ok(_) = service
        .submit_content(owner, influencer, "https://video.example/p3")
        .await
    else {
        panic!("submission failed");
    };

    for id in &ids {
        let Ok(_) = service.review_submission(*id, ReviewDecision::Approve).await else {
            panic!("approval failed");
        };
        let Ok(_) = service
            .record_performance_snapshot(*id, 1_000, 10, UserId::new())
            .await
        else {
            panic!("snapshot failed");
        };
        // The lower re-count is what counts.
        let Ok(_) = service
            .record_performance_snapshot(*id, 200, 4, UserId::new())
            .await
        else {
            panic!("snapshot failed");
        };
    }

    let Ok(summary) = service.influencer_earnings(influencer).await else {
        panic!("summary failed");
    };
    assert_eq!(summary.submission_count, 3);
    assert_eq!(summary.approved_count, 2);
    assert_eq!(summary.total_views, 400);
    assert_eq!(summary.total_likes, 8);
    assert_eq!(summary.total_earnings, Decimal::from(40));

    let Ok(approved) = service
        .list_submissions(&SubmissionFilter {
            influencer_id: Some(influencer),
            status: Some(SubmissionStatus::Approved),
            owner: None,
        })
        .await
    else {
        panic!("list failed");
    };
    assert_eq!(approved.len(), 2);
}
