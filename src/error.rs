//! Error types with HTTP status code mapping.
//!
//! [`RewardsError`] is the central error type of the crate. Every failure is
//! a local validation or storage failure returned synchronously; nothing is
//! retried internally. Each variant carries a numeric code and an HTTP status
//! so an outer route layer can turn it into a response via [`IntoResponse`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::{RewardOwner, SubmissionStatus};

/// Structured JSON error response body.
///
/// ```json
/// {
///   "error": {
///     "code": 2005,
///     "message": "submission 6f1c... is pending, not approved",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Crate-wide error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
/// | 4000–4999 | Access          | 403 Forbidden                |
#[derive(Debug, thiserror::Error)]
pub enum RewardsError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Reward rule would divide by zero or pay a negative amount.
    #[error("invalid reward rule: {0}")]
    InvalidRule(String),

    /// Campaign with the given ID was not found.
    #[error("campaign not found: {0}")]
    CampaignNotFound(uuid::Uuid),

    /// Invitation with the given ID was not found.
    #[error("invitation not found: {0}")]
    InvitationNotFound(uuid::Uuid),

    /// Submission with the given ID was not found.
    #[error("submission not found: {0}")]
    SubmissionNotFound(uuid::Uuid),

    /// The campaign or invitation owning a submission no longer resolves.
    #[error("no reward rule for {0}")]
    MissingRewardRule(RewardOwner),

    /// Views/earnings updates are only valid on approved submissions.
    #[error("submission {submission_id} is {status}, not approved")]
    NotApproved {
        /// Submission that was targeted.
        submission_id: uuid::Uuid,
        /// Its current status.
        status: SubmissionStatus,
    },

    /// Status change not permitted by the lifecycle.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// Influencer is not the addressee of a private invitation.
    #[error("user {influencer_id} is not invited to {invitation_id}")]
    NotInvited {
        /// Invitation being acted on.
        invitation_id: uuid::Uuid,
        /// User who attempted the action.
        influencer_id: uuid::Uuid,
    },

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),
}

impl RewardsError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidRule(_) => 1002,
            Self::CampaignNotFound(_) => 2001,
            Self::InvitationNotFound(_) => 2002,
            Self::SubmissionNotFound(_) => 2003,
            Self::MissingRewardRule(_) => 2004,
            Self::NotApproved { .. } => 2005,
            Self::InvalidTransition { .. } => 2006,
            Self::PersistenceError(_) => 3001,
            Self::NotInvited { .. } => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidRule(_) => StatusCode::BAD_REQUEST,
            Self::CampaignNotFound(_)
            | Self::InvitationNotFound(_)
            | Self::SubmissionNotFound(_)
            | Self::MissingRewardRule(_) => StatusCode::NOT_FOUND,
            Self::NotApproved { .. } | Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotInvited { .. } => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for RewardsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
