use std::fmt::Debug;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde::Serialize;

use crate::utils::error_chain_fmt;

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    code: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
}

/// The API-wide error envelope. Every route maps its own error type into one
/// of these variants rather than leaking internal error details.
#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { field: String, message: String },
    #[error("church {church_name:?} has already registered the maximum number of teams")]
    ChurchQuotaExceeded { church_name: String },
    #[error("a team with this name and captain phone already exists")]
    DuplicateTeam,
    #[error("a request with this idempotency key is already being processed")]
    DuplicateRequest,
    #[error("this idempotency key was already used with a different request body")]
    IdempotencyConflict,
    #[error("team {team_id} was not found")]
    NotFound { team_id: String },
    #[error("team {team_id} has already been rejected and cannot be confirmed")]
    InvalidTransition { team_id: String },
    #[error("failed to upload one or more artifacts")]
    UploadFailed(#[source] anyhow::Error),
    #[error("a dependency's circuit breaker is open")]
    CircuitOpen,
    #[error("the registration protocol exceeded its end-to-end deadline")]
    DeadlineExceeded,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl Debug for ApiError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_FAILED",
            Self::ChurchQuotaExceeded { .. } => "CHURCH_QUOTA_EXCEEDED",
            Self::DuplicateTeam => "DUPLICATE_TEAM",
            Self::DuplicateRequest => "DUPLICATE_REQUEST",
            Self::IdempotencyConflict => "IDEMPOTENCY_CONFLICT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::UploadFailed(_) => "UPLOAD_FAILED",
            Self::CircuitOpen => "CIRCUIT_OPEN",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::Unexpected(_) => "DATABASE_ERROR",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ChurchQuotaExceeded { .. } => StatusCode::CONFLICT,
            Self::DuplicateTeam => StatusCode::CONFLICT,
            Self::DuplicateRequest => StatusCode::CONFLICT,
            Self::IdempotencyConflict => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::UploadFailed(_) => StatusCode::BAD_GATEWAY,
            Self::CircuitOpen => StatusCode::SERVICE_UNAVAILABLE,
            Self::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let field = match self {
            Self::Validation { field, .. } => Some(field.as_str()),
            _ => None,
        };
        let body = ErrorBody { success: false, code: self.code(), message: self.to_string(), field };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<crate::payload::ValidationError> for ApiError {
    fn from(value: crate::payload::ValidationError) -> Self {
        Self::Validation { field: value.field, message: value.message }
    }
}

impl From<crate::quota::QuotaError> for ApiError {
    fn from(value: crate::quota::QuotaError) -> Self {
        match value {
            crate::quota::QuotaError::Exceeded { church_name, .. } => {
                Self::ChurchQuotaExceeded { church_name }
            }
            crate::quota::QuotaError::Database(e) => Self::Unexpected(e.into()),
        }
    }
}
