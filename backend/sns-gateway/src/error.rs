//! HTTP error mapping for the gateway
//!
//! Domain errors from the services are folded into [`AppError`], whose
//! `ResponseError` impl picks the status and renders the JSON envelope.
//! Internal causes are logged here and never sent to the client.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use feed_service::FeedError;
use identity_service::IdentityError;
use serde_json::json;
use social_service::ServiceError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("login state did not match, please try again")]
    StateMismatch,

    #[error("{0}")]
    ExternalLogin(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("you cannot follow yourself")]
    SelfReference,

    #[error("not allowed to modify this resource")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("username or email already registered")]
    Conflict,

    #[error("service temporarily unavailable")]
    Unavailable,

    #[error("internal server error")]
    Internal,
}

impl AppError {
    /// Stable machine-readable error code
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::StateMismatch => "state_mismatch",
            AppError::ExternalLogin(_) => "external_login_failed",
            AppError::BadRequest(_) => "bad_request",
            AppError::SelfReference => "self_reference_not_allowed",
            AppError::Forbidden => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict => "conflict",
            AppError::Unavailable => "store_unavailable",
            AppError::Internal => "internal",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::StateMismatch
            | AppError::ExternalLogin(_)
            | AppError::BadRequest(_)
            | AppError::SelfReference => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.kind(),
            "message": self.to_string(),
        }))
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials => AppError::InvalidCredentials,
            IdentityError::UserNotFound => AppError::NotFound("user".to_string()),
            IdentityError::ConflictOnCreate => AppError::Conflict,
            IdentityError::StateMismatch => AppError::StateMismatch,
            IdentityError::UnknownProvider(name) => {
                AppError::ExternalLogin(format!("unknown login provider: {name}"))
            }
            IdentityError::ExchangeError(reason) => {
                error!(reason = %reason, "OAuth code exchange rejected");
                AppError::ExternalLogin("the login provider rejected the request".to_string())
            }
            IdentityError::ProviderError(reason) => {
                error!(reason = %reason, "OAuth profile fetch failed");
                AppError::ExternalLogin("could not read your profile from the login provider".to_string())
            }
            IdentityError::Validation(msg) => AppError::BadRequest(msg),
            e if e.is_unavailable() => AppError::Unavailable,
            e => {
                error!(error = %e, "identity request failed");
                AppError::Internal
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::SelfReferenceNotAllowed => AppError::SelfReference,
            ServiceError::Unauthorized => AppError::Forbidden,
            ServiceError::InvalidInput(msg) => AppError::BadRequest(msg),
            ServiceError::NotFound(what) => AppError::NotFound(what),
            e if e.is_unavailable() => AppError::Unavailable,
            e => {
                error!(error = %e, "social request failed");
                AppError::Internal
            }
        }
    }
}

impl From<FeedError> for AppError {
    fn from(err: FeedError) -> Self {
        if err.is_unavailable() {
            return AppError::Unavailable;
        }
        error!(error = %err, "feed request failed");
        AppError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db_pool::StoreError;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::from(IdentityError::InvalidCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(IdentityError::StateMismatch).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(IdentityError::ConflictOnCreate).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(ServiceError::Unauthorized).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(ServiceError::SelfReferenceNotAllowed).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_transient_store_errors_are_unavailable() {
        let timeout = || StoreError::Timeout(Duration::from_millis(5));
        assert!(matches!(
            AppError::from(ServiceError::Store(timeout())),
            AppError::Unavailable
        ));
        assert!(matches!(
            AppError::from(FeedError::Store(timeout())),
            AppError::Unavailable
        ));
        assert_eq!(AppError::Unavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = AppError::from(IdentityError::Internal("db password=hunter2".into()));
        assert_eq!(err.to_string(), "internal server error");
    }
}
