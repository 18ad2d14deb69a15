use crypto_core::TokenError;
use db_pool::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdentityError>;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Username or email already registered")]
    ConflictOnCreate,

    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error("Unknown OAuth provider: {0}")]
    UnknownProvider(String),

    #[error("OAuth code exchange failed: {0}")]
    ExchangeError(String),

    #[error("OAuth provider error: {0}")]
    ProviderError(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Store timeouts and connection failures
    pub fn is_unavailable(&self) -> bool {
        matches!(self, IdentityError::Store(e) if e.is_transient())
    }
}

// Conversions from external error types
impl From<StoreError> for IdentityError {
    fn from(err: StoreError) -> Self {
        if !err.is_transient() {
            tracing::error!("Database error: {}", err);
        }
        IdentityError::Store(err)
    }
}

impl From<TokenError> for IdentityError {
    fn from(err: TokenError) -> Self {
        tracing::error!("JWT error: {}", err);
        IdentityError::Token(err.to_string())
    }
}

impl From<validator::ValidationErrors> for IdentityError {
    fn from(err: validator::ValidationErrors) -> Self {
        IdentityError::Validation(err.to_string())
    }
}

impl From<tokio::task::JoinError> for IdentityError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!("Blocking task failed: {}", err);
        IdentityError::Internal(err.to_string())
    }
}
