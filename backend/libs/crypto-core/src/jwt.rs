/// Session token issuance and validation
///
/// Tokens are HS256 JWTs signed with a shared secret. Any process holding the
/// secret can validate a token independently of where it was issued; validity
/// is signature plus expiry only, there is no server-side session record.
///
/// ## Usage
///
/// The secret is injected through [`JwtConfig`] at construction time:
///
/// ```rust
/// use crypto_core::jwt::{JwtConfig, TokenService};
///
/// let tokens = TokenService::new(JwtConfig::new("a-long-random-secret")).unwrap();
/// let token = tokens.issue(42, "alice").unwrap();
/// let claims = tokens.validate(&token).unwrap();
/// assert_eq!(claims.user_id, 42);
/// ```
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Issuer stamped into every session token
pub const DEFAULT_ISSUER: &str = "gosns";

const SESSION_TOKEN_EXPIRY_HOURS: i64 = 24;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

// ============================================================================
// Data Structures
// ============================================================================

/// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    /// Issuer
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Why a token was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Expired,
    BadSignature,
    WrongIssuer,
    Malformed,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            TokenRejection::Expired => "token expired",
            TokenRejection::BadSignature => "signature mismatch",
            TokenRejection::WrongIssuer => "unexpected issuer",
            TokenRejection::Malformed => "malformed token",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    InvalidToken(TokenRejection),

    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Signing configuration, built from settings at startup
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl: Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: DEFAULT_ISSUER.to_string(),
            ttl: Duration::hours(SESSION_TOKEN_EXPIRY_HOURS),
        }
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish()
    }
}

// ============================================================================
// Token Service
// ============================================================================

/// Issues and validates session tokens
///
/// Cheap to clone; keys are derived once from the configured secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Result<Self, TokenError> {
        if config.secret.trim().is_empty() {
            return Err(TokenError::EmptySecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer,
            ttl: config.ttl,
        })
    }

    /// Lifetime of issued tokens, used for the session cookie max-age
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id` valid for the configured lifetime
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, username, Utc::now())
    }

    /// Issue a token as if the current time were `issued_at`
    pub fn issue_at(
        &self,
        user_id: i64,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            user_id,
            username: username.to_string(),
            iss: self.issuer.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Validate signature, issuer and expiry, returning the embedded claims
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let rejection = match e.kind() {
                    ErrorKind::ExpiredSignature => TokenRejection::Expired,
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        TokenRejection::BadSignature
                    }
                    ErrorKind::InvalidIssuer => TokenRejection::WrongIssuer,
                    _ => TokenRejection::Malformed,
                };
                tracing::debug!(reason = %rejection, "session token rejected");
                TokenError::InvalidToken(rejection)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(JwtConfig::new("test-secret-for-session-tokens")).unwrap()
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let tokens = service();
        let token = tokens.issue(7, "alice").expect("Failed to issue token");
        assert_eq!(token.matches('.').count(), 2);

        let claims = tokens.validate(&token).expect("Token should validate");
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss, "gosns");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_validate_malformed_token() {
        let result = service().validate("invalid.token.here");
        assert!(matches!(
            result,
            Err(TokenError::InvalidToken(TokenRejection::Malformed))
        ));
    }

    #[test]
    fn test_validate_tampered_token() {
        let tokens = service();
        let token = tokens.issue(7, "alice").unwrap();

        // Swap the payload for one claiming a different user
        let forged = tokens.issue(8, "mallory").unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(matches!(
            tokens.validate(&tampered),
            Err(TokenError::InvalidToken(TokenRejection::BadSignature))
        ));
    }

    #[test]
    fn test_validate_rejects_other_secret() {
        let token = service().issue(7, "alice").unwrap();
        let other = TokenService::new(JwtConfig::new("a-different-secret")).unwrap();

        assert!(other.validate(&token).is_err());
    }

    #[test]
    fn test_validate_rejects_other_issuer() {
        let mut config = JwtConfig::new("test-secret-for-session-tokens");
        config.issuer = "someone-else".to_string();
        let foreign = TokenService::new(config).unwrap();
        let token = foreign.issue(7, "alice").unwrap();

        assert!(matches!(
            service().validate(&token),
            Err(TokenError::InvalidToken(TokenRejection::WrongIssuer))
        ));
    }

    #[test]
    fn test_token_expiration() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::hours(25);
        let token = tokens.issue_at(7, "alice", issued_at).unwrap();

        assert!(matches!(
            tokens.validate(&token),
            Err(TokenError::InvalidToken(TokenRejection::Expired))
        ));
    }

    #[test]
    fn test_token_just_inside_window() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::hours(23);
        let token = tokens.issue_at(7, "alice", issued_at).unwrap();

        assert!(tokens.validate(&token).is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            TokenService::new(JwtConfig::new("  ")),
            Err(TokenError::EmptySecret)
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", JwtConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }
}
