//! OAuth provider configuration for the identity service
//!
//! Loaded from environment variables by the gateway at startup and handed to
//! provider constructors; nothing here is global.

use serde::{Deserialize, Serialize};
use std::env;

/// Scope requested from every provider
pub const DEFAULT_OAUTH_SCOPE: &str = "email profile";

/// Third-party login settings
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct OAuthSettings {
    // Google OAuth 2.0
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_uri: Option<String>,
    pub default_scope: String,
}

impl std::fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("google_client_id", &self.google_client_id)
            .field(
                "google_client_secret",
                &self.google_client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("google_redirect_uri", &self.google_redirect_uri)
            .field("default_scope", &self.default_scope)
            .finish()
    }
}

/// Complete Google client registration
#[derive(Debug, Clone)]
pub struct GoogleClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
}

impl OAuthSettings {
    pub fn from_env() -> Self {
        Self {
            google_client_id: non_empty_var("GOOGLE_CLIENT_ID"),
            google_client_secret: non_empty_var("GOOGLE_CLIENT_SECRET"),
            google_redirect_uri: non_empty_var("GOOGLE_REDIRECT_URL"),
            default_scope: env::var("OAUTH_DEFAULT_SCOPE")
                .unwrap_or_else(|_| DEFAULT_OAUTH_SCOPE.to_string()),
        }
    }

    /// Google registration, only when id, secret and redirect are all set
    pub fn google(&self) -> Option<GoogleClientConfig> {
        Some(GoogleClientConfig {
            client_id: self.google_client_id.clone()?,
            client_secret: self.google_client_secret.clone()?,
            redirect_uri: self.google_redirect_uri.clone()?,
            scope: if self.default_scope.is_empty() {
                DEFAULT_OAUTH_SCOPE.to_string()
            } else {
                self.default_scope.clone()
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_requires_all_fields() {
        let mut settings = OAuthSettings {
            google_client_id: Some("id".into()),
            google_client_secret: Some("secret".into()),
            google_redirect_uri: None,
            default_scope: String::new(),
        };
        assert!(settings.google().is_none());

        settings.google_redirect_uri = Some("http://localhost:8080/auth/google/callback".into());
        let google = settings.google().unwrap();
        assert_eq!(google.scope, "email profile");
    }

    #[test]
    fn test_debug_hides_client_secret() {
        let settings = OAuthSettings {
            google_client_secret: Some("very-secret".into()),
            ..OAuthSettings::default()
        };
        assert!(!format!("{settings:?}").contains("very-secret"));
    }
}
