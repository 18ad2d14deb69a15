use serde::{Deserialize, Serialize};

use super::User;

/// OAuth authorization URL response
#[derive(Debug, Clone, Serialize)]
pub struct OAuthAuthorizationUrl {
    pub url: String,
    pub state: String,
}

/// What the browser brings back from the provider consent screen
#[derive(Debug, Clone)]
pub struct ExternalLoginAssertion {
    pub provider: String,
    /// State issued when the flow started (from the state cookie)
    pub expected_state: Option<String>,
    /// State echoed by the provider in the callback query
    pub state: String,
    pub code: String,
}

/// Access credential returned by the provider's token endpoint
#[derive(Debug, Clone)]
pub struct ProviderCredential {
    pub access_token: String,
}

/// Identity profile fetched from the provider
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalProfile {
    pub external_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub picture: Option<String>,
}

/// Result of a completed third-party login
#[derive(Debug, Clone)]
pub struct LinkedSession {
    pub user: User,
    pub token: String,
    pub is_new_user: bool,
}
