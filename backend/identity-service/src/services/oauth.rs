/// Third-party login: provider abstraction and local account linking
///
/// ## Flow
///
/// 1. `start_flow` mints an anti-forgery state value and the consent URL; the
///    caller keeps the state (cookie, 10 minute lifetime).
/// 2. `complete_external_login` checks the echoed state, exchanges the code,
///    fetches the provider profile, then resolves or creates the local user
///    and issues a session token.
///
/// Nothing is written before the provider profile is in hand, so a failed
/// flow never leaves a partial account behind.
use crate::config::GoogleClientConfig;
use crate::db::users;
use crate::error::{IdentityError, Result};
use crate::models::{
    ExternalLoginAssertion, ExternalProfile, LinkedSession, NewUser, OAuthAuthorizationUrl,
    ProviderCredential, User, DEFAULT_AVATAR,
};
use crate::validators::username_from_email;
use async_trait::async_trait;
use crypto_core::TokenService;
use db_pool::Database;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Lifetime of the anti-forgery state cookie
pub const OAUTH_STATE_TTL_SECS: i64 = 600;

/// Attempts at a unique username before giving up
const MAX_USERNAME_ATTEMPTS: usize = 5;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// A third-party identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Route segment, e.g. `google`
    fn name(&self) -> &str;

    /// Consent screen URL carrying `state`
    fn authorization_url(&self, state: &str) -> String;

    /// Trade the authorization code for an access credential
    async fn exchange_code(&self, code: &str) -> Result<ProviderCredential>;

    /// Fetch the identity profile behind `credential`
    async fn fetch_profile(&self, credential: &ProviderCredential) -> Result<ExternalProfile>;
}

/// Google OAuth 2.0 provider
pub struct GoogleProvider {
    config: GoogleClientConfig,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    #[serde(default)]
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleProvider {
    pub fn new(config: GoogleClientConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { config, http }
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{GOOGLE_AUTH_URL}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&self.config.scope),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderCredential> {
        let response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| IdentityError::ExchangeError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::ExchangeError(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let token = response
            .json::<GoogleTokenResponse>()
            .await
            .map_err(|e| IdentityError::ExchangeError(e.to_string()))?;

        Ok(ProviderCredential {
            access_token: token.access_token,
        })
    }

    async fn fetch_profile(&self, credential: &ProviderCredential) -> Result<ExternalProfile> {
        let info = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&credential.access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| IdentityError::ProviderError(e.to_string()))?
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| IdentityError::ProviderError(e.to_string()))?;

        Ok(ExternalProfile {
            external_id: format!("google:{}", info.id),
            email: info.email,
            display_name: info.name,
            picture: info.picture,
        })
    }
}

/// Resolves third-party identities to local users
#[derive(Clone)]
pub struct IdentityLinker {
    db: Database,
    tokens: TokenService,
    providers: HashMap<String, Arc<dyn IdentityProvider>>,
}

impl IdentityLinker {
    pub fn new(db: Database, tokens: TokenService) -> Self {
        Self {
            db,
            tokens,
            providers: HashMap::new(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.providers.insert(provider.name().to_string(), provider);
        self
    }

    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Registered provider names, sorted
    pub fn provider_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn provider(&self, name: &str) -> Result<&Arc<dyn IdentityProvider>> {
        self.providers
            .get(name)
            .ok_or_else(|| IdentityError::UnknownProvider(name.to_string()))
    }

    /// Generate the consent URL and the state value the callback must echo
    pub fn start_flow(&self, provider: &str) -> Result<OAuthAuthorizationUrl> {
        let provider = self.provider(provider)?;
        let state = Uuid::new_v4().to_string();
        let url = provider.authorization_url(&state);

        debug!(provider = provider.name(), "OAuth flow started");
        Ok(OAuthAuthorizationUrl { url, state })
    }

    /// Complete the OAuth flow after the provider callback
    pub async fn complete_external_login(
        &self,
        assertion: ExternalLoginAssertion,
    ) -> Result<LinkedSession> {
        let expected = assertion.expected_state.as_deref().unwrap_or_default();
        if expected.is_empty() || expected != assertion.state {
            warn!(provider = %assertion.provider, "OAuth state mismatch");
            return Err(IdentityError::StateMismatch);
        }

        let provider = self.provider(&assertion.provider)?;
        let credential = provider.exchange_code(&assertion.code).await?;
        let profile = provider.fetch_profile(&credential).await?;

        let (user, is_new_user) = self.resolve_or_create(&profile).await?;
        let token = self.tokens.issue(user.id, &user.username)?;

        info!(
            user_id = user.id,
            provider = provider.name(),
            is_new_user,
            "External login completed"
        );

        Ok(LinkedSession {
            user,
            token,
            is_new_user,
        })
    }

    async fn resolve_or_create(&self, profile: &ExternalProfile) -> Result<(User, bool)> {
        if let Some(user) = self.find_existing(profile).await? {
            return Ok((user, false));
        }

        if profile.email.trim().is_empty() {
            return Err(IdentityError::ProviderError(
                "provider profile carries no email".to_string(),
            ));
        }

        let email = profile.email.trim().to_lowercase();
        let base = username_from_email(&email);

        for attempt in 0..MAX_USERNAME_ATTEMPTS {
            let username = if attempt == 0 {
                base.clone()
            } else {
                format!("{base}_{}", &Uuid::new_v4().simple().to_string()[..6])
            };

            let new_user = NewUser {
                username,
                email: email.clone(),
                password_hash: None,
                external_id: Some(profile.external_id.clone()),
                avatar: profile
                    .picture
                    .clone()
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
                verified: true,
            };

            match self
                .db
                .run(users::create_user(self.db.pool(), &new_user))
                .await
            {
                Ok(user) => {
                    info!(user_id = user.id, username = %user.username, "New user created via OAuth");
                    return Ok((user, true));
                }
                Err(e) if e.violates("users.username") => {
                    debug!(username = %new_user.username, attempt, "username taken, retrying with suffix");
                }
                Err(e) if e.violates("users.email") || e.violates("users.external_id") => {
                    // Lost a race with a concurrent login for the same identity
                    return self
                        .find_existing(profile)
                        .await?
                        .map(|user| (user, false))
                        .ok_or(IdentityError::ConflictOnCreate);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(IdentityError::ConflictOnCreate)
    }

    /// Match by external id or email, linking the external id on first use
    async fn find_existing(&self, profile: &ExternalProfile) -> Result<Option<User>> {
        let email = profile.email.trim().to_lowercase();
        let found = self
            .db
            .run(users::find_by_external_id_or_email(
                self.db.pool(),
                &profile.external_id,
                &email,
            ))
            .await?;

        let Some(user) = found else {
            return Ok(None);
        };

        if user.external_id.is_some() {
            return Ok(Some(user));
        }

        let linked = self
            .db
            .run(users::link_external_id(
                self.db.pool(),
                user.id,
                &profile.external_id,
            ))
            .await?;
        if linked.is_some() {
            info!(user_id = user.id, "Linked external identity to existing account");
        }

        Ok(Some(linked.unwrap_or(user)))
    }
}
