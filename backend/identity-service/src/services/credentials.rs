/// Password accounts: registration, login and the hashing they rely on
///
/// Argon2 work runs on the blocking pool so a burst of logins cannot stall
/// the async workers.
use crate::db::users;
use crate::error::{IdentityError, Result};
use crate::models::{AuthSession, LoginRequest, NewUser, RegisterRequest, DEFAULT_AVATAR};
use crate::security::password;
use crypto_core::TokenService;
use db_pool::Database;
use once_cell::sync::Lazy;
use tracing::{debug, info};
use validator::Validate;

/// Hash verified against when the email is unknown, so a miss costs the same
/// as a wrong password
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| password::hash_password("dummy-password-for-timing").ok());

#[derive(Clone)]
pub struct CredentialStore {
    db: Database,
    tokens: TokenService,
}

impl CredentialStore {
    pub fn new(db: Database, tokens: TokenService) -> Self {
        Self { db, tokens }
    }

    /// Slow salted digest of `password`
    pub async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || password::hash_password(&password)).await?
    }

    /// Constant-time check of `password` against a stored digest
    pub async fn verify(&self, password: &str, digest: &str) -> Result<bool> {
        let password = password.to_string();
        let digest = digest.to_string();
        tokio::task::spawn_blocking(move || password::verify_password(&password, &digest)).await?
    }

    /// Create a password account and open a session for it
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession> {
        request.validate()?;

        let password_hash = self.hash(&request.password).await?;
        let new_user = NewUser {
            username: request.username.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            password_hash: Some(password_hash),
            external_id: None,
            avatar: DEFAULT_AVATAR.to_string(),
            verified: false,
        };

        let user = match self
            .db
            .run(users::create_user(self.db.pool(), &new_user))
            .await
        {
            Ok(user) => user,
            Err(e) if e.violates("users.username") || e.violates("users.email") => {
                debug!(username = %new_user.username, "registration conflict");
                return Err(IdentityError::ConflictOnCreate);
            }
            Err(e) => return Err(e.into()),
        };

        let token = self.tokens.issue(user.id, &user.username)?;
        info!(user_id = user.id, username = %user.username, "User registered");

        Ok(AuthSession { user, token })
    }

    /// Check email and password, then open a session
    ///
    /// Unknown email, wrong password and accounts without a password all
    /// fail the same way.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession> {
        request
            .validate()
            .map_err(|_| IdentityError::InvalidCredentials)?;

        let email = request.email.trim().to_lowercase();
        let user = self
            .db
            .run(users::find_by_email(self.db.pool(), &email))
            .await?;

        let (user, digest) = match user {
            Some(user) => match user.password_hash.clone() {
                Some(digest) => (user, digest),
                None => {
                    self.burn_dummy_verify(&request.password).await;
                    return Err(IdentityError::InvalidCredentials);
                }
            },
            None => {
                self.burn_dummy_verify(&request.password).await;
                return Err(IdentityError::InvalidCredentials);
            }
        };

        if !self.verify(&request.password, &digest).await? {
            debug!(user_id = user.id, "password mismatch");
            return Err(IdentityError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.username)?;
        info!(user_id = user.id, "User logged in");

        Ok(AuthSession { user, token })
    }

    async fn burn_dummy_verify(&self, password: &str) {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            let _ = self.verify(password, dummy).await;
        }
    }
}
