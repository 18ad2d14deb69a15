use crate::config::{FeedSettings, Settings};
use crypto_core::{TokenError, TokenService};
use db_pool::Database;
use feed_service::FeedComposer;
use identity_service::{
    CredentialStore, GoogleProvider, IdentityLinker, ProfileService,
};
use social_service::InteractionLedger;
use std::sync::Arc;
use tracing::info;

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: TokenService,
    pub credentials: CredentialStore,
    pub linker: IdentityLinker,
    pub profiles: ProfileService,
    pub ledger: InteractionLedger,
    pub feed: FeedComposer,
    pub feed_settings: FeedSettings,
    pub cookie_secure: bool,
}

impl AppState {
    /// Wire services around an open database and a token service
    ///
    /// The linker is passed in so callers choose which providers it knows.
    pub fn new(
        db: Database,
        tokens: TokenService,
        linker: IdentityLinker,
        feed_settings: FeedSettings,
        cookie_secure: bool,
    ) -> Self {
        Self {
            credentials: CredentialStore::new(db.clone(), tokens.clone()),
            profiles: ProfileService::new(db.clone()),
            ledger: InteractionLedger::new(db.clone()),
            feed: FeedComposer::new(db.clone()),
            linker,
            tokens,
            db,
            feed_settings,
            cookie_secure,
        }
    }

    pub fn from_settings(db: Database, settings: &Settings) -> Result<Self, TokenError> {
        let tokens = TokenService::new(settings.jwt.clone())?;

        let mut linker = IdentityLinker::new(db.clone(), tokens.clone());
        if let Some(google) = settings.oauth.google() {
            linker = linker.with_provider(Arc::new(GoogleProvider::new(google)));
            info!("Google OAuth provider registered");
        }

        Ok(Self::new(
            db,
            tokens,
            linker,
            settings.feed,
            settings.server.cookie_secure,
        ))
    }
}
