/// Identity Service Library
///
/// Accounts, credentials and third-party identity linking for the SNS backend.
///
/// ## Modules
///
/// - `config`: OAuth provider settings
/// - `db`: User repository
/// - `error`: Error types
/// - `models`: Data models and request payloads
/// - `security`: Password hashing
/// - `services`: Credential store, identity linker, profiles
/// - `validators`: Input validation
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod security;
pub mod services;
pub mod validators;

// Re-export commonly used types
pub use error::{IdentityError, Result};
pub use models::{
    AuthSession, ExternalLoginAssertion, ExternalProfile, LinkedSession, LoginRequest,
    OAuthAuthorizationUrl, ProfileView, ProviderCredential, RegisterRequest,
    UpdateProfileRequest, User, UserSummary,
};
pub use services::{
    CredentialStore, GoogleProvider, IdentityLinker, IdentityProvider, ProfileService,
};
