/// Business logic layer for identity-service
pub mod credentials;
pub mod oauth;
pub mod profile;

pub use credentials::CredentialStore;
pub use oauth::{GoogleProvider, IdentityLinker, IdentityProvider};
pub use profile::ProfileService;
