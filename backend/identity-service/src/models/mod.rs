pub mod oauth;
pub mod user;

pub use oauth::{
    ExternalLoginAssertion, ExternalProfile, LinkedSession, OAuthAuthorizationUrl,
    ProviderCredential,
};
pub use user::{
    AuthSession, LoginRequest, NewUser, ProfileView, RegisterRequest, UpdateProfileRequest, User,
    UserSummary, DEFAULT_AVATAR,
};
