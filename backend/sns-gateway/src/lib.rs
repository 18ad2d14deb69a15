//! SNS Gateway Library
//!
//! HTTP surface of the social feed: session cookies, OAuth redirects and the
//! JSON API over identity-service, social-service and feed-service.

pub mod config;
pub mod error;
pub mod rest_api;
pub mod state;

pub use config::Settings;
pub use error::AppError;
pub use state::AppState;
