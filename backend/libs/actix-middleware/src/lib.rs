//! # Actix Middleware Library
//!
//! Shared middleware components for the SNS actix services
//!
//! ## Modules
//! - `jwt_auth`: session token resolution and the `AuthenticatedUser` extractor
//! - `metrics`: Prometheus HTTP metrics middleware

pub mod jwt_auth;
pub mod metrics;

pub use jwt_auth::{
    extract_token, AuthenticatedUser, AuthenticationRequired, JwtAuthMiddleware, OptionalUser,
    SESSION_COOKIE,
};
pub use metrics::MetricsMiddleware;
