//! Feed composition over the follow graph
//!
//! Read-only: posts, follows and likes are owned by social-service, users by
//! identity-service. Every page is ordered by `(created_at DESC, id DESC)` so
//! offsets stay stable across pages.

pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use error::{FeedError, Result};
pub use models::FeedPost;
pub use services::{FeedComposer, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
