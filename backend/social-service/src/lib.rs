//! Social interaction ledger
//!
//! Posts, like and follow edges, comments, and the per-post counters derived
//! from them. Every mutation runs as one transaction whose reported state is
//! taken from rows affected, never from an earlier read.

pub mod domain;
pub mod error;
pub mod repository;
pub mod services;

pub use domain::models::{
    CommentView, FollowToggle, LikeToggle, NewPost, Post, ToggleState, MAX_COMMENT_LENGTH,
    MAX_POST_LENGTH,
};
pub use error::{ServiceError, ServiceResult};
pub use services::InteractionLedger;
