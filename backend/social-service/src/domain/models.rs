use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted post body, in characters
pub const MAX_POST_LENGTH: usize = 5000;

/// Longest accepted comment body, in characters
pub const MAX_COMMENT_LENGTH: usize = 1000;

/// Post entity; `likes` and `comments` mirror the edge tables
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub image_url: Option<String>,
    pub likes: i64,
    pub comments: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a new post
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPost {
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Comment joined with its author for display
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentView {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub username: String,
    pub avatar: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Which side of a binary relation a toggle landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    On,
    Off,
}

impl ToggleState {
    pub fn is_on(self) -> bool {
        self == ToggleState::On
    }
}

/// Outcome of a like toggle: new state plus the post's like counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeToggle {
    pub state: ToggleState,
    pub likes: i64,
}

/// Outcome of a follow toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowToggle {
    pub state: ToggleState,
}
