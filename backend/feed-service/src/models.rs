use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post as shown in a feed, with its author resolved at read time
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeedPost {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub image_url: Option<String>,
    pub likes: i64,
    pub comments: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Author username
    pub username: String,
    /// Author avatar reference
    pub avatar: String,
    /// Whether the viewer has liked this post; always false for anonymous reads
    #[serde(default)]
    pub liked: bool,
}
