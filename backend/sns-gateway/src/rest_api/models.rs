//! REST API request/response models

use feed_service::FeedPost;
use identity_service::{ProfileView, UserSummary};
use serde::{Deserialize, Serialize};
use social_service::CommentView;

// ============================================================================
// Requests
// ============================================================================

/// `?page=` as sent by the browser
///
/// Kept as raw text so that a garbled value falls back to the first page
/// instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
}

impl PageQuery {
    /// 1-based page; missing, unparsable or non-positive values mean page 1
    pub fn page(&self) -> u32 {
        let page = self
            .page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .max(1);
        u32::try_from(page).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub code: String,
    /// Set by the provider when the user declined consent
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub success: bool,
    pub likes: i64,
    pub liked: bool,
}

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub success: bool,
    pub following: bool,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub success: bool,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub success: bool,
    pub comment: CommentView,
}

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub success: bool,
    pub page: u32,
    pub posts: Vec<FeedPost>,
}

/// Login and registration views: where the form posts and which
/// third-party providers can be used instead
#[derive(Debug, Serialize)]
pub struct AuthPageResponse {
    pub success: bool,
    pub page: &'static str,
    pub action: &'static str,
    pub providers: Vec<ProviderLink>,
}

#[derive(Debug, Serialize)]
pub struct ProviderLink {
    pub name: String,
    pub url: String,
}

impl ProviderLink {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: format!("/auth/{name}"),
        }
    }
}

/// Signed-in identity echoed on the home view
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    pub posts: Vec<FeedPost>,
    pub suggested_users: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub profile: ProfileView,
    pub posts: Vec<FeedPost>,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<UserSummary>,
}
