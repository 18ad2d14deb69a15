/// Feed endpoints
///
/// GET /                 - home view: timeline when signed in, public feed otherwise
/// GET /api/posts?page=N - timeline page
/// GET /api/posts/public - most recent posts
use actix_middleware::{AuthenticatedUser, OptionalUser};
use actix_web::{get, web, HttpResponse};
use tracing::warn;

use super::models::{HomeResponse, PageQuery, SessionUser, TimelineResponse};
use crate::error::Result;
use crate::state::AppState;

#[get("/")]
pub async fn home(user: OptionalUser, state: web::Data<AppState>) -> Result<HttpResponse> {
    let page_size = state.feed_settings.page_size;

    let Some(user) = user.0 else {
        let posts = state.feed.public_timeline(page_size).await?;
        return Ok(HttpResponse::Ok().json(HomeResponse {
            success: true,
            user: None,
            posts,
            suggested_users: Vec::new(),
        }));
    };

    let posts = state.feed.timeline(user.user_id, 1, page_size).await?;

    // Suggestions are decoration; the home view renders without them
    let suggested_users = match state
        .profiles
        .suggested_users(user.user_id, i64::from(state.feed_settings.suggested_users))
        .await
    {
        Ok(users) => users,
        Err(e) => {
            warn!(user_id = user.user_id, error = %e, "Failed to load suggested users");
            Vec::new()
        }
    };

    Ok(HttpResponse::Ok().json(HomeResponse {
        success: true,
        user: Some(SessionUser {
            id: user.user_id,
            username: user.username,
        }),
        posts,
        suggested_users,
    }))
}

#[get("/api/posts")]
pub async fn timeline(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = query.page();
    let posts = state
        .feed
        .timeline(user.user_id, page, state.feed_settings.page_size)
        .await?;

    Ok(HttpResponse::Ok().json(TimelineResponse {
        success: true,
        page,
        posts,
    }))
}

#[get("/api/posts/public")]
pub async fn public_timeline(state: web::Data<AppState>) -> Result<HttpResponse> {
    let posts = state
        .feed
        .public_timeline(state.feed_settings.page_size)
        .await?;

    Ok(HttpResponse::Ok().json(TimelineResponse {
        success: true,
        page: 1,
        posts,
    }))
}
