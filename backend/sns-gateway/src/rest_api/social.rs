/// Follow graph endpoints
///
/// POST /api/users/{id}/follow - toggle follow
/// GET  /api/users/suggested   - accounts worth following
use actix_middleware::AuthenticatedUser;
use actix_web::{get, post, web, HttpResponse};

use super::models::{FollowResponse, UsersResponse};
use crate::error::Result;
use crate::state::AppState;

#[post("/api/users/{id}/follow")]
pub async fn toggle_follow(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let toggle = state
        .ledger
        .toggle_follow(user.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(FollowResponse {
        success: true,
        following: toggle.state.is_on(),
    }))
}

#[get("/api/users/suggested")]
pub async fn suggested_users(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let users = state
        .profiles
        .suggested_users(user.user_id, i64::from(state.feed_settings.suggested_users))
        .await?;

    Ok(HttpResponse::Ok().json(UsersResponse {
        success: true,
        users,
    }))
}
