/// Profile endpoints
///
/// GET  /profile            - redirect to the caller's own profile
/// GET  /profile/{username} - profile with latest posts
/// POST /profile/update     - change bio and avatar (form)
use actix_middleware::{AuthenticatedUser, OptionalUser};
use actix_web::{get, post, web, HttpResponse};
use identity_service::UpdateProfileRequest;

use super::models::ProfileResponse;
use super::session::see_other;
use crate::error::Result;
use crate::state::AppState;

#[get("/profile")]
pub async fn own_profile(user: AuthenticatedUser) -> HttpResponse {
    see_other(&format!("/profile/{}", user.username)).finish()
}

#[get("/profile/{username}")]
pub async fn profile(
    viewer: OptionalUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let viewer_id = viewer.0.map(|user| user.user_id);
    let profile = state.profiles.profile(&path, viewer_id).await?;
    let posts = state
        .feed
        .user_posts(profile.user.id, viewer_id, state.feed_settings.page_size)
        .await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        success: true,
        profile,
        posts,
    }))
}

#[post("/profile/update")]
pub async fn update_profile(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    form: web::Form<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let mut request = form.into_inner();
    // An empty avatar field means "keep the current one"
    request.avatar = request.avatar.filter(|avatar| !avatar.trim().is_empty());

    let updated = state.profiles.update_profile(user.user_id, request).await?;
    Ok(see_other(&format!("/profile/{}", updated.username)).finish())
}
