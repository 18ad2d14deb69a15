/// Post and interaction endpoints
///
/// POST   /posts                    - publish a post (form)
/// POST   /api/posts/{id}/like      - toggle like
/// GET    /api/posts/{id}/comments  - list comments
/// POST   /api/posts/{id}/comments  - add a comment
/// DELETE /api/posts/{id}           - delete own post
use actix_middleware::AuthenticatedUser;
use actix_web::{delete, get, post, web, HttpResponse};
use social_service::NewPost;

use super::models::{CommentBody, CommentResponse, CommentsResponse, LikeResponse, SuccessResponse};
use super::session::see_other;
use crate::error::Result;
use crate::state::AppState;

#[post("/posts")]
pub async fn create_post(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    form: web::Form<NewPost>,
) -> Result<HttpResponse> {
    state.ledger.create_post(user.user_id, form.into_inner()).await?;
    Ok(see_other("/").finish())
}

#[post("/api/posts/{id}/like")]
pub async fn toggle_like(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let toggle = state
        .ledger
        .toggle_like(user.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(LikeResponse {
        success: true,
        likes: toggle.likes,
        liked: toggle.state.is_on(),
    }))
}

#[get("/api/posts/{id}/comments")]
pub async fn list_comments(
    _user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let comments = state.ledger.list_comments(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CommentsResponse {
        success: true,
        comments,
    }))
}

#[post("/api/posts/{id}/comments")]
pub async fn add_comment(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<CommentBody>,
) -> Result<HttpResponse> {
    let comment = state
        .ledger
        .add_comment(user.user_id, path.into_inner(), &body.content)
        .await?;

    Ok(HttpResponse::Created().json(CommentResponse {
        success: true,
        comment,
    }))
}

#[delete("/api/posts/{id}")]
pub async fn delete_post(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    state
        .ledger
        .delete_post(path.into_inner(), user.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
