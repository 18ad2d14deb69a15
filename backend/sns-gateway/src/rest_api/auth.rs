/// Password authentication endpoints
///
/// GET  /register - registration view
/// POST /register - create an account and start a session
/// GET  /login    - login view, also the target of missing-session redirects
/// POST /login    - start a session
/// GET  /logout   - drop the session cookie
use actix_middleware::SESSION_COOKIE;
use actix_web::{get, post, web, HttpResponse};
use identity_service::{LoginRequest, RegisterRequest};
use tracing::info;

use super::models::{AuthPageResponse, ProviderLink};
use super::session::{removal_cookie, see_other, start_session};
use crate::error::Result;
use crate::state::AppState;

fn auth_page(state: &AppState, page: &'static str, action: &'static str) -> HttpResponse {
    let providers = state
        .linker
        .provider_names()
        .into_iter()
        .map(ProviderLink::new)
        .collect();

    HttpResponse::Ok().json(AuthPageResponse {
        success: true,
        page,
        action,
        providers,
    })
}

#[get("/register")]
pub async fn register_page(state: web::Data<AppState>) -> HttpResponse {
    auth_page(&state, "register", "/register")
}

#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    form: web::Form<RegisterRequest>,
) -> Result<HttpResponse> {
    let session = state.credentials.register(form.into_inner()).await?;
    Ok(start_session(&session.token, state.cookie_secure))
}

#[get("/login")]
pub async fn login_page(state: web::Data<AppState>) -> HttpResponse {
    auth_page(&state, "login", "/login")
}

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginRequest>,
) -> Result<HttpResponse> {
    let session = state.credentials.login(form.into_inner()).await?;
    Ok(start_session(&session.token, state.cookie_secure))
}

#[get("/logout")]
pub async fn logout() -> HttpResponse {
    info!("Session cookie cleared");
    see_other("/").cookie(removal_cookie(SESSION_COOKIE)).finish()
}
