/// Third-party login endpoints
///
/// GET /auth/{provider}          - redirect to the provider consent screen
/// GET /auth/{provider}/callback - finish the flow and start a session
use actix_web::{get, web, HttpRequest, HttpResponse, ResponseError};
use identity_service::services::oauth::OAUTH_STATE_TTL_SECS;
use identity_service::ExternalLoginAssertion;
use tracing::{info, warn};

use super::models::OAuthCallbackQuery;
use super::session::{
    oauth_state_cookie, removal_cookie, see_other, session_cookie, OAUTH_STATE_COOKIE,
};
use crate::error::{AppError, Result};
use crate::state::AppState;

#[get("/auth/{provider}")]
pub async fn start(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let provider = path.into_inner();
    let flow = state.linker.start_flow(&provider)?;

    info!(provider = %provider, "Redirecting to OAuth consent screen");
    Ok(see_other(&flow.url)
        .cookie(oauth_state_cookie(
            &flow.state,
            OAUTH_STATE_TTL_SECS,
            state.cookie_secure,
        ))
        .finish())
}

/// The state cookie is single-use: it is cleared whether the flow succeeds or
/// fails, so a retry always starts from `/auth/{provider}`.
#[get("/auth/{provider}/callback")]
pub async fn callback(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<OAuthCallbackQuery>,
) -> HttpResponse {
    let mut response = match finish_login(&req, &state, path.into_inner(), query.into_inner()).await
    {
        Ok(token) => see_other("/")
            .cookie(session_cookie(&token, state.cookie_secure))
            .finish(),
        Err(e) => e.error_response(),
    };

    if let Err(e) = response.add_cookie(&removal_cookie(OAUTH_STATE_COOKIE)) {
        warn!(error = %e, "Failed to clear OAuth state cookie");
    }
    response
}

/// Run the linker for a callback and return the new session token
async fn finish_login(
    req: &HttpRequest,
    state: &AppState,
    provider: String,
    query: OAuthCallbackQuery,
) -> Result<String> {
    if let Some(reason) = query.error.as_deref() {
        warn!(provider = %provider, reason = %reason, "OAuth consent denied");
        return Err(AppError::ExternalLogin(
            "login was cancelled at the provider".to_string(),
        ));
    }

    let assertion = ExternalLoginAssertion {
        provider,
        expected_state: req
            .cookie(OAUTH_STATE_COOKIE)
            .map(|cookie| cookie.value().to_string()),
        state: query.state,
        code: query.code,
    };

    let session = state.linker.complete_external_login(assertion).await?;
    Ok(session.token)
}
