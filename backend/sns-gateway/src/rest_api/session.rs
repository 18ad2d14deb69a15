//! Session and flow cookies

use actix_middleware::SESSION_COOKIE;
use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::http::header;
use actix_web::HttpResponse;

/// Anti-forgery state of an in-flight OAuth login
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// Session cookie lifetime, matching the token expiry
pub const SESSION_MAX_AGE_SECS: i64 = 86_400;

fn base_cookie(name: &'static str, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::seconds(max_age_secs))
        .finish()
}

pub fn session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    base_cookie(SESSION_COOKIE, token.to_string(), SESSION_MAX_AGE_SECS, secure)
}

pub fn oauth_state_cookie(state: &str, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    base_cookie(OAUTH_STATE_COOKIE, state.to_string(), max_age_secs, secure)
}

/// Cookie that tells the browser to drop `name`
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "").path("/").http_only(true).finish();
    cookie.make_removal();
    cookie
}

/// 303 to `location`
pub fn see_other(location: &str) -> actix_web::HttpResponseBuilder {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, location.to_string()));
    builder
}

/// 303 home with a fresh session cookie
pub fn start_session(token: &str, secure: bool) -> HttpResponse {
    see_other("/").cookie(session_cookie(token, secure)).finish()
}
