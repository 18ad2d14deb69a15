use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, StatusCode},
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError,
};
use crypto_core::TokenService;
use futures::future::{ready, Ready};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "token";

const LOGIN_PATH: &str = "/login";

/// Identity resolved from a valid session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
}

/// Read the raw session token, cookie first, then `Authorization: Bearer`
pub fn extract_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Session resolution middleware
///
/// Validates the token once per request and stores the resulting
/// [`AuthenticatedUser`] in the request extensions. Requests without a valid
/// token pass through untouched; handlers decide whether identity is required
/// by extracting `AuthenticatedUser` or `OptionalUser`.
pub struct JwtAuthMiddleware {
    tokens: TokenService,
}

impl JwtAuthMiddleware {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    tokens: TokenService,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        if let Some(token) = extract_token(req.request()) {
            match self.tokens.validate(&token) {
                Ok(claims) => {
                    req.extensions_mut().insert(AuthenticatedUser {
                        user_id: claims.user_id,
                        username: claims.username,
                    });
                }
                Err(e) => {
                    tracing::debug!(path = %req.path(), error = %e, "ignoring invalid session token");
                }
            }
        }

        Box::pin(async move { service.call(req).await })
    }
}

/// Rejection for handlers that need an authenticated user
///
/// Page routes redirect to the login view; `/api` routes answer 401 JSON.
#[derive(Debug, thiserror::Error)]
#[error("authentication required")]
pub struct AuthenticationRequired {
    api: bool,
}

impl AuthenticationRequired {
    pub fn for_request(req: &HttpRequest) -> Self {
        Self {
            api: req.path().starts_with("/api/"),
        }
    }
}

impl ResponseError for AuthenticationRequired {
    fn status_code(&self) -> StatusCode {
        if self.api {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::SEE_OTHER
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.api {
            HttpResponse::Unauthorized().json(json!({
                "success": false,
                "error": "authentication_required",
                "message": "authentication required",
            }))
        } else {
            HttpResponse::SeeOther()
                .insert_header((header::LOCATION, LOGIN_PATH))
                .finish()
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AuthenticationRequired;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AuthenticationRequired::for_request(req))),
        }
    }
}

/// Identity when present, for routes that also serve anonymous viewers
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl FromRequest for OptionalUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalUser(
            req.extensions().get::<AuthenticatedUser>().cloned(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{cookie::Cookie, test, web, App};
    use crypto_core::JwtConfig;

    fn tokens() -> TokenService {
        TokenService::new(JwtConfig::new("middleware-test-secret")).unwrap()
    }

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(format!("{}:{}", user.user_id, user.username))
    }

    async fn maybe(user: OptionalUser) -> HttpResponse {
        match user.0 {
            Some(u) => HttpResponse::Ok().body(u.username),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    #[::core::prelude::v1::test]
    fn test_cookie_checked_before_header() {
        let req = test::TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "from-cookie"))
            .insert_header((header::AUTHORIZATION, "Bearer from-header"))
            .to_http_request();

        assert_eq!(extract_token(&req).as_deref(), Some("from-cookie"));
    }

    #[::core::prelude::v1::test]
    fn test_bearer_header_fallback() {
        let req = test::TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(extract_token(&req).as_deref(), Some("abc.def.ghi"));

        let req = test::TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert_eq!(extract_token(&req), None);
    }

    #[actix_web::test]
    async fn test_valid_token_resolves_user() {
        let tokens = tokens();
        let token = tokens.issue(11, "alice").unwrap();
        let app = test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(tokens))
                .route("/api/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "11:alice");
    }

    #[actix_web::test]
    async fn test_missing_token_on_page_redirects_to_login() {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(tokens()))
                .route("/posts", web::get().to(whoami)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/posts").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
    }

    #[actix_web::test]
    async fn test_invalid_token_on_api_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(tokens()))
                .route("/api/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/me")
            .cookie(Cookie::new(SESSION_COOKIE, "not-a-token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_optional_user_allows_anonymous() {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(tokens()))
                .route("/", web::get().to(maybe)),
        )
        .await;

        let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(body, "anonymous");
    }
}
