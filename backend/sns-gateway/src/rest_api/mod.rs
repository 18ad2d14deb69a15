/// HTTP routes of the SNS gateway
///
/// Page-style routes (`/`, `/register`, `/login`, `/auth/...`, `/profile/...`,
/// `/posts`) answer with redirects or JSON views; `/api/*` routes answer JSON
/// and respond 401 instead of redirecting when no session is present.
pub mod auth;
pub mod feed;
pub mod health;
pub mod models;
pub mod oauth;
pub mod posts;
pub mod session;
pub mod social;
pub mod users;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Pages
        .service(feed::home)
        .service(auth::register_page)
        .service(auth::register)
        .service(auth::login_page)
        .service(auth::login)
        .service(auth::logout)
        .service(oauth::start)
        .service(oauth::callback)
        .service(users::own_profile)
        .service(users::profile)
        .service(users::update_profile)
        .service(posts::create_post)
        // JSON API
        .service(feed::public_timeline)
        .service(feed::timeline)
        .service(posts::toggle_like)
        .service(posts::list_comments)
        .service(posts::add_comment)
        .service(posts::delete_post)
        .service(social::toggle_follow)
        .service(social::suggested_users)
        // Operations
        .service(health::health)
        .service(health::metrics);
}
