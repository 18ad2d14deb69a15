/// User database operations for identity-service
///
/// Free functions over a borrowed pool; callers bound them with
/// `Database::run`. Posts and follow edges are read here only as counts for
/// profile views; the social ledger owns their writes.
use crate::models::{NewUser, User, UserSummary};
use chrono::Utc;
use sqlx::SqlitePool;

/// Find user by id
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Find user by email
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Find user by username
pub async fn find_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Resolve a third-party identity: external id match first, then email
pub async fn find_by_external_id_or_email(
    pool: &SqlitePool,
    external_id: &str,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT * FROM users
        WHERE external_id = ?1 OR (?2 <> '' AND email = ?2)
        ORDER BY CASE WHEN external_id = ?1 THEN 0 ELSE 1 END, id
        LIMIT 1
        "#,
    )
    .bind(external_id)
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Insert a user row
///
/// Unique violations on `users.username`, `users.email` or `users.external_id`
/// surface as database errors for the caller to classify.
pub async fn create_user(pool: &SqlitePool, new_user: &NewUser) -> Result<User, sqlx::Error> {
    let now = Utc::now();

    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash, external_id, avatar, bio, verified, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, '', ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(&new_user.external_id)
    .bind(&new_user.avatar)
    .bind(new_user.verified)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// Attach an external identity to an account that has none yet
///
/// Returns the updated row, or `None` when the account already carries an
/// external id (the existing link is left untouched).
pub async fn link_external_id(
    pool: &SqlitePool,
    user_id: i64,
    external_id: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET external_id = ?, verified = 1, updated_at = ?
        WHERE id = ? AND external_id IS NULL
        RETURNING *
        "#,
    )
    .bind(external_id)
    .bind(Utc::now())
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Update bio and/or avatar; absent fields keep their stored value
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: i64,
    bio: Option<&str>,
    avatar: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET bio = COALESCE(?, bio), avatar = COALESCE(?, avatar), updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(bio)
    .bind(avatar)
    .bind(Utc::now())
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Users that `user_id` does not follow yet, newest accounts first
pub async fn suggested_users(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
) -> Result<Vec<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT id, username, avatar, bio, created_at FROM users
        WHERE id <> ?1
          AND id NOT IN (SELECT following_id FROM follows WHERE follower_id = ?1)
        ORDER BY created_at DESC, id DESC
        LIMIT ?2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Post, follower and following counts for a profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct ProfileCounts {
    pub post_count: i64,
    pub follower_count: i64,
    pub following_count: i64,
}

pub async fn profile_counts(pool: &SqlitePool, user_id: i64) -> Result<ProfileCounts, sqlx::Error> {
    sqlx::query_as::<_, ProfileCounts>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM posts WHERE user_id = ?1) AS post_count,
            (SELECT COUNT(*) FROM follows WHERE following_id = ?1) AS follower_count,
            (SELECT COUNT(*) FROM follows WHERE follower_id = ?1) AS following_count
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn is_following(
    pool: &SqlitePool,
    follower_id: i64,
    following_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ? AND following_id = ?)",
    )
    .bind(follower_id)
    .bind(following_id)
    .fetch_one(pool)
    .await
}
