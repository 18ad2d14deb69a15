//! Timeline queries
//!
//! All three share the projection below; only the source set differs.

use crate::models::FeedPost;
use sqlx::SqlitePool;

const FEED_COLUMNS: &str = r#"
    p.id, p.user_id, p.content, p.image_url, p.likes, p.comments,
    p.created_at, p.updated_at,
    u.username AS username, u.avatar AS avatar,
    EXISTS (
        SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = ?
    ) AS liked
"#;

/// Posts by `user_id` and by every account `user_id` follows
pub async fn timeline(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<FeedPost>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {FEED_COLUMNS}
        FROM posts p
        JOIN users u ON u.id = p.user_id
        WHERE p.user_id = ?
           OR p.user_id IN (SELECT following_id FROM follows WHERE follower_id = ?)
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT ? OFFSET ?
        "#
    );

    sqlx::query_as::<_, FeedPost>(&sql)
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Most recent posts regardless of the follow graph
pub async fn public_timeline(pool: &SqlitePool, limit: i64) -> Result<Vec<FeedPost>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {FEED_COLUMNS}
        FROM posts p
        JOIN users u ON u.id = p.user_id
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT ?
        "#
    );

    // No viewer: the liked subquery matches nothing
    sqlx::query_as::<_, FeedPost>(&sql)
        .bind(None::<i64>)
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// Posts authored by one user
pub async fn user_posts(
    pool: &SqlitePool,
    author_id: i64,
    viewer_id: Option<i64>,
    limit: i64,
) -> Result<Vec<FeedPost>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {FEED_COLUMNS}
        FROM posts p
        JOIN users u ON u.id = p.user_id
        WHERE p.user_id = ?
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT ?
        "#
    );

    sqlx::query_as::<_, FeedPost>(&sql)
        .bind(viewer_id)
        .bind(author_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}
