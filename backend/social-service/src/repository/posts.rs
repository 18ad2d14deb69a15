use crate::domain::models::Post;
use chrono::Utc;
use sqlx::SqliteExecutor;

pub async fn insert_post<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
    content: &str,
    image_url: Option<&str>,
) -> Result<Post, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (user_id, content, image_url, likes, comments, created_at, updated_at)
        VALUES (?, ?, ?, 0, 0, ?, ?)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(content)
    .bind(image_url)
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e>(
    executor: impl SqliteExecutor<'e>,
    post_id: i64,
) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
        .bind(post_id)
        .fetch_optional(executor)
        .await
}

pub async fn owner_of<'e>(
    executor: impl SqliteExecutor<'e>,
    post_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT user_id FROM posts WHERE id = ?")
        .bind(post_id)
        .fetch_optional(executor)
        .await
}

/// Delete a post only if `user_id` owns it; true when a row went away
pub async fn delete_owned<'e>(
    executor: impl SqliteExecutor<'e>,
    post_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ? AND user_id = ?")
        .bind(post_id)
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Bump the like counter; false when the post does not exist
pub async fn increment_likes<'e>(
    executor: impl SqliteExecutor<'e>,
    post_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE posts SET likes = likes + 1 WHERE id = ?")
        .bind(post_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Lower the like counter, never below zero
pub async fn decrement_likes<'e>(
    executor: impl SqliteExecutor<'e>,
    post_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE posts SET likes = MAX(likes - 1, 0) WHERE id = ?")
        .bind(post_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn like_count<'e>(
    executor: impl SqliteExecutor<'e>,
    post_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT likes FROM posts WHERE id = ?")
        .bind(post_id)
        .fetch_one(executor)
        .await
}

/// Bump the comment counter; false when the post does not exist
pub async fn increment_comments<'e>(
    executor: impl SqliteExecutor<'e>,
    post_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE posts SET comments = comments + 1 WHERE id = ?")
        .bind(post_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
