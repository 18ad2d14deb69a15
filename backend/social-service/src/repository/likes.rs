use chrono::Utc;
use sqlx::SqliteExecutor;

/// Insert a like edge if absent; true when this call created it
pub async fn insert_like<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
    post_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO likes (user_id, post_id, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT (user_id, post_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(post_id)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Delete a like edge if present; true when this call removed it
pub async fn delete_like<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
    post_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM likes WHERE user_id = ? AND post_id = ?")
        .bind(user_id)
        .bind(post_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Check if user has liked a post
pub async fn has_liked<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
    post_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = ? AND post_id = ?)",
    )
    .bind(user_id)
    .bind(post_id)
    .fetch_one(executor)
    .await
}

/// Remove every like on a post (cascade on post delete)
pub async fn delete_for_post<'e>(
    executor: impl SqliteExecutor<'e>,
    post_id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM likes WHERE post_id = ?")
        .bind(post_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
