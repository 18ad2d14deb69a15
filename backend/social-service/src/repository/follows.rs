use chrono::Utc;
use sqlx::SqliteExecutor;

/// Idempotent create follow; returns true if a new row was inserted.
pub async fn insert_follow<'e>(
    executor: impl SqliteExecutor<'e>,
    follower_id: i64,
    followee_id: i64,
) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO follows (follower_id, following_id, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT (follower_id, following_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(follower_id)
    .bind(followee_id)
    .bind(Utc::now())
    .fetch_optional(executor)
    .await?;

    Ok(inserted.is_some())
}

/// Idempotent delete; returns true if a row was removed.
pub async fn delete_follow<'e>(
    executor: impl SqliteExecutor<'e>,
    follower_id: i64,
    followee_id: i64,
) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND following_id = ?")
        .bind(follower_id)
        .bind(followee_id)
        .execute(executor)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

pub async fn is_following<'e>(
    executor: impl SqliteExecutor<'e>,
    follower_id: i64,
    followee_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ? AND following_id = ?)",
    )
    .bind(follower_id)
    .bind(followee_id)
    .fetch_one(executor)
    .await
}

pub async fn user_exists<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
        .bind(user_id)
        .fetch_one(executor)
        .await
}
