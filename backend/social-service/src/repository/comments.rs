use crate::domain::models::CommentView;
use chrono::Utc;
use sqlx::SqliteExecutor;

const COMMENT_VIEW_COLUMNS: &str = r#"
    c.id, c.post_id, c.user_id, u.username, u.avatar, c.content, c.created_at
    FROM comments c
    JOIN users u ON u.id = c.user_id
"#;

/// Append a comment, returning its id
pub async fn insert_comment<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
    post_id: i64,
    content: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO comments (user_id, post_id, content, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(post_id)
    .bind(content)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
}

pub async fn find_view<'e>(
    executor: impl SqliteExecutor<'e>,
    comment_id: i64,
) -> Result<CommentView, sqlx::Error> {
    let sql = format!("SELECT {COMMENT_VIEW_COLUMNS} WHERE c.id = ?");
    sqlx::query_as::<_, CommentView>(&sql)
        .bind(comment_id)
        .fetch_one(executor)
        .await
}

/// Comments on a post, oldest first
pub async fn list_for_post<'e>(
    executor: impl SqliteExecutor<'e>,
    post_id: i64,
) -> Result<Vec<CommentView>, sqlx::Error> {
    let sql = format!("SELECT {COMMENT_VIEW_COLUMNS} WHERE c.post_id = ? ORDER BY c.created_at ASC, c.id ASC");
    sqlx::query_as::<_, CommentView>(&sql)
        .bind(post_id)
        .fetch_all(executor)
        .await
}

/// Remove every comment on a post (cascade on post delete)
pub async fn delete_for_post<'e>(
    executor: impl SqliteExecutor<'e>,
    post_id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE post_id = ?")
        .bind(post_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
