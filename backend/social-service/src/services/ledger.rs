use crate::domain::models::{
    CommentView, FollowToggle, LikeToggle, NewPost, Post, ToggleState, MAX_COMMENT_LENGTH,
    MAX_POST_LENGTH,
};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{comments, follows, likes, posts};
use db_pool::Database;
use tracing::{debug, info};

/// Outcome of a delete attempt, decided inside the transaction
enum DeleteOutcome {
    Deleted,
    NotOwner,
    Missing,
}

/// Like/follow edges, comments and posts with their denormalized counters
///
/// Toggles delete first and insert second inside one transaction. The
/// rows-affected count of each statement decides the resulting state, so two
/// racing toggles on the same pair can never both insert or both decrement.
#[derive(Clone)]
pub struct InteractionLedger {
    db: Database,
}

impl InteractionLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create_post(&self, author_id: i64, new_post: NewPost) -> ServiceResult<Post> {
        let content = new_post.content.trim();
        check_length("post", content, MAX_POST_LENGTH)?;
        let image_url = new_post
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty());

        let post = self
            .db
            .run(posts::insert_post(self.db.pool(), author_id, content, image_url))
            .await?;

        info!(post_id = post.id, user_id = author_id, "Post created");
        Ok(post)
    }

    pub async fn get_post(&self, post_id: i64) -> ServiceResult<Post> {
        self.db
            .run(posts::find_by_id(self.db.pool(), post_id))
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("post {post_id}")))
    }

    /// Flip the like edge (user, post) and report the resulting state
    pub async fn toggle_like(&self, user_id: i64, post_id: i64) -> ServiceResult<LikeToggle> {
        let pool = self.db.pool();
        let outcome = self
            .db
            .run(async move {
                let mut tx = pool.begin().await?;

                if likes::delete_like(&mut *tx, user_id, post_id).await? {
                    posts::decrement_likes(&mut *tx, post_id).await?;
                    let count = posts::like_count(&mut *tx, post_id).await?;
                    tx.commit().await?;
                    return Ok(Some(LikeToggle {
                        state: ToggleState::Off,
                        likes: count,
                    }));
                }

                if !posts::increment_likes(&mut *tx, post_id).await? {
                    // Unknown post; dropping tx rolls back
                    return Ok(None);
                }

                if !likes::insert_like(&mut *tx, user_id, post_id).await? {
                    // Someone already toggled it on; keep their count
                    tx.rollback().await?;
                    let count = posts::like_count(pool, post_id).await?;
                    return Ok(Some(LikeToggle {
                        state: ToggleState::On,
                        likes: count,
                    }));
                }

                let count = posts::like_count(&mut *tx, post_id).await?;
                tx.commit().await?;
                Ok::<_, sqlx::Error>(Some(LikeToggle {
                    state: ToggleState::On,
                    likes: count,
                }))
            })
            .await?;

        let toggle = outcome.ok_or_else(|| ServiceError::NotFound(format!("post {post_id}")))?;
        debug!(user_id, post_id, state = ?toggle.state, likes = toggle.likes, "like toggled");
        Ok(toggle)
    }

    /// Flip the follow edge (follower, followee)
    pub async fn toggle_follow(
        &self,
        follower_id: i64,
        followee_id: i64,
    ) -> ServiceResult<FollowToggle> {
        if follower_id == followee_id {
            return Err(ServiceError::SelfReferenceNotAllowed);
        }

        let pool = self.db.pool();
        let outcome = self
            .db
            .run(async move {
                let mut tx = pool.begin().await?;

                if follows::delete_follow(&mut *tx, follower_id, followee_id).await? {
                    tx.commit().await?;
                    return Ok(Some(ToggleState::Off));
                }

                if !follows::user_exists(&mut *tx, followee_id).await? {
                    return Ok(None);
                }

                // A false here means a concurrent toggle inserted first; either
                // way the edge now exists.
                follows::insert_follow(&mut *tx, follower_id, followee_id).await?;
                tx.commit().await?;
                Ok::<_, sqlx::Error>(Some(ToggleState::On))
            })
            .await?;

        let state =
            outcome.ok_or_else(|| ServiceError::NotFound(format!("user {followee_id}")))?;
        info!(follower_id, followee_id, state = ?state, "follow toggled");
        Ok(FollowToggle { state })
    }

    pub async fn is_following(&self, follower_id: i64, followee_id: i64) -> ServiceResult<bool> {
        Ok(self
            .db
            .run(follows::is_following(self.db.pool(), follower_id, followee_id))
            .await?)
    }

    pub async fn has_liked(&self, user_id: i64, post_id: i64) -> ServiceResult<bool> {
        Ok(self
            .db
            .run(likes::has_liked(self.db.pool(), user_id, post_id))
            .await?)
    }

    /// Append a comment and bump the post's comment counter atomically
    pub async fn add_comment(
        &self,
        user_id: i64,
        post_id: i64,
        content: &str,
    ) -> ServiceResult<CommentView> {
        let content = content.trim();
        check_length("comment", content, MAX_COMMENT_LENGTH)?;

        let pool = self.db.pool();
        let comment = self
            .db
            .run(async move {
                let mut tx = pool.begin().await?;

                if !posts::increment_comments(&mut *tx, post_id).await? {
                    return Ok(None);
                }

                let comment_id = comments::insert_comment(&mut *tx, user_id, post_id, content).await?;
                let view = comments::find_view(&mut *tx, comment_id).await?;
                tx.commit().await?;
                Ok::<_, sqlx::Error>(Some(view))
            })
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("post {post_id}")))?;

        info!(comment_id = comment.id, post_id, user_id, "Comment created");
        Ok(comment)
    }

    /// Comments on a post, oldest first
    pub async fn list_comments(&self, post_id: i64) -> ServiceResult<Vec<CommentView>> {
        // Surfaces NotFound for unknown posts instead of an empty list
        self.get_post(post_id).await?;

        Ok(self
            .db
            .run(comments::list_for_post(self.db.pool(), post_id))
            .await?)
    }

    /// Delete a post owned by `requester_id` together with its likes and comments
    pub async fn delete_post(&self, post_id: i64, requester_id: i64) -> ServiceResult<()> {
        let pool = self.db.pool();
        let outcome = self
            .db
            .run(async move {
                let mut tx = pool.begin().await?;

                if !posts::delete_owned(&mut *tx, post_id, requester_id).await? {
                    let owner = posts::owner_of(&mut *tx, post_id).await?;
                    tx.rollback().await?;
                    return Ok(match owner {
                        Some(_) => DeleteOutcome::NotOwner,
                        None => DeleteOutcome::Missing,
                    });
                }

                // Children normally go with the FK cascade; clear them explicitly
                // so a connection without foreign_keys leaves no orphans.
                likes::delete_for_post(&mut *tx, post_id).await?;
                comments::delete_for_post(&mut *tx, post_id).await?;
                tx.commit().await?;
                Ok::<_, sqlx::Error>(DeleteOutcome::Deleted)
            })
            .await?;

        match outcome {
            DeleteOutcome::Deleted => {
                info!(post_id, user_id = requester_id, "Post deleted");
                Ok(())
            }
            DeleteOutcome::NotOwner => {
                info!(post_id, user_id = requester_id, "Rejected delete of foreign post");
                Err(ServiceError::Unauthorized)
            }
            DeleteOutcome::Missing => Err(ServiceError::NotFound(format!("post {post_id}"))),
        }
    }
}

fn check_length(what: &str, content: &str, max: usize) -> ServiceResult<()> {
    if content.is_empty() {
        return Err(ServiceError::InvalidInput(format!("{what} content is required")));
    }
    if content.chars().count() > max {
        return Err(ServiceError::InvalidInput(format!(
            "{what} content exceeds {max} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_length() {
        assert!(check_length("post", "hello", 10).is_ok());
        assert!(matches!(
            check_length("post", "", 10),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(check_length("post", &"é".repeat(10), 10).is_ok());
        assert!(check_length("post", &"é".repeat(11), 10).is_err());
    }
}
