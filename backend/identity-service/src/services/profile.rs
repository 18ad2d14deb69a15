/// Profile reads and the owner's own profile edits
use crate::db::users;
use crate::error::{IdentityError, Result};
use crate::models::{ProfileView, UpdateProfileRequest, User, UserSummary};
use db_pool::Database;
use tracing::info;
use validator::Validate;

#[derive(Clone)]
pub struct ProfileService {
    db: Database,
}

impl ProfileService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, user_id: i64) -> Result<User> {
        self.db
            .run(users::find_by_id(self.db.pool(), user_id))
            .await?
            .ok_or(IdentityError::UserNotFound)
    }

    /// Profile page for `username` as seen by `viewer`
    pub async fn profile(&self, username: &str, viewer: Option<i64>) -> Result<ProfileView> {
        let user = self
            .db
            .run(users::find_by_username(self.db.pool(), username))
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        let counts = self
            .db
            .run(users::profile_counts(self.db.pool(), user.id))
            .await?;

        let is_following = match viewer {
            Some(viewer_id) if viewer_id != user.id => {
                self.db
                    .run(users::is_following(self.db.pool(), viewer_id, user.id))
                    .await?
            }
            _ => false,
        };

        Ok(ProfileView {
            user: user.summary(),
            post_count: counts.post_count,
            follower_count: counts.follower_count,
            following_count: counts.following_count,
            is_following,
            is_self: viewer == Some(user.id),
        })
    }

    /// Change bio and/or avatar; absent fields are left as they are
    pub async fn update_profile(&self, user_id: i64, request: UpdateProfileRequest) -> Result<User> {
        request.validate()?;

        let bio = request.bio.as_deref().map(str::trim);
        let avatar = request
            .avatar
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty());

        let user = self
            .db
            .run(users::update_profile(self.db.pool(), user_id, bio, avatar))
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        info!(user_id, "Profile updated");
        Ok(user)
    }

    /// Accounts `user_id` might want to follow
    pub async fn suggested_users(&self, user_id: i64, limit: i64) -> Result<Vec<UserSummary>> {
        Ok(self
            .db
            .run(users::suggested_users(self.db.pool(), user_id, limit.clamp(1, 50)))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db_pool::DbConfig;

    async fn seeded() -> (ProfileService, Vec<i64>) {
        let db = Database::connect(&DbConfig::in_memory("profile-test"))
            .await
            .unwrap();
        let mut ids = Vec::new();
        for (i, name) in ["alice", "bob", "carol"].iter().enumerate() {
            let created = chrono::Utc::now() + chrono::Duration::seconds(i as i64);
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO users (username, email, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING id",
            )
            .bind(name)
            .bind(format!("{name}@example.com"))
            .bind(created)
            .bind(created)
            .fetch_one(db.pool())
            .await
            .unwrap();
            ids.push(id);
        }
        (ProfileService::new(db), ids)
    }

    async fn follow(service: &ProfileService, follower: i64, following: i64) {
        sqlx::query("INSERT INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)")
            .bind(follower)
            .bind(following)
            .bind(chrono::Utc::now())
            .execute(service.db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_profile_counts_and_follow_flag() {
        let (service, ids) = seeded().await;
        let (alice, bob, carol) = (ids[0], ids[1], ids[2]);
        follow(&service, bob, alice).await;
        follow(&service, carol, alice).await;
        follow(&service, alice, bob).await;

        let view = service.profile("alice", Some(bob)).await.unwrap();
        assert_eq!(view.follower_count, 2);
        assert_eq!(view.following_count, 1);
        assert_eq!(view.post_count, 0);
        assert!(view.is_following);
        assert!(!view.is_self);

        let own = service.profile("alice", Some(alice)).await.unwrap();
        assert!(own.is_self);
        assert!(!own.is_following);

        let anonymous = service.profile("alice", None).await.unwrap();
        assert!(!anonymous.is_following);
    }

    #[tokio::test]
    async fn test_profile_unknown_user() {
        let (service, _) = seeded().await;
        assert!(matches!(
            service.profile("nobody", None).await,
            Err(IdentityError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_profile_keeps_absent_fields() {
        let (service, ids) = seeded().await;
        let updated = service
            .update_profile(
                ids[0],
                UpdateProfileRequest {
                    bio: Some("  hello there ".into()),
                    avatar: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.bio, "hello there");
        assert_eq!(updated.avatar, crate::models::DEFAULT_AVATAR);

        let too_long = UpdateProfileRequest {
            bio: Some("x".repeat(501)),
            avatar: None,
        };
        assert!(matches!(
            service.update_profile(ids[0], too_long).await,
            Err(IdentityError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_suggested_users_excludes_self_and_followed() {
        let (service, ids) = seeded().await;
        let (alice, bob, carol) = (ids[0], ids[1], ids[2]);
        follow(&service, alice, bob).await;

        let suggested = service.suggested_users(alice, 5).await.unwrap();
        let suggested_ids: Vec<i64> = suggested.iter().map(|u| u.id).collect();
        assert_eq!(suggested_ids, vec![carol]);

        let for_carol = service.suggested_users(carol, 5).await.unwrap();
        let names: Vec<&str> = for_carol.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["bob", "alice"]);
    }
}
