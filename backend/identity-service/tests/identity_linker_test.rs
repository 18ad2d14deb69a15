//! IdentityLinker flow tests against an in-memory store and a scripted provider

use async_trait::async_trait;
use crypto_core::{JwtConfig, TokenService};
use db_pool::{Database, DbConfig};
use identity_service::{
    ExternalLoginAssertion, ExternalProfile, IdentityError, IdentityLinker, IdentityProvider,
    ProviderCredential,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Provider double: returns a fixed profile, or fails at a chosen step
struct ScriptedProvider {
    profile: ExternalProfile,
    fail_exchange: bool,
    fail_profile: bool,
    exchanges: AtomicUsize,
}

impl ScriptedProvider {
    fn new(external_id: &str, email: &str) -> Self {
        Self {
            profile: ExternalProfile {
                external_id: external_id.to_string(),
                email: email.to_string(),
                display_name: Some("Test User".to_string()),
                picture: Some("https://img.example.com/a.png".to_string()),
            },
            fail_exchange: false,
            fail_profile: false,
            exchanges: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn authorization_url(&self, state: &str) -> String {
        format!("https://provider.example.com/consent?state={state}")
    }

    async fn exchange_code(&self, code: &str) -> identity_service::Result<ProviderCredential> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if self.fail_exchange {
            return Err(IdentityError::ExchangeError("invalid_grant".into()));
        }
        Ok(ProviderCredential {
            access_token: format!("access-{code}"),
        })
    }

    async fn fetch_profile(
        &self,
        _credential: &ProviderCredential,
    ) -> identity_service::Result<ExternalProfile> {
        if self.fail_profile {
            return Err(IdentityError::ProviderError("userinfo decode failed".into()));
        }
        Ok(self.profile.clone())
    }
}

struct Harness {
    db: Database,
    tokens: TokenService,
}

impl Harness {
    async fn new() -> Self {
        let db = Database::connect(&DbConfig::in_memory("linker-test"))
            .await
            .expect("in-memory database");
        let tokens = TokenService::new(JwtConfig::new("linker-test-secret")).unwrap();
        Self { db, tokens }
    }

    fn linker(&self, provider: Arc<ScriptedProvider>) -> IdentityLinker {
        IdentityLinker::new(self.db.clone(), self.tokens.clone()).with_provider(provider)
    }

    async fn user_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.db.pool())
            .await
            .unwrap()
    }

    async fn insert_user(&self, username: &str, email: &str, external_id: Option<&str>) -> i64 {
        let now = chrono::Utc::now();
        sqlx::query_scalar(
            "INSERT INTO users (username, email, external_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(username)
        .bind(email)
        .bind(external_id)
        .bind(now)
        .bind(now)
        .fetch_one(self.db.pool())
        .await
        .unwrap()
    }
}

fn assertion(state: &str, expected: Option<&str>) -> ExternalLoginAssertion {
    ExternalLoginAssertion {
        provider: "scripted".to_string(),
        expected_state: expected.map(str::to_string),
        state: state.to_string(),
        code: "auth-code".to_string(),
    }
}

#[tokio::test]
async fn test_new_account_from_email_local_part() {
    let harness = Harness::new().await;
    let linker = harness.linker(Arc::new(ScriptedProvider::new("ext-1", "alice@example.com")));

    let session = linker
        .complete_external_login(assertion("s1", Some("s1")))
        .await
        .expect("login should succeed");

    assert!(session.is_new_user);
    assert_eq!(session.user.username, "alice");
    assert!(session.user.verified);
    assert_eq!(session.user.avatar, "https://img.example.com/a.png");
    assert_eq!(harness.user_count().await, 1);

    let claims = harness.tokens.validate(&session.token).unwrap();
    assert_eq!(claims.user_id, session.user.id);
    assert_eq!(claims.username, "alice");
}

#[tokio::test]
async fn test_second_login_resolves_same_user() {
    let harness = Harness::new().await;
    let linker = harness.linker(Arc::new(ScriptedProvider::new("ext-1", "alice@example.com")));

    let first = linker
        .complete_external_login(assertion("s1", Some("s1")))
        .await
        .unwrap();
    let second = linker
        .complete_external_login(assertion("s2", Some("s2")))
        .await
        .unwrap();

    assert!(!second.is_new_user);
    assert_eq!(first.user.id, second.user.id);
    assert_eq!(harness.user_count().await, 1);
}

#[tokio::test]
async fn test_existing_password_account_is_linked_by_email() {
    let harness = Harness::new().await;
    let existing = harness.insert_user("alice_pw", "alice@example.com", None).await;
    let linker = harness.linker(Arc::new(ScriptedProvider::new("ext-9", "alice@example.com")));

    let session = linker
        .complete_external_login(assertion("s", Some("s")))
        .await
        .unwrap();

    assert!(!session.is_new_user);
    assert_eq!(session.user.id, existing);
    assert_eq!(session.user.username, "alice_pw");
    assert_eq!(session.user.external_id.as_deref(), Some("ext-9"));
    assert_eq!(harness.user_count().await, 1);
}

#[tokio::test]
async fn test_external_id_match_wins_over_changed_email() {
    let harness = Harness::new().await;
    let existing = harness
        .insert_user("alice", "old@example.com", Some("ext-1"))
        .await;
    let linker = harness.linker(Arc::new(ScriptedProvider::new("ext-1", "new@example.com")));

    let session = linker
        .complete_external_login(assertion("s", Some("s")))
        .await
        .unwrap();

    assert_eq!(session.user.id, existing);
    assert_eq!(harness.user_count().await, 1);
}

#[tokio::test]
async fn test_username_collision_gets_suffix() {
    let harness = Harness::new().await;
    harness.insert_user("alice", "alice@other.org", Some("ext-other")).await;
    let linker = harness.linker(Arc::new(ScriptedProvider::new("ext-2", "alice@example.com")));

    let session = linker
        .complete_external_login(assertion("s", Some("s")))
        .await
        .unwrap();

    assert!(session.is_new_user);
    let name = &session.user.username;
    assert!(name.starts_with("alice_"), "unexpected username {name}");
    assert_eq!(name.len(), "alice_".len() + 6);
    assert_eq!(harness.user_count().await, 2);
}

#[tokio::test]
async fn test_state_mismatch_aborts_before_exchange() {
    let harness = Harness::new().await;
    let provider = Arc::new(ScriptedProvider::new("ext-1", "alice@example.com"));
    let linker = harness.linker(provider.clone());

    let wrong = linker
        .complete_external_login(assertion("forged", Some("issued")))
        .await;
    let missing = linker.complete_external_login(assertion("s", None)).await;

    assert!(matches!(wrong, Err(IdentityError::StateMismatch)));
    assert!(matches!(missing, Err(IdentityError::StateMismatch)));
    assert_eq!(provider.exchanges.load(Ordering::SeqCst), 0);
    assert_eq!(harness.user_count().await, 0);
}

#[tokio::test]
async fn test_exchange_failure_creates_nothing() {
    let harness = Harness::new().await;
    let mut provider = ScriptedProvider::new("ext-1", "alice@example.com");
    provider.fail_exchange = true;
    let linker = harness.linker(Arc::new(provider));

    let result = linker.complete_external_login(assertion("s", Some("s"))).await;

    assert!(matches!(result, Err(IdentityError::ExchangeError(_))));
    assert_eq!(harness.user_count().await, 0);
}

#[tokio::test]
async fn test_provider_failure_creates_nothing() {
    let harness = Harness::new().await;
    let mut provider = ScriptedProvider::new("ext-1", "alice@example.com");
    provider.fail_profile = true;
    let linker = harness.linker(Arc::new(provider));

    let result = linker.complete_external_login(assertion("s", Some("s"))).await;

    assert!(matches!(result, Err(IdentityError::ProviderError(_))));
    assert_eq!(harness.user_count().await, 0);
}

#[tokio::test]
async fn test_start_flow_issues_fresh_state() {
    let harness = Harness::new().await;
    let linker = harness.linker(Arc::new(ScriptedProvider::new("ext-1", "alice@example.com")));

    let first = linker.start_flow("scripted").unwrap();
    let second = linker.start_flow("scripted").unwrap();

    assert_ne!(first.state, second.state);
    assert!(first.url.ends_with(&first.state));
    assert!(matches!(
        linker.start_flow("myspace"),
        Err(IdentityError::UnknownProvider(_))
    ));
    assert!(linker.has_provider("scripted"));
    assert_eq!(linker.provider_names(), vec!["scripted"]);
}
