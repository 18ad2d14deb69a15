//! Database connection pool management
//!
//! Provides SQLite pool creation, schema migrations and the [`Database`] handle
//! through which every service issues bounded store calls.

mod error;
mod metrics;

pub use error::StoreError;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Database connection pool configuration
#[derive(Clone)]
pub struct DbConfig {
    /// Service name for metrics labeling
    pub service_name: String,
    /// SQLite connection URL (`sqlite://path/to/db.sqlite` or `sqlite::memory:`)
    pub database_url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection acquisition timeout (get connection from pool)
    pub acquire_timeout_secs: u64,
    /// Connection idle timeout
    pub idle_timeout_secs: u64,
    /// Connection maximum lifetime
    pub max_lifetime_secs: u64,
    /// Upper bound on a single store call, transaction included
    pub query_timeout_ms: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("service_name", &self.service_name)
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .field("query_timeout_ms", &self.query_timeout_ms)
            .finish()
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("unknown"),
            database_url: String::from("sqlite://sns.db"),
            max_connections: 8,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            query_timeout_ms: 5_000,
        }
    }
}

impl DbConfig {
    /// Create a new DbConfig from environment variables
    pub fn from_env(service_name: &str) -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable not set".to_string())?;
        let defaults = Self::default();

        Ok(Self {
            service_name: service_name.to_string(),
            database_url,
            max_connections: env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: env_or("DB_MIN_CONNECTIONS", defaults.min_connections),
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout_secs),
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs),
            max_lifetime_secs: env_or("DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs),
            query_timeout_ms: env_or("DB_QUERY_TIMEOUT_MS", defaults.query_timeout_ms),
        })
    }

    /// Single-connection in-memory database, for tests and local demos
    ///
    /// The connection is never reaped, otherwise the database would vanish.
    pub fn in_memory(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            database_url: IN_MEMORY_URL.to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// Log pool configuration details
    pub fn log_config(&self) {
        info!(
            "Database Pool Configuration: \
             max_connections={}, min_connections={}, \
             acquire_timeout={}s, idle_timeout={}s, max_lifetime={}s, query_timeout={}ms",
            self.max_connections,
            self.min_connections,
            self.acquire_timeout_secs,
            self.idle_timeout_secs,
            self.max_lifetime_secs,
            self.query_timeout_ms
        );
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Create a SQLite connection pool with automatic metrics monitoring
pub async fn create_pool(config: &DbConfig) -> Result<SqlitePool, sqlx::Error> {
    debug!(
        "Creating database pool: service={}, max={}, min={}, acquire_timeout={}s",
        config.service_name,
        config.max_connections,
        config.min_connections,
        config.acquire_timeout_secs
    );

    let mut connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));
    if !config.is_in_memory() {
        connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
    }

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));
    pool_options = if config.is_in_memory() {
        pool_options
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        pool_options
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
    };

    let pool = pool_options.connect_with(connect_options).await?;

    match tokio::time::timeout(
        Duration::from_secs(config.acquire_timeout_secs),
        sqlx::query("SELECT 1").execute(&pool),
    )
    .await
    {
        Ok(Ok(_)) => {
            info!(
                service = %config.service_name,
                "Database pool created and verified successfully"
            );
            metrics::update_pool_metrics(&pool, &config.service_name);

            {
                let pool_clone = pool.clone();
                let service = config.service_name.clone();
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(Duration::from_secs(30));
                    loop {
                        interval.tick().await;
                        if pool_clone.is_closed() {
                            break;
                        }
                        metrics::update_pool_metrics(&pool_clone, &service);
                    }
                });
            }

            Ok(pool)
        }
        Ok(Err(e)) => {
            error!(
                service = %config.service_name,
                error = %e,
                "Database connection verification failed"
            );
            Err(e)
        }
        Err(_) => {
            error!(
                service = %config.service_name,
                timeout_secs = config.acquire_timeout_secs,
                "Database connection verification timeout"
            );
            Err(sqlx::Error::PoolTimedOut)
        }
    }
}

/// Apply the schema migrations under `backend/migrations`
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Execute a fallible store future bounded by `duration`
///
/// Dropping a timed-out future drops any open transaction with it, which
/// rolls the transaction back.
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout(duration)),
    }
}

/// Shared handle to the relational store
///
/// Cloning is cheap. Every call made through [`Database::run`] is bounded by
/// the configured query timeout.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    query_timeout: Duration,
    service: Arc<str>,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("service", &self.service)
            .field("query_timeout", &self.query_timeout)
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

impl Database {
    pub fn new(pool: SqlitePool, query_timeout: Duration, service: &str) -> Self {
        Self {
            pool,
            query_timeout,
            service: Arc::from(service),
        }
    }

    /// Create the pool, apply migrations and wrap the result
    pub async fn connect(config: &DbConfig) -> Result<Self, StoreError> {
        config.log_config();
        let pool = create_pool(config).await?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool, config.query_timeout(), &config.service_name))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Run one logical store operation under the query timeout
    pub async fn run<F, T>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let started = Instant::now();
        let result = with_timeout(self.query_timeout, op).await;
        metrics::observe_call(&self.service, started.elapsed().as_secs_f64());

        if let Err(err) = &result {
            metrics::record_error(&self.service, err);
            match err {
                StoreError::Timeout(after) => {
                    warn!(service = %self.service, timeout_ms = after.as_millis() as u64, "store call timed out");
                }
                StoreError::Unavailable(reason) => {
                    error!(service = %self.service, reason = %reason, "store unavailable");
                }
                _ => {}
            }
        }

        result
    }

    /// Round trip used by health checks
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.run(async {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok::<_, sqlx::Error>(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_url() {
        let config = DbConfig {
            database_url: "sqlite:///var/lib/secret-location.db".to_string(),
            ..DbConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-location"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_in_memory_config() {
        let config = DbConfig::in_memory("test");
        assert!(config.is_in_memory());
        assert_eq!(config.max_connections, 1);
        assert!(!DbConfig::default().is_in_memory());
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result: Result<(), StoreError> = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(StoreError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_through() {
        let result = with_timeout(Duration::from_secs(1), async { Ok::<_, sqlx::Error>(5) }).await;
        assert_eq!(result.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_connect_in_memory_applies_migrations() {
        let db = Database::connect(&DbConfig::in_memory("db-pool-test"))
            .await
            .expect("in-memory database should start");

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN \
             ('users', 'posts', 'follows', 'likes', 'comments') ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(names, vec!["comments", "follows", "likes", "posts", "users"]);
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_unique_violation_is_classified() {
        let db = Database::connect(&DbConfig::in_memory("db-pool-test"))
            .await
            .unwrap();
        let now = chrono::Utc::now();
        let insert = "INSERT INTO users (username, email, created_at, updated_at) VALUES (?, ?, ?, ?)";

        db.run(async {
            sqlx::query(insert)
                .bind("alice")
                .bind("alice@example.com")
                .bind(now)
                .bind(now)
                .execute(db.pool())
                .await
        })
        .await
        .unwrap();

        let err = db
            .run(async {
                sqlx::query(insert)
                    .bind("alice")
                    .bind("other@example.com")
                    .bind(now)
                    .bind(now)
                    .execute(db.pool())
                    .await
            })
            .await
            .unwrap_err();

        assert!(err.violates("users.username"), "got {err:?}");
    }
}
