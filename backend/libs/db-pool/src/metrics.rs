//! Prometheus metrics for the database connection pool
//!
//! Tracks pool size, store call latency and store call failures

use prometheus::{register_histogram_vec, register_int_counter_vec, register_int_gauge_vec};
use prometheus::{HistogramVec, IntCounterVec, IntGaugeVec};
use sqlx::SqlitePool;

use crate::StoreError;

lazy_static::lazy_static! {
    /// Database connection pool size by state (idle/active/max)
    static ref DB_POOL_CONNECTIONS: IntGaugeVec = register_int_gauge_vec!(
        "db_pool_connections",
        "Database pool connection count by state",
        &["service", "state"]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// Wall time of bounded store calls
    static ref DB_CALL_DURATION: HistogramVec = register_histogram_vec!(
        "db_call_duration_seconds",
        "Duration of bounded store calls",
        &["service"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// Store call failures by kind
    static ref DB_CALL_ERRORS: IntCounterVec = register_int_counter_vec!(
        "db_call_errors_total",
        "Store call failures",
        &["service", "error_type"]
    ).expect("Prometheus metrics registration should succeed at startup");
}

/// Update connection pool gauges (called periodically)
pub(crate) fn update_pool_metrics(pool: &SqlitePool, service: &str) {
    let size = pool.size() as i64;
    let idle = pool.num_idle() as i64;

    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "idle"])
        .set(idle);

    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "active"])
        .set(size - idle);

    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "max"])
        .set(pool.options().get_max_connections() as i64);
}

pub(crate) fn observe_call(service: &str, elapsed_secs: f64) {
    DB_CALL_DURATION
        .with_label_values(&[service])
        .observe(elapsed_secs);
}

pub(crate) fn record_error(service: &str, err: &StoreError) {
    let error_type = match err {
        StoreError::Timeout(_) => "timeout",
        StoreError::Unavailable(_) => "unavailable",
        StoreError::UniqueViolation(_) => "unique_violation",
        StoreError::ForeignKeyViolation(_) => "foreign_key",
        StoreError::NotFound => "not_found",
        StoreError::Query(_) => "query",
        StoreError::Migration(_) => "migration",
    };

    DB_CALL_ERRORS
        .with_label_values(&[service, error_type])
        .inc();
}
