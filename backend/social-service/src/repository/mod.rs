//! SQL for the ledger tables
//!
//! Functions accept any SQLite executor so the service layer can run them on
//! the pool or inside a transaction (`&mut *tx`).

pub mod comments;
pub mod follows;
pub mod likes;
pub mod posts;
