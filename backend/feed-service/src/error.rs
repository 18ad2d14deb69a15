use db_pool::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl FeedError {
    pub fn is_unavailable(&self) -> bool {
        match self {
            FeedError::Store(e) => e.is_transient(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
