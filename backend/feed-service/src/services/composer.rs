use crate::db::timeline;
use crate::error::{FeedError, Result};
use crate::models::FeedPost;
use db_pool::Database;
use tracing::{debug, warn};

/// Posts per page when the caller does not ask otherwise
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on any single page
pub const MAX_PAGE_SIZE: u32 = 100;

/// Builds ordered, paginated post sequences from the follow graph
#[derive(Clone)]
pub struct FeedComposer {
    db: Database,
}

impl FeedComposer {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Own posts plus posts of followed accounts, newest first
    ///
    /// `page` is 1-based; values below 1 are treated as 1. A page past the end
    /// is empty. Transient store failures degrade to an empty page.
    pub async fn timeline(&self, user_id: i64, page: u32, page_size: u32) -> Result<Vec<FeedPost>> {
        let (limit, offset) = page_window(page, page_size);
        debug!(user_id, page, limit, offset, "Composing timeline");

        let result = self
            .db
            .run(timeline::timeline(self.db.pool(), user_id, limit, offset))
            .await
            .map_err(FeedError::from);

        degrade_on_unavailable(result, "timeline")
    }

    /// Most recent posts for anonymous viewers, ignoring follows
    ///
    /// Rows never carry a `liked` flag.
    pub async fn public_timeline(&self, page_size: u32) -> Result<Vec<FeedPost>> {
        let (limit, _) = page_window(1, page_size);

        let result = self
            .db
            .run(timeline::public_timeline(self.db.pool(), limit))
            .await
            .map_err(FeedError::from);

        degrade_on_unavailable(result, "public_timeline")
    }

    /// Latest posts of a single author
    pub async fn user_posts(
        &self,
        author_id: i64,
        viewer_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<FeedPost>> {
        let (limit, _) = page_window(1, limit);

        Ok(self
            .db
            .run(timeline::user_posts(self.db.pool(), author_id, viewer_id, limit))
            .await?)
    }
}

/// `(limit, offset)` for a 1-based page
fn page_window(page: u32, page_size: u32) -> (i64, i64) {
    let size = i64::from(page_size.clamp(1, MAX_PAGE_SIZE));
    let page = i64::from(page.max(1));
    (size, (page - 1).saturating_mul(size))
}

fn degrade_on_unavailable(result: Result<Vec<FeedPost>>, feed: &str) -> Result<Vec<FeedPost>> {
    match result {
        Err(e) if e.is_unavailable() => {
            warn!(feed, error = %e, "Store unavailable, serving empty feed");
            Ok(Vec::new())
        }
        other => other,
    }
}
