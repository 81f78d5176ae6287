use std::time::Instant;

use crate::breadcrumb::BreadcrumbCache;
use crate::error::Result;
use crate::models::{BookmarkItem, FolderItem};
use crate::search::{filter_folders, search_forest};
use crate::store::BookmarkStore;

use super::Shelfmark;

impl<S: BookmarkStore, C: BreadcrumbCache> Shelfmark<S, C> {
    /// Flat quick search over every bookmark of the last snapshot.
    ///
    /// Results are capped at the configured search limit.
    pub fn search(&self, query: &str) -> Result<Vec<BookmarkItem>> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        let query = query.trim();
        let output = self
            .forest()
            .map(|forest| search_forest(&forest, query, self.config.search_limit));

        match output {
            Ok(hits) => {
                self.log_request_status(
                    request_id,
                    "search",
                    "ok",
                    started,
                    None,
                    Some(serde_json::json!({
                        "query": query,
                        "hits": hits.len(),
                        "limit": self.config.search_limit,
                    })),
                );
                Ok(hits)
            }
            Err(err) => {
                self.log_request_error(request_id, "search", started, None, &err, None);
                Err(err)
            }
        }
    }

    /// Top-level folders that match by title or through any bookmark below them.
    pub fn search_folders(&self, query: &str) -> Result<Vec<FolderItem>> {
        let started = Instant::now();
        let output = self
            .forest()
            .map(|forest| filter_folders(&forest, query.trim()));
        self.record("search_folders", started, None, output)
    }
}
