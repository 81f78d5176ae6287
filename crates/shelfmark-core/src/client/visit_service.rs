use std::time::Instant;

use crate::breadcrumb::BreadcrumbCache;
use crate::codec::{DecodedTitle, encode_title, normalize_tags};
use crate::error::{Result, ShelfError};
use crate::models::{BookmarkItem, NodeChanges, VisitOutcome};
use crate::store::BookmarkStore;

use super::Shelfmark;

impl<S: BookmarkStore, C: BreadcrumbCache> Shelfmark<S, C> {
    /// Records one visit of `bookmark_id` in its title and, when enabled, resorts its folder.
    ///
    /// Every call counts; nothing deduplicates repeated opens.
    pub async fn open_bookmark(&self, bookmark_id: &str) -> Result<VisitOutcome> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();

        let output: Result<VisitOutcome> = async {
            self.reload().await?;
            let bookmark = self.snapshot_bookmark(bookmark_id)?;
            let visited = decoded(&bookmark).visited();
            self.store
                .update(bookmark_id, NodeChanges::title(visited.encode()))
                .await?;

            let resort = if self.config.auto_resort {
                Some(self.resort_folder_inner(&bookmark.parent_id).await?)
            } else {
                self.reload().await?;
                None
            };
            let bookmark = self.snapshot_bookmark(bookmark_id)?;
            Ok(VisitOutcome { bookmark, resort })
        }
        .await;

        match output {
            Ok(outcome) => {
                self.log_request_status(
                    request_id,
                    "open_bookmark",
                    "ok",
                    started,
                    Some(bookmark_id.to_string()),
                    Some(serde_json::json!({
                        "visit_count": outcome.bookmark.visit_count,
                        "resorted": outcome.resort.as_ref().map(|resort| resort.applied),
                    })),
                );
                Ok(outcome)
            }
            Err(err) => {
                self.log_request_error(
                    request_id,
                    "open_bookmark",
                    started,
                    Some(bookmark_id.to_string()),
                    &err,
                    None,
                );
                Err(err)
            }
        }
    }

    /// New display title; visit count and tags are kept.
    pub async fn rename_bookmark(&self, bookmark_id: &str, title: &str) -> Result<BookmarkItem> {
        let started = Instant::now();
        let output: Result<BookmarkItem> = async {
            let title = title.trim();
            if title.is_empty() {
                return Err(ShelfError::Validation(
                    "bookmark title must not be empty".to_string(),
                ));
            }
            self.reload().await?;
            let bookmark = self.snapshot_bookmark(bookmark_id)?;
            let encoded = encode_title(title, bookmark.visit_count, &bookmark.tags);
            self.write_title(bookmark_id, encoded).await
        }
        .await;
        self.record("rename_bookmark", started, Some(bookmark_id.to_string()), output)
    }

    /// Replaces the tags; display title and visit count are kept. At most five tags persist.
    pub async fn set_tags(&self, bookmark_id: &str, tags: &[String]) -> Result<BookmarkItem> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        let tags = normalize_tags(tags);
        let output: Result<BookmarkItem> = async {
            self.reload().await?;
            let bookmark = self.snapshot_bookmark(bookmark_id)?;
            let encoded = encode_title(&bookmark.title, bookmark.visit_count, &tags);
            self.write_title(bookmark_id, encoded).await
        }
        .await;

        match output {
            Ok(bookmark) => {
                self.log_request_status(
                    request_id,
                    "set_tags",
                    "ok",
                    started,
                    Some(bookmark_id.to_string()),
                    Some(serde_json::json!({ "tags": bookmark.tags })),
                );
                Ok(bookmark)
            }
            Err(err) => {
                self.log_request_error(
                    request_id,
                    "set_tags",
                    started,
                    Some(bookmark_id.to_string()),
                    &err,
                    Some(serde_json::json!({ "tags": tags })),
                );
                Err(err)
            }
        }
    }

    async fn write_title(&self, bookmark_id: &str, encoded: String) -> Result<BookmarkItem> {
        self.store
            .update(bookmark_id, NodeChanges::title(encoded))
            .await?;
        self.reload().await?;
        self.snapshot_bookmark(bookmark_id)
    }
}

fn decoded(bookmark: &BookmarkItem) -> DecodedTitle {
    DecodedTitle {
        display_title: bookmark.title.clone(),
        tags: bookmark.tags.clone(),
        visit_count: bookmark.visit_count,
    }
}
