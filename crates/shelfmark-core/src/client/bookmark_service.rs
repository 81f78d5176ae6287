use std::time::Instant;

use crate::breadcrumb::BreadcrumbCache;
use crate::codec::encode_title;
use crate::error::{Result, ShelfError};
use crate::models::{BookmarkItem, CreateNode, FolderItem};
use crate::store::BookmarkStore;

use super::Shelfmark;

impl<S: BookmarkStore, C: BreadcrumbCache> Shelfmark<S, C> {
    /// Creates a bookmark whose keywords become its tags. `parent_id` defaults to the configured
    /// parent.
    pub async fn add_bookmark(
        &self,
        title: &str,
        url: &str,
        parent_id: Option<&str>,
        keywords: &[String],
    ) -> Result<BookmarkItem> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        let parent_id = parent_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(self.config.default_parent_id.as_str())
            .to_string();

        let output: Result<BookmarkItem> = async {
            let url = url.trim();
            if url.is_empty() {
                return Err(ShelfError::Validation("bookmark url must not be empty".to_string()));
            }
            let display = if title.trim().is_empty() { url } else { title };
            let created = self
                .store
                .create(CreateNode::bookmark(
                    encode_title(display, 0, keywords),
                    url,
                    parent_id.clone(),
                ))
                .await?;
            self.reload().await?;
            self.snapshot_bookmark(&created.id)
        }
        .await;

        match output {
            Ok(bookmark) => {
                self.log_request_status(
                    request_id,
                    "add_bookmark",
                    "ok",
                    started,
                    Some(bookmark.id.clone()),
                    Some(serde_json::json!({
                        "parent_id": parent_id,
                        "tags": bookmark.tags,
                    })),
                );
                Ok(bookmark)
            }
            Err(err) => {
                self.log_request_error(
                    request_id,
                    "add_bookmark",
                    started,
                    None,
                    &err,
                    Some(serde_json::json!({ "parent_id": parent_id, "url": url })),
                );
                Err(err)
            }
        }
    }

    pub async fn create_folder(&self, title: &str, parent_id: Option<&str>) -> Result<FolderItem> {
        let started = Instant::now();
        let parent_id = parent_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(self.config.default_parent_id.as_str())
            .to_string();
        let output: Result<FolderItem> = async {
            let title = title.trim();
            if title.is_empty() {
                return Err(ShelfError::Validation("folder title must not be empty".to_string()));
            }
            let created = self
                .store
                .create(CreateNode::folder(title, parent_id.clone()))
                .await?;
            self.reload().await?;
            self.snapshot_folder(&created.id)
        }
        .await;
        self.record("create_folder", started, Some(parent_id), output)
    }

    pub async fn remove_bookmark(&self, bookmark_id: &str) -> Result<()> {
        let started = Instant::now();
        let output: Result<()> = async {
            self.reload().await?;
            self.snapshot_bookmark(bookmark_id)?;
            self.store.remove(bookmark_id).await?;
            self.reload().await?;
            Ok(())
        }
        .await;
        self.record("remove_bookmark", started, Some(bookmark_id.to_string()), output)
    }

    /// Removes a folder with everything below it.
    pub async fn remove_folder(&self, folder_id: &str) -> Result<()> {
        let started = Instant::now();
        let output: Result<()> = async {
            self.reload().await?;
            self.snapshot_folder(folder_id)?;
            self.store.remove_subtree(folder_id).await?;
            self.reload().await?;
            Ok(())
        }
        .await;
        self.record("remove_folder", started, Some(folder_id.to_string()), output)
    }
}
