use std::time::Instant;

use crate::breadcrumb::BreadcrumbCache;
use crate::error::{Result, ShelfError};
use crate::forest::parent_trail;
use crate::models::{FolderItem, RestoredPath};
use crate::store::BookmarkStore;

use super::Shelfmark;

impl<S: BookmarkStore, C: BreadcrumbCache> Shelfmark<S, C> {
    /// Selects `folder_id` (or clears the selection) and persists the trail leading to it.
    ///
    /// Returns the trail, top-level folder first. The cache is left alone until
    /// [`Shelfmark::restore_selection`] has run once.
    pub fn select_folder(&self, folder_id: Option<&str>) -> Result<Vec<FolderItem>> {
        let started = Instant::now();
        let output = (|| -> Result<Vec<FolderItem>> {
            let Some(folder_id) = folder_id else {
                self.persistence.save(None, &[])?;
                return Ok(Vec::new());
            };
            let forest = self.forest()?;
            let trail = parent_trail(&forest, folder_id)
                .ok_or_else(|| ShelfError::NotFound(format!("folder {folder_id}")))?
                .into_iter()
                .cloned()
                .collect::<Vec<_>>();
            let path_ids = trail
                .iter()
                .map(|folder| folder.id.clone())
                .collect::<Vec<_>>();
            self.persistence.save(Some(folder_id), &path_ids)?;
            Ok(trail)
        })();
        self.record(
            "select_folder",
            started,
            folder_id.map(ToString::to_string),
            output,
        )
    }

    /// Resolves the cached selection against the last snapshot.
    ///
    /// Before the first [`Shelfmark::reload`] there is nothing to resolve against: the cache and
    /// the save guard are left untouched and `None` is returned.
    pub fn restore_selection(&self) -> Result<Option<RestoredPath>> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        let loaded = match self.read_snapshot(|snapshot| {
            snapshot.map(|loaded| loaded.tree.child_folders.clone())
        }) {
            Ok(loaded) => loaded,
            Err(err) => {
                self.log_request_error(request_id, "restore_selection", started, None, &err, None);
                return Err(err);
            }
        };
        let Some(forest) = loaded else {
            self.log_request_warning(
                request_id,
                "restore_selection",
                started,
                None,
                "tree not loaded; cached selection kept",
                None,
            );
            return Ok(None);
        };
        let output = self.persistence.restore(&forest);

        match output {
            Ok(Some(restored)) => {
                self.log_request_status(
                    request_id,
                    "restore_selection",
                    "ok",
                    started,
                    Some(restored.selected.id.clone()),
                    Some(serde_json::json!({ "source": restored.source })),
                );
                Ok(Some(restored))
            }
            Ok(None) => {
                self.log_request_warning(
                    request_id,
                    "restore_selection",
                    started,
                    None,
                    "no cached selection resolved",
                    None,
                );
                Ok(None)
            }
            Err(err) => {
                self.log_request_error(request_id, "restore_selection", started, None, &err, None);
                Err(err)
            }
        }
    }
}
