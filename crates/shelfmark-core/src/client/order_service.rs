use std::time::Instant;

use crate::breadcrumb::BreadcrumbCache;
use crate::error::Result;
use crate::forest::find_folder;
use crate::models::{FolderItem, MoveCommand, ResortOutcome};
use crate::ranking::{rank, resort};
use crate::store::BookmarkStore;
use crate::sync::{apply_reorder, apply_reparent, execute};

use super::Shelfmark;

impl<S: BookmarkStore, C: BreadcrumbCache> Shelfmark<S, C> {
    /// Lays out `folder_id` as its subfolders followed by its bookmarks, most visited first.
    pub async fn resort_folder(&self, folder_id: &str) -> Result<ResortOutcome> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();

        let output = self.resort_folder_inner(folder_id).await;
        match output {
            Ok(outcome) => {
                self.log_request_status(
                    request_id,
                    "resort_folder",
                    "ok",
                    started,
                    Some(folder_id.to_string()),
                    Some(serde_json::json!({
                        "issued": outcome.issued(),
                        "applied": outcome.applied,
                    })),
                );
                Ok(outcome)
            }
            Err(err) => {
                self.log_request_error(
                    request_id,
                    "resort_folder",
                    started,
                    Some(folder_id.to_string()),
                    &err,
                    None,
                );
                Err(err)
            }
        }
    }

    pub(super) async fn resort_folder_inner(&self, folder_id: &str) -> Result<ResortOutcome> {
        self.reload().await?;
        let folder = self.snapshot_folder(folder_id)?;
        let ranked = rank(&folder.children);
        let commands = resort(&folder, &ranked)?;
        tracing::debug!(
            folder_id,
            subfolders = folder.subfolder_count(),
            bookmarks = folder.bookmark_count(),
            commands = commands.len(),
            "resort planned"
        );
        let applied = self.execute_and_reload(&commands).await?;
        Ok(ResortOutcome {
            folder_id: folder_id.to_string(),
            commands,
            applied,
        })
    }

    /// Moves the bookmark at bookmark position `from` of `folder_id` to position `to`.
    ///
    /// Positions count bookmarks only. Returns `None` when nothing moves.
    pub async fn reorder_bookmarks(
        &self,
        folder_id: &str,
        from: usize,
        to: usize,
    ) -> Result<Option<MoveCommand>> {
        let started = Instant::now();
        let output: Result<Option<MoveCommand>> = async {
            self.reload().await?;
            let folder = self.snapshot_folder(folder_id)?;
            let ids = folder
                .children
                .iter()
                .map(|bookmark| bookmark.id.as_str())
                .collect::<Vec<_>>();
            let Some(mut command) = apply_reorder(folder_id, &ids, from, to)? else {
                return Ok(None);
            };
            command.index = folder.children[to].index;
            self.execute_and_reload(std::slice::from_ref(&command))
                .await?;
            Ok(Some(command))
        }
        .await;
        self.record("reorder_bookmarks", started, Some(folder_id.to_string()), output)
    }

    /// Moves the subfolder at folder position `from` of `parent_id` to position `to`.
    pub async fn reorder_folders(
        &self,
        parent_id: &str,
        from: usize,
        to: usize,
    ) -> Result<Option<MoveCommand>> {
        let started = Instant::now();
        let output: Result<Option<MoveCommand>> = async {
            self.reload().await?;
            let parent = self.snapshot_folder(parent_id)?;
            let ids = parent
                .child_folders
                .iter()
                .map(|folder| folder.id.as_str())
                .collect::<Vec<_>>();
            let Some(mut command) = apply_reorder(parent_id, &ids, from, to)? else {
                return Ok(None);
            };
            command.index = parent.child_folders[to].order;
            self.execute_and_reload(std::slice::from_ref(&command))
                .await?;
            Ok(Some(command))
        }
        .await;
        self.record("reorder_folders", started, Some(parent_id.to_string()), output)
    }

    /// Moves a bookmark or folder under `new_parent_id`; `index` of `None` appends.
    ///
    /// A move into the node itself or one of its descendants is refused before the store sees it.
    pub async fn reparent(
        &self,
        node_id: &str,
        new_parent_id: &str,
        index: Option<usize>,
    ) -> Result<MoveCommand> {
        let started = Instant::now();
        let output: Result<MoveCommand> = async {
            self.reload().await?;
            let tree = self
                .snapshot_tree()?
                .map(|tree| vec![tree])
                .unwrap_or_default();
            let index = match index {
                Some(index) => index,
                None => append_index(&tree, node_id, new_parent_id),
            };
            let command = apply_reparent(&tree, node_id, new_parent_id, index)?;
            self.execute_and_reload(std::slice::from_ref(&command))
                .await?;
            Ok(command)
        }
        .await;
        self.record("reparent", started, Some(node_id.to_string()), output)
    }

    /// Runs the commands one at a time and reloads whether or not they all applied.
    async fn execute_and_reload(&self, commands: &[MoveCommand]) -> Result<usize> {
        if commands.is_empty() {
            return Ok(0);
        }
        let executed = execute(&self.store, commands).await;
        let reloaded = self.reload().await;
        let applied = executed?;
        reloaded?;
        Ok(applied)
    }
}

/// Final position of the last slot under `parent_id`, accounting for `node_id` leaving it.
fn append_index(tree: &[FolderItem], node_id: &str, parent_id: &str) -> usize {
    let Some(parent) = find_folder(tree, parent_id) else {
        return 0;
    };
    let len = parent.children.len() + parent.child_folders.len();
    let already_inside = parent.children.iter().any(|bookmark| bookmark.id == node_id)
        || parent.child_folders.iter().any(|folder| folder.id == node_id);
    if already_inside { len.saturating_sub(1) } else { len }
}
