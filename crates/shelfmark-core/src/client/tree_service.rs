use std::time::Instant;

use crate::breadcrumb::BreadcrumbCache;
use crate::error::Result;
use crate::forest::{count_folders, folder_choices};
use crate::models::{FolderChoice, FolderItem};
use crate::search::collect_forest;
use crate::store::BookmarkStore;

use super::{Shelfmark, TreeSnapshot};

impl<S: BookmarkStore, C: BreadcrumbCache> Shelfmark<S, C> {
    /// Rebuilds the snapshot from the store and returns the fresh forest.
    pub async fn reload(&self) -> Result<Vec<FolderItem>> {
        let root = self.store.get_tree().await?;
        let tree = self.builder.build_root(&root);
        let forest = tree.child_folders.clone();
        tracing::debug!(
            folders = count_folders(&forest),
            bookmarks = collect_forest(&forest).len(),
            "tree reloaded"
        );
        self.replace_snapshot(TreeSnapshot { root, tree })?;
        Ok(forest)
    }

    /// Top-level folders of the last snapshot; empty before the first reload.
    pub fn forest(&self) -> Result<Vec<FolderItem>> {
        self.read_snapshot(|snapshot| {
            snapshot
                .map(|loaded| loaded.tree.child_folders.clone())
                .unwrap_or_default()
        })
    }

    /// Every folder of the tree, root included, for folder pickers.
    pub async fn folder_choices(&self) -> Result<Vec<FolderChoice>> {
        let started = Instant::now();
        let output: Result<Vec<FolderChoice>> = async {
            self.reload().await?;
            self.read_snapshot(|snapshot| {
                snapshot
                    .map(|loaded| folder_choices(&loaded.root))
                    .unwrap_or_default()
            })
        }
        .await;
        self.record("folder_choices", started, None, output)
    }
}
