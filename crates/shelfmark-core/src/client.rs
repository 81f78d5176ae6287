use std::collections::VecDeque;
use std::sync::{Mutex, RwLock};

use crate::breadcrumb::{BreadcrumbCache, MemoryBreadcrumbCache, PathPersistence};
use crate::builder::TreeBuilder;
use crate::config::ShelfConfig;
use crate::error::{Result, ShelfError};
use crate::forest::{find_bookmark, find_folder};
use crate::models::{BookmarkItem, ExternalNode, FolderItem, RequestLogEntry};
use crate::store::BookmarkStore;

mod bookmark_service;
mod breadcrumb_service;
mod order_service;
mod protocol_service;
mod request_log_service;
mod search_service;
mod tree_service;
mod visit_service;

/// Bookmark engine over a host store.
///
/// Every mutating operation rebuilds the tree from the store before planning and again after
/// writing. Reads answer from the last built snapshot.
pub struct Shelfmark<S, C = MemoryBreadcrumbCache> {
    store: S,
    config: ShelfConfig,
    builder: TreeBuilder,
    snapshot: RwLock<Option<TreeSnapshot>>,
    persistence: PathPersistence<C>,
    request_log: Mutex<VecDeque<RequestLogEntry>>,
}

/// Host tree and the folder hierarchy built from it.
#[derive(Debug, Clone)]
struct TreeSnapshot {
    root: ExternalNode,
    /// The root as a folder; its `child_folders` are the forest.
    tree: FolderItem,
}

impl<S, C> std::fmt::Debug for Shelfmark<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shelfmark").finish_non_exhaustive()
    }
}

impl<S: BookmarkStore> Shelfmark<S> {
    #[must_use]
    pub fn new(store: S, config: ShelfConfig) -> Self {
        Self::with_cache(store, config, MemoryBreadcrumbCache::default())
    }
}

impl<S: BookmarkStore, C: BreadcrumbCache> Shelfmark<S, C> {
    #[must_use]
    pub fn with_cache(store: S, config: ShelfConfig, cache: C) -> Self {
        Self {
            builder: TreeBuilder::new(config.favicon_endpoint.clone()),
            request_log: Mutex::new(VecDeque::with_capacity(config.request_log_capacity)),
            store,
            config,
            snapshot: RwLock::new(None),
            persistence: PathPersistence::new(cache),
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn config(&self) -> &ShelfConfig {
        &self.config
    }

    fn read_snapshot<T>(&self, f: impl FnOnce(Option<&TreeSnapshot>) -> T) -> Result<T> {
        let snapshot = self
            .snapshot
            .read()
            .map_err(|_| ShelfError::Internal("tree snapshot lock poisoned".to_string()))?;
        Ok(f(snapshot.as_ref()))
    }

    fn replace_snapshot(&self, next: TreeSnapshot) -> Result<()> {
        let mut snapshot = self
            .snapshot
            .write()
            .map_err(|_| ShelfError::Internal("tree snapshot lock poisoned".to_string()))?;
        *snapshot = Some(next);
        Ok(())
    }

    /// Whole tree, root included, from the last snapshot.
    fn snapshot_tree(&self) -> Result<Option<FolderItem>> {
        self.read_snapshot(|snapshot| snapshot.map(|loaded| loaded.tree.clone()))
    }

    fn snapshot_folder(&self, id: &str) -> Result<FolderItem> {
        self.read_snapshot(|snapshot| {
            snapshot.and_then(|loaded| find_folder(std::slice::from_ref(&loaded.tree), id).cloned())
        })?
        .ok_or_else(|| ShelfError::NotFound(format!("folder {id}")))
    }

    fn snapshot_bookmark(&self, id: &str) -> Result<BookmarkItem> {
        self.read_snapshot(|snapshot| {
            snapshot
                .and_then(|loaded| find_bookmark(std::slice::from_ref(&loaded.tree), id).cloned())
        })?
        .ok_or_else(|| ShelfError::NotFound(format!("bookmark {id}")))
    }
}
