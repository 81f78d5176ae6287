use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Result, ShelfError};
use crate::models::{CreateNode, ExternalNode, MoveDestination, NodeChanges};

pub const ROOT_ID: &str = "0";
pub const BOOKMARKS_BAR_ID: &str = "1";
pub const OTHER_BOOKMARKS_ID: &str = "2";

/// Capability surface of the host bookmark store.
///
/// Every call may fail with a store-defined error, reported as [`ShelfError::Store`]. Nothing
/// is transactional across calls. For `move_node`, `destination.index` is the node's final
/// position among the destination's children; `None` appends.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    async fn get_tree(&self) -> Result<ExternalNode>;
    async fn create(&self, node: CreateNode) -> Result<ExternalNode>;
    async fn update(&self, id: &str, changes: NodeChanges) -> Result<ExternalNode>;
    async fn move_node(&self, id: &str, destination: MoveDestination) -> Result<ExternalNode>;
    async fn remove(&self, id: &str) -> Result<()>;
    async fn remove_subtree(&self, id: &str) -> Result<()>;
}

#[async_trait]
impl<T: BookmarkStore + ?Sized> BookmarkStore for Arc<T> {
    async fn get_tree(&self) -> Result<ExternalNode> {
        (**self).get_tree().await
    }

    async fn create(&self, node: CreateNode) -> Result<ExternalNode> {
        (**self).create(node).await
    }

    async fn update(&self, id: &str, changes: NodeChanges) -> Result<ExternalNode> {
        (**self).update(id, changes).await
    }

    async fn move_node(&self, id: &str, destination: MoveDestination) -> Result<ExternalNode> {
        (**self).move_node(id, destination).await
    }

    async fn remove(&self, id: &str) -> Result<()> {
        (**self).remove(id).await
    }

    async fn remove_subtree(&self, id: &str) -> Result<()> {
        (**self).remove_subtree(id).await
    }
}

/// In-process store with the host's permanent layout and mutation rules.
///
/// The root and its direct children are permanent: they cannot be moved, renamed or removed.
#[derive(Clone)]
pub struct MemoryBookmarkStore {
    tree: Arc<Mutex<MemoryTree>>,
}

struct MemoryTree {
    root: ExternalNode,
    next_id: u64,
}

impl std::fmt::Debug for MemoryBookmarkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBookmarkStore").finish_non_exhaustive()
    }
}

impl Default for MemoryBookmarkStore {
    fn default() -> Self {
        Self::from_tree(default_layout())
    }
}

impl MemoryBookmarkStore {
    #[must_use]
    pub fn from_tree(mut root: ExternalNode) -> Self {
        root.parent_id = None;
        normalize(&mut root);
        let next_id = max_numeric_id(&root).map_or(100, |max| max + 1);
        Self {
            tree: Arc::new(Mutex::new(MemoryTree { root, next_id })),
        }
    }

    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let root = serde_json::from_str::<ExternalNode>(&raw)?;
        Ok(Self::from_tree(root))
    }

    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let root = self.snapshot()?;
        let serialized = serde_json::to_string_pretty(&root)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    pub fn snapshot(&self) -> Result<ExternalNode> {
        Ok(self.lock()?.root.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryTree>> {
        self.tree
            .lock()
            .map_err(|_| ShelfError::Internal("bookmark store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl BookmarkStore for MemoryBookmarkStore {
    async fn get_tree(&self) -> Result<ExternalNode> {
        self.snapshot()
    }

    async fn create(&self, node: CreateNode) -> Result<ExternalNode> {
        let mut tree = self.lock()?;
        let id = tree.next_id.to_string();
        tree.next_id += 1;

        let parent = find_node_mut(&mut tree.root, &node.parent_id)
            .ok_or_else(|| missing_node(&node.parent_id))?;
        if parent.is_bookmark() {
            return Err(ShelfError::Store(format!(
                "parent is not a folder: {}",
                node.parent_id
            )));
        }
        let created = ExternalNode {
            id: id.clone(),
            title: node.title,
            children: node.url.is_none().then(Vec::new),
            url: node.url,
            parent_id: Some(parent.id.clone()),
            index: 0,
            date_added: Some(Utc::now().timestamp_millis()),
        };
        insert_child(parent, created, node.index);
        find_node(&tree.root, &id)
            .cloned()
            .ok_or_else(|| missing_node(&id))
    }

    async fn update(&self, id: &str, changes: NodeChanges) -> Result<ExternalNode> {
        let mut tree = self.lock()?;
        ensure_mutable(&tree.root, id)?;
        let node = find_node_mut(&mut tree.root, id).ok_or_else(|| missing_node(id))?;
        if changes.url.is_some() && !node.is_bookmark() {
            return Err(ShelfError::Store(format!("cannot set a url on folder {id}")));
        }
        if let Some(title) = changes.title {
            node.title = title;
        }
        if let Some(url) = changes.url {
            node.url = Some(url);
        }
        Ok(node.clone())
    }

    async fn move_node(&self, id: &str, destination: MoveDestination) -> Result<ExternalNode> {
        let mut tree = self.lock()?;
        ensure_mutable(&tree.root, id)?;
        let parent_id = match destination.parent_id {
            Some(parent_id) => parent_id,
            None => parent_of(&tree.root, id).ok_or_else(|| missing_node(id))?,
        };
        let target = find_node(&tree.root, &parent_id).ok_or_else(|| missing_node(&parent_id))?;
        if target.is_bookmark() {
            return Err(ShelfError::Store(format!(
                "parent is not a folder: {parent_id}"
            )));
        }
        let moving = find_node(&tree.root, id).ok_or_else(|| missing_node(id))?;
        if parent_id == id || find_node(moving, &parent_id).is_some() {
            return Err(ShelfError::Store(format!(
                "cannot move {id} into its own subtree"
            )));
        }

        let node = detach(&mut tree.root, id).ok_or_else(|| missing_node(id))?;
        let parent =
            find_node_mut(&mut tree.root, &parent_id).ok_or_else(|| missing_node(&parent_id))?;
        insert_child(parent, node, destination.index);
        find_node(&tree.root, id)
            .cloned()
            .ok_or_else(|| missing_node(id))
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let mut tree = self.lock()?;
        ensure_mutable(&tree.root, id)?;
        let node = find_node(&tree.root, id).ok_or_else(|| missing_node(id))?;
        if !node.child_nodes().is_empty() {
            return Err(ShelfError::Store(format!("cannot remove non-empty folder {id}")));
        }
        detach(&mut tree.root, id).ok_or_else(|| missing_node(id))?;
        Ok(())
    }

    async fn remove_subtree(&self, id: &str) -> Result<()> {
        let mut tree = self.lock()?;
        ensure_mutable(&tree.root, id)?;
        detach(&mut tree.root, id).ok_or_else(|| missing_node(id))?;
        Ok(())
    }
}

/// Root `0` holding the bookmarks bar (`1`) and other bookmarks (`2`).
#[must_use]
pub fn default_layout() -> ExternalNode {
    let permanent = |id: &str, title: &str, index: usize| ExternalNode {
        id: id.to_string(),
        title: title.to_string(),
        url: None,
        parent_id: Some(ROOT_ID.to_string()),
        children: Some(Vec::new()),
        index,
        date_added: None,
    };
    ExternalNode {
        id: ROOT_ID.to_string(),
        title: String::new(),
        url: None,
        parent_id: None,
        children: Some(vec![
            permanent(BOOKMARKS_BAR_ID, "Bookmarks bar", 0),
            permanent(OTHER_BOOKMARKS_ID, "Other bookmarks", 1),
        ]),
        index: 0,
        date_added: None,
    }
}

fn missing_node(id: &str) -> ShelfError {
    ShelfError::Store(format!("can't find bookmark for id: {id}"))
}

fn ensure_mutable(root: &ExternalNode, id: &str) -> Result<()> {
    if root.id == id || root.child_nodes().iter().any(|child| child.id == id) {
        return Err(ShelfError::Store(format!(
            "can't modify the root bookmark folders: {id}"
        )));
    }
    Ok(())
}

fn find_node<'a>(node: &'a ExternalNode, id: &str) -> Option<&'a ExternalNode> {
    if node.id == id {
        return Some(node);
    }
    node.child_nodes()
        .iter()
        .find_map(|child| find_node(child, id))
}

fn find_node_mut<'a>(node: &'a mut ExternalNode, id: &str) -> Option<&'a mut ExternalNode> {
    if node.id == id {
        return Some(node);
    }
    node.children
        .as_mut()?
        .iter_mut()
        .find_map(|child| find_node_mut(child, id))
}

fn parent_of(node: &ExternalNode, id: &str) -> Option<String> {
    if node.child_nodes().iter().any(|child| child.id == id) {
        return Some(node.id.clone());
    }
    node.child_nodes()
        .iter()
        .find_map(|child| parent_of(child, id))
}

fn detach(node: &mut ExternalNode, id: &str) -> Option<ExternalNode> {
    let children = node.children.as_mut()?;
    if let Some(position) = children.iter().position(|child| child.id == id) {
        let removed = children.remove(position);
        reindex(children);
        return Some(removed);
    }
    children.iter_mut().find_map(|child| detach(child, id))
}

fn insert_child(parent: &mut ExternalNode, mut node: ExternalNode, index: Option<usize>) {
    node.parent_id = Some(parent.id.clone());
    let children = parent.children.get_or_insert_with(Vec::new);
    let position = index.unwrap_or(children.len()).min(children.len());
    children.insert(position, node);
    reindex(children);
}

fn reindex(children: &mut [ExternalNode]) {
    for (index, child) in children.iter_mut().enumerate() {
        child.index = index;
    }
}

/// Orders children by index, renumbers them densely and fills in parent links.
fn normalize(node: &mut ExternalNode) {
    let parent_id = node.id.clone();
    if node.url.is_none() && node.children.is_none() {
        node.children = Some(Vec::new());
    }
    if let Some(children) = node.children.as_mut() {
        children.sort_by_key(|child| child.index);
        reindex(children);
        for child in children.iter_mut() {
            child.parent_id = Some(parent_id.clone());
            normalize(child);
        }
    }
}

fn max_numeric_id(node: &ExternalNode) -> Option<u64> {
    let own = node.id.parse::<u64>().ok();
    node.child_nodes()
        .iter()
        .filter_map(max_numeric_id)
        .chain(own)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(node: &ExternalNode) -> Vec<String> {
        node.child_nodes()
            .iter()
            .map(|child| child.title.clone())
            .collect()
    }

    #[tokio::test]
    async fn create_appends_and_assigns_fresh_ids() {
        let store = MemoryBookmarkStore::default();
        let a = store
            .create(CreateNode::bookmark("A", "https://a.example", BOOKMARKS_BAR_ID))
            .await
            .expect("create a");
        let b = store
            .create(CreateNode::folder("B", BOOKMARKS_BAR_ID))
            .await
            .expect("create b");
        assert_ne!(a.id, b.id);
        assert_eq!(a.index, 0);
        assert_eq!(b.index, 1);
        assert_eq!(b.children, Some(Vec::new()));
        assert_eq!(a.parent_id.as_deref(), Some(BOOKMARKS_BAR_ID));
    }

    #[tokio::test]
    async fn move_uses_final_position_semantics() {
        let store = MemoryBookmarkStore::default();
        let mut ids = Vec::new();
        for title in ["a", "b", "c", "d"] {
            let node = store
                .create(CreateNode::bookmark(title, "https://x.example", BOOKMARKS_BAR_ID))
                .await
                .expect("create");
            ids.push(node.id);
        }

        let moved = store
            .move_node(
                &ids[0],
                MoveDestination {
                    parent_id: None,
                    index: Some(2),
                },
            )
            .await
            .expect("move down");
        assert_eq!(moved.index, 2);

        let tree = store.get_tree().await.expect("tree");
        let bar = find_node(&tree, BOOKMARKS_BAR_ID).expect("bar");
        assert_eq!(titles(bar), vec!["b", "c", "a", "d"]);
    }

    #[tokio::test]
    async fn move_into_own_subtree_is_refused() {
        let store = MemoryBookmarkStore::default();
        let outer = store
            .create(CreateNode::folder("outer", BOOKMARKS_BAR_ID))
            .await
            .expect("outer");
        let inner = store
            .create(CreateNode::folder("inner", &outer.id))
            .await
            .expect("inner");
        let err = store
            .move_node(
                &outer.id,
                MoveDestination {
                    parent_id: Some(inner.id.clone()),
                    index: Some(0),
                },
            )
            .await
            .expect_err("cycle");
        assert!(matches!(err, ShelfError::Store(_)));
    }

    #[tokio::test]
    async fn permanent_folders_cannot_change() {
        let store = MemoryBookmarkStore::default();
        assert!(store.remove_subtree(BOOKMARKS_BAR_ID).await.is_err());
        assert!(store.update(ROOT_ID, NodeChanges::title("x")).await.is_err());
        assert!(
            store
                .move_node(OTHER_BOOKMARKS_ID, MoveDestination::default())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn remove_refuses_non_empty_folder_but_remove_subtree_does_not() {
        let store = MemoryBookmarkStore::default();
        let folder = store
            .create(CreateNode::folder("f", OTHER_BOOKMARKS_ID))
            .await
            .expect("folder");
        store
            .create(CreateNode::bookmark("x", "https://x.example", &folder.id))
            .await
            .expect("child");
        assert!(store.remove(&folder.id).await.is_err());
        store.remove_subtree(&folder.id).await.expect("remove tree");
        let tree = store.get_tree().await.expect("tree");
        assert!(find_node(&tree, &folder.id).is_none());
    }

    #[test]
    fn snapshot_round_trips_through_json_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bookmarks.json");
        let store = MemoryBookmarkStore::default();
        store.save_snapshot(&path).expect("save");
        let loaded = MemoryBookmarkStore::load_snapshot(&path).expect("load");
        assert_eq!(
            loaded.snapshot().expect("loaded"),
            store.snapshot().expect("original")
        );
    }

    #[test]
    fn from_tree_normalizes_indices_and_parent_links() {
        let mut root = default_layout();
        if let Some(children) = root.children.as_mut() {
            children[0].index = 7;
            children[1].index = 3;
            children[0].parent_id = None;
        }
        let store = MemoryBookmarkStore::from_tree(root);
        let tree = store.snapshot().expect("tree");
        let ids = tree
            .child_nodes()
            .iter()
            .map(|child| (child.id.as_str(), child.index, child.parent_id.as_deref()))
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![
                (OTHER_BOOKMARKS_ID, 0, Some(ROOT_ID)),
                (BOOKMARKS_BAR_ID, 1, Some(ROOT_ID))
            ]
        );
    }
}
