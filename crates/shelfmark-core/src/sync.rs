use crate::error::{Result, ShelfError};
use crate::forest::{descendant_ids, find_bookmark, find_folder};
use crate::models::{FolderItem, MoveCommand};
use crate::store::BookmarkStore;

/// Move command for dragging the item at `from` to `to` within one container.
///
/// `item_ids` is the container's current order for the kind of item being dragged. Returns
/// `None` when nothing moves.
pub fn apply_reorder<S: AsRef<str>>(
    container_id: &str,
    item_ids: &[S],
    from: usize,
    to: usize,
) -> Result<Option<MoveCommand>> {
    if from >= item_ids.len() || to >= item_ids.len() {
        return Err(ShelfError::Validation(format!(
            "reorder {from} -> {to} out of bounds for {} items in {container_id}",
            item_ids.len()
        )));
    }
    if from == to {
        return Ok(None);
    }
    Ok(Some(MoveCommand::new(
        item_ids[from].as_ref(),
        container_id,
        to,
    )))
}

/// Local order after moving the element at `from` to `to`.
#[must_use]
pub fn array_move<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut out = items.to_vec();
    if from >= out.len() || to >= out.len() || from == to {
        return out;
    }
    let item = out.remove(from);
    out.insert(to, item);
    out
}

/// Move command for placing `node_id` under `new_parent_id`, refused when it would create a cycle.
pub fn apply_reparent(
    forest: &[FolderItem],
    node_id: &str,
    new_parent_id: &str,
    new_index: usize,
) -> Result<MoveCommand> {
    ensure_acyclic(forest, node_id, new_parent_id)?;
    Ok(MoveCommand::new(node_id, new_parent_id, new_index))
}

/// Checks that `node_id` exists and may live under `new_parent_id`.
///
/// Runs against the in-memory tree only, before anything reaches the store.
pub fn ensure_acyclic(forest: &[FolderItem], node_id: &str, new_parent_id: &str) -> Result<()> {
    let cycle = || ShelfError::Cycle {
        node_id: node_id.to_string(),
        target_id: new_parent_id.to_string(),
    };
    if node_id == new_parent_id {
        return Err(cycle());
    }
    if let Some(folder) = find_folder(forest, node_id) {
        if descendant_ids(folder).contains(new_parent_id) {
            return Err(cycle());
        }
    } else if find_bookmark(forest, node_id).is_none() {
        return Err(ShelfError::NotFound(format!("bookmark node {node_id}")));
    }
    if find_bookmark(forest, new_parent_id).is_some() {
        return Err(ShelfError::Validation(format!(
            "{new_parent_id} is a bookmark, not a folder"
        )));
    }
    Ok(())
}

/// Awaits each command in turn and stops at the first failure.
///
/// Returns the number of applied commands. A failure of a single command surfaces as
/// [`ShelfError::Store`]; a failure part-way through a longer sequence as
/// [`ShelfError::ResortFailure`] with the counts. Nothing is retried or rolled back.
pub async fn execute<S>(store: &S, commands: &[MoveCommand]) -> Result<usize>
where
    S: BookmarkStore + ?Sized,
{
    for (applied, command) in commands.iter().enumerate() {
        if let Err(err) = store
            .move_node(&command.node_id, command.destination())
            .await
        {
            tracing::warn!(
                node_id = %command.node_id,
                parent_id = %command.parent_id,
                index = command.index,
                applied,
                issued = commands.len(),
                error = %err,
                "move command failed; remaining commands dropped"
            );
            if commands.len() == 1 {
                return Err(err);
            }
            return Err(ShelfError::ResortFailure {
                issued: commands.len(),
                applied,
                message: err.to_string(),
            });
        }
    }
    Ok(commands.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TreeBuilder;
    use crate::models::{CreateNode, ExternalNode, MoveDestination, NodeChanges};
    use crate::store::{BOOKMARKS_BAR_ID, MemoryBookmarkStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn chain_forest() -> Vec<FolderItem> {
        let leaf = |id: &str, children: Vec<ExternalNode>| ExternalNode {
            id: id.to_string(),
            title: id.to_uppercase(),
            url: None,
            parent_id: None,
            children: Some(children),
            index: 0,
            date_added: None,
        };
        let mark = ExternalNode {
            id: "m".to_string(),
            title: "Mark".to_string(),
            url: Some("https://m.example".to_string()),
            parent_id: None,
            children: None,
            index: 1,
            date_added: None,
        };
        let root = leaf(
            "0",
            vec![leaf("a", vec![leaf("b", vec![leaf("c", vec![]), mark])])],
        );
        TreeBuilder::default().build(&root)
    }

    #[test]
    fn reorder_same_position_is_noop() {
        let ids = ["x", "y", "z"];
        assert_eq!(apply_reorder("p", &ids, 1, 1).expect("noop"), None);
        let command = apply_reorder("p", &ids, 0, 2)
            .expect("reorder")
            .expect("command");
        assert_eq!(command, MoveCommand::new("x", "p", 2));
        assert!(apply_reorder("p", &ids, 0, 3).is_err());
    }

    #[test]
    fn array_move_matches_final_position() {
        assert_eq!(array_move(&[1, 2, 3, 4], 0, 2), vec![2, 3, 1, 4]);
        assert_eq!(array_move(&[1, 2, 3, 4], 3, 0), vec![4, 1, 2, 3]);
        assert_eq!(array_move(&[1, 2], 0, 5), vec![1, 2]);
    }

    #[test]
    fn reparent_into_descendant_is_a_cycle() {
        let forest = chain_forest();
        let err = apply_reparent(&forest, "a", "c", 0).expect_err("cycle");
        assert!(matches!(
            err,
            ShelfError::Cycle { ref node_id, ref target_id } if node_id == "a" && target_id == "c"
        ));
        assert!(apply_reparent(&forest, "b", "b", 0).is_err());
    }

    #[test]
    fn reparent_accepts_sibling_and_ancestor_targets() {
        let forest = chain_forest();
        assert_eq!(
            apply_reparent(&forest, "c", "a", 0).expect("up"),
            MoveCommand::new("c", "a", 0)
        );
        assert_eq!(
            apply_reparent(&forest, "m", "c", 0).expect("bookmark down"),
            MoveCommand::new("m", "c", 0)
        );
        assert!(matches!(
            apply_reparent(&forest, "c", "m", 0),
            Err(ShelfError::Validation(_))
        ));
        assert!(matches!(
            apply_reparent(&forest, "ghost", "a", 0),
            Err(ShelfError::NotFound(_))
        ));
    }

    /// Store whose moves start failing after a number of successes.
    struct FlakyStore {
        inner: MemoryBookmarkStore,
        allowed_moves: usize,
        seen: AtomicUsize,
    }

    #[async_trait]
    impl BookmarkStore for FlakyStore {
        async fn get_tree(&self) -> Result<ExternalNode> {
            self.inner.get_tree().await
        }
        async fn create(&self, node: CreateNode) -> Result<ExternalNode> {
            self.inner.create(node).await
        }
        async fn update(&self, id: &str, changes: NodeChanges) -> Result<ExternalNode> {
            self.inner.update(id, changes).await
        }
        async fn move_node(&self, id: &str, destination: MoveDestination) -> Result<ExternalNode> {
            if self.seen.fetch_add(1, Ordering::SeqCst) >= self.allowed_moves {
                return Err(ShelfError::Store("store offline".to_string()));
            }
            self.inner.move_node(id, destination).await
        }
        async fn remove(&self, id: &str) -> Result<()> {
            self.inner.remove(id).await
        }
        async fn remove_subtree(&self, id: &str) -> Result<()> {
            self.inner.remove_subtree(id).await
        }
    }

    #[tokio::test]
    async fn execute_stops_at_first_failure() {
        let inner = MemoryBookmarkStore::default();
        let mut ids = Vec::new();
        for title in ["a", "b", "c"] {
            let node = inner
                .create(CreateNode::bookmark(title, "https://x.example", BOOKMARKS_BAR_ID))
                .await
                .expect("create");
            ids.push(node.id);
        }
        let store = FlakyStore {
            inner,
            allowed_moves: 1,
            seen: AtomicUsize::new(0),
        };
        let commands = vec![
            MoveCommand::new(ids[2].clone(), BOOKMARKS_BAR_ID, 0),
            MoveCommand::new(ids[2].clone(), BOOKMARKS_BAR_ID, 2),
            MoveCommand::new(ids[0].clone(), BOOKMARKS_BAR_ID, 2),
        ];
        let err = execute(&store, &commands).await.expect_err("partial");
        assert!(matches!(
            err,
            ShelfError::ResortFailure {
                issued: 3,
                applied: 1,
                ..
            }
        ));
        assert_eq!(store.seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn execute_single_failure_is_a_store_error() {
        let store = MemoryBookmarkStore::default();
        let err = execute(&store, &[MoveCommand::new("missing", BOOKMARKS_BAR_ID, 0)])
            .await
            .expect_err("missing node");
        assert!(matches!(err, ShelfError::Store(_)));
        assert_eq!(execute(&store, &[]).await.expect("empty"), 0);
    }
}
