use std::collections::HashSet;

use crate::models::{BookmarkItem, ExternalNode, FolderChoice, FolderItem};

pub fn find_folder<'a>(forest: &'a [FolderItem], id: &str) -> Option<&'a FolderItem> {
    forest.iter().find_map(|folder| {
        if folder.id == id {
            Some(folder)
        } else {
            find_folder(&folder.child_folders, id)
        }
    })
}

pub fn find_bookmark<'a>(forest: &'a [FolderItem], id: &str) -> Option<&'a BookmarkItem> {
    forest.iter().find_map(|folder| {
        folder
            .children
            .iter()
            .find(|bookmark| bookmark.id == id)
            .or_else(|| find_bookmark(&folder.child_folders, id))
    })
}

/// Ids of every folder and bookmark strictly below `folder`.
#[must_use]
pub fn descendant_ids(folder: &FolderItem) -> HashSet<String> {
    let mut ids = HashSet::new();
    let mut pending = vec![folder];
    while let Some(current) = pending.pop() {
        ids.extend(current.children.iter().map(|bookmark| bookmark.id.clone()));
        for child in &current.child_folders {
            ids.insert(child.id.clone());
            pending.push(child);
        }
    }
    ids
}

/// Folders from the forest top down to `id`, following `parent_id` links.
///
/// The walk stops at the first parent that is not part of the forest (the host root).
pub fn parent_trail<'a>(forest: &'a [FolderItem], id: &str) -> Option<Vec<&'a FolderItem>> {
    let mut current = find_folder(forest, id)?;
    let mut trail = vec![current];
    let mut remaining_hops = count_folders(forest);
    while let Some(parent_id) = current.parent_id.as_deref() {
        if remaining_hops == 0 {
            break;
        }
        remaining_hops = remaining_hops.saturating_sub(1);
        let Some(parent) = find_folder(forest, parent_id) else {
            break;
        };
        trail.push(parent);
        current = parent;
    }
    trail.reverse();
    Some(trail)
}

#[must_use]
pub fn count_folders(forest: &[FolderItem]) -> usize {
    forest
        .iter()
        .map(|folder| 1 + count_folders(&folder.child_folders))
        .sum()
}

/// Every folder of the host tree, `root` included, depth-first in index order.
#[must_use]
pub fn folder_choices(root: &ExternalNode) -> Vec<FolderChoice> {
    let mut choices = Vec::new();
    push_folder_choices(root, 0, &mut choices);
    choices
}

fn push_folder_choices(node: &ExternalNode, depth: usize, out: &mut Vec<FolderChoice>) {
    if node.is_bookmark() {
        return;
    }
    out.push(FolderChoice {
        id: node.id.clone(),
        title: folder_display_title(node),
        depth,
    });
    let mut children = node.child_nodes().iter().collect::<Vec<_>>();
    children.sort_by_key(|child| child.index);
    for child in children {
        push_folder_choices(child, depth + 1, out);
    }
}

/// Fallback names for the host's untitled well-known folders.
#[must_use]
pub fn folder_display_title(node: &ExternalNode) -> String {
    if !node.title.trim().is_empty() {
        return node.title.clone();
    }
    match node.id.as_str() {
        "0" => "Root",
        "1" => "Bookmarks bar",
        "2" => "Other bookmarks",
        _ => "Untitled folder",
    }
    .to_string()
}
