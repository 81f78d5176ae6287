use std::collections::HashSet;

use crate::error::{Result, ShelfError};
use crate::models::{BookmarkItem, FolderItem, MoveCommand};

/// Most visited first. The sort is stable so equal counts keep their current order.
#[must_use]
pub fn rank(items: &[BookmarkItem]) -> Vec<BookmarkItem> {
    let mut ranked = items.to_vec();
    ranked.sort_by(|a, b| b.visit_count.cmp(&a.visit_count));
    ranked
}

/// Move commands that lay out `folder` as its subfolders followed by `ranked`.
///
/// Subfolders keep their relative order in `[0, subfolders)`; bookmarks land in
/// `[subfolders, subfolders + bookmarks)`. A bookmark whose host index already equals its target
/// and which the running layout still holds in place produces no command, so a folder that is
/// already in ranked order yields an empty plan.
pub fn resort(folder: &FolderItem, ranked: &[BookmarkItem]) -> Result<Vec<MoveCommand>> {
    ensure_same_bookmarks(folder, ranked)?;

    let base = folder.child_folders.len();
    let layout = current_layout(folder);

    let ascending = plan(folder, ranked, base, layout.clone(), PlanOrder::Ascending);
    if ascending.layout_matches(folder, ranked, base) {
        return Ok(ascending.commands);
    }
    // Bookmarks interleaved ahead of subfolders would drag the placed block left while filling
    // it front to back; filling it back to front is immune to that.
    let descending = plan(folder, ranked, base, layout, PlanOrder::Descending);
    tracing::debug!(
        folder_id = %folder.id,
        commands = descending.commands.len(),
        "resort planned back to front for interleaved folder"
    );
    Ok(descending.commands)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlanOrder {
    Ascending,
    Descending,
}

struct Plan {
    commands: Vec<MoveCommand>,
    layout: Vec<String>,
}

impl Plan {
    fn layout_matches(&self, folder: &FolderItem, ranked: &[BookmarkItem], base: usize) -> bool {
        let folder_ids = folder
            .child_folders
            .iter()
            .map(|child| child.id.as_str())
            .collect::<HashSet<_>>();
        self.layout[..base]
            .iter()
            .all(|id| folder_ids.contains(id.as_str()))
            && self.layout[base..]
                .iter()
                .zip(ranked)
                .all(|(id, bookmark)| *id == bookmark.id)
    }
}

fn plan(
    folder: &FolderItem,
    ranked: &[BookmarkItem],
    base: usize,
    mut layout: Vec<String>,
    order: PlanOrder,
) -> Plan {
    let positions: Box<dyn Iterator<Item = usize>> = match order {
        PlanOrder::Ascending => Box::new(0..ranked.len()),
        PlanOrder::Descending => Box::new((0..ranked.len()).rev()),
    };

    let mut commands = Vec::new();
    for position in positions {
        let bookmark = &ranked[position];
        let target = base + position;
        let Some(current) = layout.iter().position(|id| *id == bookmark.id) else {
            continue;
        };
        if current == target && bookmark.index == target {
            continue;
        }
        let id = layout.remove(current);
        layout.insert(target.min(layout.len()), id);
        commands.push(MoveCommand::new(bookmark.id.clone(), folder.id.clone(), target));
    }

    Plan { commands, layout }
}

/// Child ids in host order, subfolders and bookmarks merged by their external index.
fn current_layout(folder: &FolderItem) -> Vec<String> {
    let mut entries = folder
        .child_folders
        .iter()
        .map(|child| (child.order, 0u8, child.id.clone()))
        .chain(
            folder
                .children
                .iter()
                .map(|bookmark| (bookmark.index, 1u8, bookmark.id.clone())),
        )
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
    entries.into_iter().map(|(_, _, id)| id).collect()
}

fn ensure_same_bookmarks(folder: &FolderItem, ranked: &[BookmarkItem]) -> Result<()> {
    let expected = folder
        .children
        .iter()
        .map(|bookmark| bookmark.id.as_str())
        .collect::<HashSet<_>>();
    let provided = ranked
        .iter()
        .map(|bookmark| bookmark.id.as_str())
        .collect::<HashSet<_>>();
    if ranked.len() != folder.children.len() || expected != provided {
        return Err(ShelfError::Validation(format!(
            "ranked items do not match the bookmarks of folder {}",
            folder.id
        )));
    }
    Ok(())
}
