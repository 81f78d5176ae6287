use url::Url;

use crate::codec::decode_title;
use crate::models::{BookmarkItem, ExternalNode, FolderItem};

pub const DEFAULT_FAVICON_ENDPOINT: &str = "https://www.google.com/s2/favicons?domain=";

/// Folder or bookmark produced from one external node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltNode {
    Folder(FolderItem),
    Bookmark(BookmarkItem),
}

/// Turns a host tree snapshot into the derived folder hierarchy.
///
/// Every level goes through [`TreeBuilder::build_node`], so nesting depth is whatever the
/// host tree has. Output is a pure function of the snapshot: children are ordered by their
/// external `index` and nothing outside `self` is consulted.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    favicon_endpoint: String,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_FAVICON_ENDPOINT)
    }
}

impl TreeBuilder {
    #[must_use]
    pub fn new(favicon_endpoint: impl Into<String>) -> Self {
        Self {
            favicon_endpoint: favicon_endpoint.into(),
        }
    }

    /// Direct folder children of `root`, each populated to full depth.
    #[must_use]
    pub fn build(&self, root: &ExternalNode) -> Vec<FolderItem> {
        ordered_children(root)
            .into_iter()
            .filter_map(|child| match self.build_node(child, &root.id) {
                BuiltNode::Folder(folder) => Some(folder),
                BuiltNode::Bookmark(_) => None,
            })
            .collect()
    }

    /// `root` itself as a folder, including bookmarks placed directly under it.
    #[must_use]
    pub fn build_root(&self, root: &ExternalNode) -> FolderItem {
        self.build_folder(root, root.parent_id.as_deref())
    }

    pub fn build_node(&self, node: &ExternalNode, parent_id: &str) -> BuiltNode {
        match node.url.as_deref() {
            Some(url) => BuiltNode::Bookmark(self.build_bookmark(node, url, parent_id)),
            None => BuiltNode::Folder(self.build_folder(node, Some(parent_id))),
        }
    }

    fn build_folder(&self, node: &ExternalNode, parent_id: Option<&str>) -> FolderItem {
        let mut children = Vec::new();
        let mut child_folders = Vec::new();
        for child in ordered_children(node) {
            match self.build_node(child, &node.id) {
                BuiltNode::Folder(folder) => child_folders.push(folder),
                BuiltNode::Bookmark(bookmark) => children.push(bookmark),
            }
        }

        FolderItem {
            id: node.id.clone(),
            title: node.title.clone(),
            parent_id: node
                .parent_id
                .clone()
                .or_else(|| parent_id.map(str::to_string)),
            children,
            child_folders,
            date_added: node.date_added,
            order: node.index,
        }
    }

    fn build_bookmark(&self, node: &ExternalNode, url: &str, parent_id: &str) -> BookmarkItem {
        let decoded = decode_title(&node.title);
        BookmarkItem {
            id: node.id.clone(),
            url: url.to_string(),
            title: decoded.display_title,
            tags: decoded.tags,
            visit_count: decoded.visit_count,
            parent_id: node
                .parent_id
                .clone()
                .unwrap_or_else(|| parent_id.to_string()),
            date_added: node.date_added,
            index: node.index,
            favicon: favicon_url(&self.favicon_endpoint, url),
        }
    }
}

/// Best-effort favicon location; empty when the url has no parseable host.
#[must_use]
pub fn favicon_url(endpoint: &str, url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .host_str()
            .map(|host| format!("{endpoint}{host}"))
            .unwrap_or_default(),
        Err(err) => {
            tracing::debug!(%url, error = %err, "favicon skipped for malformed url");
            String::new()
        }
    }
}

fn ordered_children(node: &ExternalNode) -> Vec<&ExternalNode> {
    let mut children = node.child_nodes().iter().collect::<Vec<_>>();
    children.sort_by_key(|child| child.index);
    children
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: &str, index: usize, children: Vec<ExternalNode>) -> ExternalNode {
        ExternalNode {
            id: id.to_string(),
            title: format!("folder {id}"),
            url: None,
            parent_id: None,
            children: Some(children),
            index,
            date_added: Some(1_700_000_000_000),
        }
    }

    fn bookmark(id: &str, index: usize, title: &str, url: &str) -> ExternalNode {
        ExternalNode {
            id: id.to_string(),
            title: title.to_string(),
            url: Some(url.to_string()),
            parent_id: None,
            children: None,
            index,
            date_added: None,
        }
    }

    /// Chain of `depth` folders, each holding one bookmark and the next folder.
    fn chain(depth: usize, level: usize) -> ExternalNode {
        let mut children = vec![bookmark(
            &format!("b{level}"),
            0,
            &format!("Leaf {level} ({level}) #depth"),
            "https://example.com/leaf",
        )];
        if level + 1 < depth {
            let mut next = chain(depth, level + 1);
            next.index = 1;
            children.push(next);
        }
        folder(&format!("f{level}"), 0, children)
    }

    fn assert_mirrors(external: &ExternalNode, built: &FolderItem) {
        assert_eq!(built.id, external.id);
        let folders = external
            .child_nodes()
            .iter()
            .filter(|node| !node.is_bookmark())
            .collect::<Vec<_>>();
        let bookmarks = external
            .child_nodes()
            .iter()
            .filter(|node| node.is_bookmark())
            .collect::<Vec<_>>();
        assert_eq!(built.child_folders.len(), folders.len());
        assert_eq!(built.children.len(), bookmarks.len());
        for (node, item) in bookmarks.iter().zip(&built.children) {
            assert_eq!(item.id, node.id);
            assert_eq!(item.parent_id, external.id);
        }
        for (node, item) in folders.iter().zip(&built.child_folders) {
            assert_eq!(item.parent_id.as_deref(), Some(external.id.as_str()));
            assert_mirrors(node, item);
        }
    }

    #[test]
    fn build_partitions_children_at_every_depth() {
        for depth in [1, 2, 3, 7, 40] {
            let root = folder("0", 0, vec![chain(depth, 0)]);
            let forest = TreeBuilder::default().build(&root);
            assert_eq!(forest.len(), 1);
            assert_mirrors(&root.child_nodes()[0], &forest[0]);
        }
    }

    #[test]
    fn build_returns_only_folders_of_root_in_index_order() {
        let root = folder(
            "0",
            0,
            vec![
                folder("2", 1, vec![]),
                bookmark("9", 2, "stray", "https://example.com"),
                folder("1", 0, vec![]),
            ],
        );
        let forest = TreeBuilder::default().build(&root);
        let ids = forest.iter().map(|f| f.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(forest[1].order, 1);
    }

    #[test]
    fn bookmarks_are_decoded() {
        let root = folder(
            "0",
            0,
            vec![folder(
                "1",
                0,
                vec![bookmark("5", 0, "Acme Docs (3) #docs, api", "https://acme.dev/docs")],
            )],
        );
        let forest = TreeBuilder::default().build(&root);
        let item = &forest[0].children[0];
        assert_eq!(item.title, "Acme Docs");
        assert_eq!(item.visit_count, 3);
        assert_eq!(item.tags, vec!["docs", "api"]);
        assert_eq!(item.favicon, format!("{DEFAULT_FAVICON_ENDPOINT}acme.dev"));
    }

    #[test]
    fn malformed_url_keeps_bookmark_with_empty_favicon() {
        let root = folder(
            "0",
            0,
            vec![folder(
                "1",
                0,
                vec![
                    bookmark("5", 0, "Broken", "not a url"),
                    bookmark("6", 1, "Script", "javascript:void(0)"),
                ],
            )],
        );
        let forest = TreeBuilder::default().build(&root);
        assert_eq!(forest[0].children.len(), 2);
        assert!(forest[0].children.iter().all(|item| item.favicon.is_empty()));
    }

    #[test]
    fn build_is_deterministic() {
        let root = folder("0", 0, vec![chain(5, 0), folder("x", 1, vec![])]);
        let builder = TreeBuilder::default();
        assert_eq!(builder.build(&root), builder.build(&root));
    }

    #[test]
    fn build_root_keeps_root_bookmarks() {
        let root = folder(
            "0",
            0,
            vec![folder("1", 0, vec![]), bookmark("9", 1, "stray", "https://example.com")],
        );
        let whole = TreeBuilder::default().build_root(&root);
        assert_eq!(whole.child_folders.len(), 1);
        assert_eq!(whole.children.len(), 1);
        assert_eq!(whole.parent_id, None);
    }
}
