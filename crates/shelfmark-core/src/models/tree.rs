use serde::{Deserialize, Serialize};

/// Node shape exposed by the host bookmark store.
///
/// A node carrying `url` is a bookmark leaf. A node without `url` is a folder whose `children`
/// may be absent or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNode {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ExternalNode>>,
    #[serde(default)]
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<i64>,
}

impl ExternalNode {
    #[must_use]
    pub const fn is_bookmark(&self) -> bool {
        self.url.is_some()
    }

    #[must_use]
    pub fn child_nodes(&self) -> &[ExternalNode] {
        self.children.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkItem {
    pub id: String,
    pub url: String,
    /// Display title with the visit-count and tag suffixes removed.
    pub title: String,
    pub tags: Vec<String>,
    pub visit_count: u32,
    pub parent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<i64>,
    /// Position among all children of the parent in the host store.
    pub index: usize,
    /// Empty when the url has no parseable host.
    #[serde(default)]
    pub favicon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderItem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub children: Vec<BookmarkItem>,
    pub child_folders: Vec<FolderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<i64>,
    pub order: usize,
}

impl FolderItem {
    #[must_use]
    pub fn bookmark_count(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn subfolder_count(&self) -> usize {
        self.child_folders.len()
    }
}

/// Flat entry used by folder pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderChoice {
    pub id: String,
    pub title: String,
    pub depth: usize,
}
