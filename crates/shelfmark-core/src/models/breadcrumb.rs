use serde::{Deserialize, Serialize};

use super::FolderItem;

/// Cached "where the user is" record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreadcrumbState {
    pub selected_folder_id: String,
    pub path_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreSource {
    /// The cached selected folder still exists.
    Exact,
    /// The deepest still-resolvable prefix of the cached path was used.
    Prefix,
    /// Some later path entry resolved and the trail was rebuilt from parent links.
    ParentWalk,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoredPath {
    pub selected: FolderItem,
    /// Root-most folder first, `selected` last.
    pub path: Vec<FolderItem>,
    pub source: RestoreSource,
}

impl RestoredPath {
    #[must_use]
    pub fn path_ids(&self) -> Vec<String> {
        self.path.iter().map(|folder| folder.id.clone()).collect()
    }
}
