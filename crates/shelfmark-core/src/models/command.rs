use serde::{Deserialize, Serialize};

/// One external "move to index" instruction.
///
/// `index` is the final position of the node among the children of `parent_id` once the move
/// has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCommand {
    pub node_id: String,
    pub parent_id: String,
    pub index: usize,
}

impl MoveCommand {
    #[must_use]
    pub fn new(node_id: impl Into<String>, parent_id: impl Into<String>, index: usize) -> Self {
        Self {
            node_id: node_id.into(),
            parent_id: parent_id.into(),
            index,
        }
    }

    #[must_use]
    pub fn destination(&self) -> MoveDestination {
        MoveDestination {
            parent_id: Some(self.parent_id.clone()),
            index: Some(self.index),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDestination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNode {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub parent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl CreateNode {
    #[must_use]
    pub fn bookmark(
        title: impl Into<String>,
        url: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: Some(url.into()),
            parent_id: parent_id.into(),
            index: None,
        }
    }

    #[must_use]
    pub fn folder(title: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: None,
            parent_id: parent_id.into(),
            index: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NodeChanges {
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResortOutcome {
    pub folder_id: String,
    pub commands: Vec<MoveCommand>,
    pub applied: usize,
}

impl ResortOutcome {
    #[must_use]
    pub fn issued(&self) -> usize {
        self.commands.len()
    }
}

/// Result of opening a bookmark: the bookmark with its new count and the resort that followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitOutcome {
    pub bookmark: super::BookmarkItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resort: Option<ResortOutcome>,
}
