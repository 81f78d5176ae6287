use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requests accepted from the UI shell, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ProtocolRequest {
    GetBookmarks,
    GetCurrentPageInfo,
    AddBookmark {
        title: String,
        url: String,
        #[serde(default)]
        parent_id: Option<String>,
        #[serde(default)]
        keywords: Vec<String>,
    },
    CreateFolder {
        title: String,
        #[serde(default)]
        parent_id: Option<String>,
    },
    MoveBookmark {
        id: String,
        parent_id: String,
        #[serde(default)]
        index: Option<usize>,
    },
}

impl ProtocolRequest {
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::GetBookmarks => "getBookmarks",
            Self::GetCurrentPageInfo => "getCurrentPageInfo",
            Self::AddBookmark { .. } => "addBookmark",
            Self::CreateFolder { .. } => "createFolder",
            Self::MoveBookmark { .. } => "moveBookmark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProtocolResponse {
    #[must_use]
    pub const fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Active tab as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

/// Page details extracted inside the page itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDetails {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    pub description: String,
    pub keywords: Vec<String>,
    pub content: String,
}

impl PageInfo {
    #[must_use]
    pub fn from_tab(tab: TabInfo, details: PageDetails) -> Self {
        Self {
            url: tab.url,
            title: tab.title,
            favicon: tab.favicon,
            description: details.description,
            keywords: details.keywords,
            content: details.content,
        }
    }
}
