use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::breadcrumb::BreadcrumbCache;
use crate::error::{Result, ShelfError};
use crate::models::{ProtocolRequest, ProtocolResponse};
use crate::page::{ActivePage, current_page_info};
use crate::store::BookmarkStore;

use super::Shelfmark;

const KNOWN_ACTIONS: [&str; 5] = [
    "getBookmarks",
    "getCurrentPageInfo",
    "addBookmark",
    "createFolder",
    "moveBookmark",
];

impl<S: BookmarkStore, C: BreadcrumbCache> Shelfmark<S, C> {
    /// Answers one UI request. Failures become `{success: false, error}` responses.
    pub async fn handle<P>(&self, request: ProtocolRequest, page: &P) -> ProtocolResponse
    where
        P: ActivePage + ?Sized,
    {
        let action = request.action();
        match self.dispatch(request, page).await {
            Ok(data) => ProtocolResponse::ok(data),
            Err(err) => {
                tracing::warn!(action, code = err.code(), error = %err, "protocol request failed");
                ProtocolResponse::failure(err.to_string())
            }
        }
    }

    /// Same as [`Shelfmark::handle`] for one raw JSON request.
    pub async fn handle_json<P>(&self, raw: &str, page: &P) -> ProtocolResponse
    where
        P: ActivePage + ?Sized,
    {
        match parse_request(raw) {
            Ok(request) => self.handle(request, page).await,
            Err(err) => {
                let started = Instant::now();
                self.log_request_error(
                    uuid::Uuid::new_v4().to_string(),
                    "protocol",
                    started,
                    None,
                    &err,
                    None,
                );
                ProtocolResponse::failure(err.to_string())
            }
        }
    }

    async fn dispatch<P>(&self, request: ProtocolRequest, page: &P) -> Result<Value>
    where
        P: ActivePage + ?Sized,
    {
        match request {
            ProtocolRequest::GetBookmarks => {
                self.reload().await?;
                let root = self
                    .read_snapshot(|snapshot| snapshot.map(|loaded| loaded.root.clone()))?
                    .ok_or_else(|| ShelfError::Internal("tree snapshot missing".to_string()))?;
                to_data(&[root])
            }
            ProtocolRequest::GetCurrentPageInfo => {
                let started = Instant::now();
                let info = current_page_info(page).await;
                let info = self.record("get_current_page_info", started, None, info)?;
                to_data(&info)
            }
            ProtocolRequest::AddBookmark {
                title,
                url,
                parent_id,
                keywords,
            } => to_data(
                &self
                    .add_bookmark(&title, &url, parent_id.as_deref(), &keywords)
                    .await?,
            ),
            ProtocolRequest::CreateFolder { title, parent_id } => {
                to_data(&self.create_folder(&title, parent_id.as_deref()).await?)
            }
            ProtocolRequest::MoveBookmark {
                id,
                parent_id,
                index,
            } => to_data(&self.reparent(&id, &parent_id, index).await?),
        }
    }
}

fn to_data<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn parse_request(raw: &str) -> Result<ProtocolRequest> {
    let value = serde_json::from_str::<Value>(raw)?;
    let action = value
        .get("action")
        .and_then(Value::as_str)
        .map(str::to_string);
    match action {
        Some(action) if !KNOWN_ACTIONS.contains(&action.as_str()) => Err(ShelfError::Validation(
            format!("unknown action: {action}"),
        )),
        None => Err(ShelfError::Validation(
            "request has no action".to_string(),
        )),
        Some(_) => Ok(serde_json::from_value::<ProtocolRequest>(value)?),
    }
}
