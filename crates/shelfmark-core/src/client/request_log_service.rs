use std::time::Instant;

use chrono::Utc;

use crate::breadcrumb::BreadcrumbCache;
use crate::error::{Result, ShelfError};
use crate::models::RequestLogEntry;
use crate::store::BookmarkStore;

use super::Shelfmark;

impl<S: BookmarkStore, C: BreadcrumbCache> Shelfmark<S, C> {
    pub(super) fn try_log_request(&self, entry: RequestLogEntry) {
        let Ok(mut log) = self.request_log.lock() else {
            tracing::warn!(operation = %entry.operation, "request log mutex poisoned");
            return;
        };
        while log.len() >= self.config.request_log_capacity {
            log.pop_front();
        }
        log.push_back(entry);
    }

    pub(super) fn log_request_status(
        &self,
        request_id: String,
        operation: &str,
        status: &str,
        started: Instant,
        target_id: Option<String>,
        details: Option<serde_json::Value>,
    ) {
        self.try_log_request(RequestLogEntry {
            request_id,
            operation: operation.to_string(),
            status: status.to_string(),
            latency_ms: started.elapsed().as_millis(),
            created_at: Utc::now().to_rfc3339(),
            target_id,
            error_code: None,
            error_message: None,
            details,
        });
    }

    pub(super) fn log_request_error(
        &self,
        request_id: String,
        operation: &str,
        started: Instant,
        target_id: Option<String>,
        err: &ShelfError,
        details: Option<serde_json::Value>,
    ) {
        tracing::debug!(operation, code = err.code(), error = %err, "operation failed");
        self.try_log_request(RequestLogEntry {
            request_id,
            operation: operation.to_string(),
            status: "error".to_string(),
            latency_ms: started.elapsed().as_millis(),
            created_at: Utc::now().to_rfc3339(),
            target_id,
            error_code: Some(err.code().to_string()),
            error_message: Some(err.to_string()),
            details,
        });
    }

    pub(super) fn log_request_warning(
        &self,
        request_id: String,
        operation: &str,
        started: Instant,
        target_id: Option<String>,
        warning_message: &str,
        details: Option<serde_json::Value>,
    ) {
        self.try_log_request(RequestLogEntry {
            request_id,
            operation: operation.to_string(),
            status: "warning".to_string(),
            latency_ms: started.elapsed().as_millis(),
            created_at: Utc::now().to_rfc3339(),
            target_id,
            error_code: None,
            error_message: Some(warning_message.to_string()),
            details,
        });
    }

    /// Logs `output` as `ok` or `error` without details and passes it through.
    pub(super) fn record<T>(
        &self,
        operation: &str,
        started: Instant,
        target_id: Option<String>,
        output: Result<T>,
    ) -> Result<T> {
        let request_id = uuid::Uuid::new_v4().to_string();
        match &output {
            Ok(_) => self.log_request_status(request_id, operation, "ok", started, target_id, None),
            Err(err) => self.log_request_error(request_id, operation, started, target_id, err, None),
        }
        output
    }

    pub fn list_request_logs(&self, limit: usize) -> Result<Vec<RequestLogEntry>> {
        self.list_request_logs_filtered(limit, None, None)
    }

    /// Newest first. Filters compare case-insensitively; blank filters are ignored.
    pub fn list_request_logs_filtered(
        &self,
        limit: usize,
        operation: Option<&str>,
        status: Option<&str>,
    ) -> Result<Vec<RequestLogEntry>> {
        let operation = operation.map(str::trim).filter(|x| !x.is_empty());
        let status = status.map(str::trim).filter(|x| !x.is_empty());
        let log = self
            .request_log
            .lock()
            .map_err(|_| ShelfError::Internal("request log mutex poisoned".to_string()))?;

        let mut entries = Vec::new();
        for entry in log.iter().rev() {
            if let Some(op) = operation
                && !entry.operation.eq_ignore_ascii_case(op)
            {
                continue;
            }
            if let Some(st) = status
                && !entry.status.eq_ignore_ascii_case(st)
            {
                continue;
            }
            entries.push(entry.clone());
            if entries.len() >= limit.max(1) {
                break;
            }
        }
        Ok(entries)
    }
}
