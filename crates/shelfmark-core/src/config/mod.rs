use url::Url;

use crate::builder::DEFAULT_FAVICON_ENDPOINT;
use crate::error::{Result, ShelfError};
use crate::store::BOOKMARKS_BAR_ID;

mod env;

use env::{parse_enabled_default_true, parse_non_empty, parse_usize};

pub const ENV_DEFAULT_PARENT_ID: &str = "SHELFMARK_DEFAULT_PARENT_ID";
pub const ENV_SEARCH_LIMIT: &str = "SHELFMARK_SEARCH_LIMIT";
pub const ENV_FAVICON_ENDPOINT: &str = "SHELFMARK_FAVICON_ENDPOINT";
pub const ENV_AUTO_RESORT: &str = "SHELFMARK_AUTO_RESORT";
pub const ENV_REQUEST_LOG_CAPACITY: &str = "SHELFMARK_REQUEST_LOG_CAPACITY";

pub const DEFAULT_SEARCH_LIMIT: usize = 10;
pub const DEFAULT_REQUEST_LOG_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfConfig {
    /// Parent for new bookmarks and folders when a request names none.
    pub default_parent_id: String,
    /// Maximum number of hits of flat quick search.
    pub search_limit: usize,
    pub favicon_endpoint: String,
    /// Resort the parent folder after every open.
    pub auto_resort: bool,
    pub request_log_capacity: usize,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            default_parent_id: BOOKMARKS_BAR_ID.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            favicon_endpoint: DEFAULT_FAVICON_ENDPOINT.to_string(),
            auto_resort: true,
            request_log_capacity: DEFAULT_REQUEST_LOG_CAPACITY,
        }
    }
}

impl ShelfConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ShelfConfig::from_env`] with variables read through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let favicon_endpoint = parse_non_empty(lookup(ENV_FAVICON_ENDPOINT).as_deref())
            .unwrap_or_else(|| DEFAULT_FAVICON_ENDPOINT.to_string());
        validate_endpoint(&favicon_endpoint)?;

        Ok(Self {
            default_parent_id: parse_non_empty(lookup(ENV_DEFAULT_PARENT_ID).as_deref())
                .unwrap_or_else(|| BOOKMARKS_BAR_ID.to_string()),
            search_limit: parse_usize(lookup(ENV_SEARCH_LIMIT).as_deref(), DEFAULT_SEARCH_LIMIT, 1),
            favicon_endpoint,
            auto_resort: parse_enabled_default_true(lookup(ENV_AUTO_RESORT).as_deref()),
            request_log_capacity: parse_usize(
                lookup(ENV_REQUEST_LOG_CAPACITY).as_deref(),
                DEFAULT_REQUEST_LOG_CAPACITY,
                1,
            ),
        })
    }
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    match Url::parse(endpoint) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ShelfError::Validation(format!(
            "invalid {ENV_FAVICON_ENDPOINT}: {endpoint} (expected an http(s) url prefix)"
        ))),
    }
}
