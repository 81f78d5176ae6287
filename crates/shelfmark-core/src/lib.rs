// Public fallible APIs in this crate share one concrete error contract (`ShelfError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod breadcrumb;
pub mod builder;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod forest;
pub mod models;
pub mod page;
pub mod ranking;
pub mod search;
pub mod store;
pub mod sync;

pub use breadcrumb::{
    BreadcrumbCache, MemoryBreadcrumbCache, PathPersistence, SqliteBreadcrumbCache,
};
pub use builder::TreeBuilder;
pub use client::Shelfmark;
pub use codec::{DecodedTitle, decode_title, encode_title};
pub use config::ShelfConfig;
pub use error::{ErrorPayload, Result, ShelfError};
pub use page::{ActivePage, StaticPage};
pub use store::{BookmarkStore, MemoryBookmarkStore};
