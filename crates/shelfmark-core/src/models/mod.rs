mod breadcrumb;
mod command;
mod protocol;
mod request_log;
mod search;
mod tree;

pub use breadcrumb::{BreadcrumbState, RestoreSource, RestoredPath};
pub use command::{
    CreateNode, MoveCommand, MoveDestination, NodeChanges, ResortOutcome, VisitOutcome,
};
pub use protocol::{PageDetails, PageInfo, ProtocolRequest, ProtocolResponse, TabInfo};
pub use request_log::RequestLogEntry;
pub use search::Span;
pub use tree::{BookmarkItem, ExternalNode, FolderChoice, FolderItem};
