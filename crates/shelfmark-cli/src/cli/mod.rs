use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod args;


pub use args::{
    AddArgs, CdArgs, IdArg, MkdirArgs, MoveArgs, RemoveArgs, RenameArgs, ReorderArgs,
    SearchArgs, ServeArgs, TagArgs,
};

#[derive(Debug, Parser)]
#[command(name = "shelfmark")]
#[command(about = "Bookmark tree with visit counts and tags kept in titles", version)]
pub struct Cli {
    /// Directory holding the bookmark snapshot and breadcrumb cache.
    #[arg(long, default_value = ".shelfmark")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Init,
    /// Print the raw host tree.
    Tree,
    /// List every folder, depth first.
    Folders,
    Search(SearchArgs),
    Add(AddArgs),
    Mkdir(MkdirArgs),
    /// Count a visit and resort the bookmark's folder.
    Open(IdArg),
    Resort(IdArg),
    Reorder(ReorderArgs),
    Mv(MoveArgs),
    Rename(RenameArgs),
    Tag(TagArgs),
    Rm(RemoveArgs),
    /// Select a folder; without an id the selection is cleared.
    Cd(CdArgs),
    /// Show the restored folder selection.
    Pwd,
    /// Answer JSON-lines protocol requests on stdin.
    Serve(ServeArgs),
}
