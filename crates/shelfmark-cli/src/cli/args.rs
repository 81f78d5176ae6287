use clap::Args;

#[derive(Debug, Args)]
pub struct IdArg {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(allow_hyphen_values = true)]
    pub query: String,
    /// Match folders (by own title or nested content) instead of bookmarks.
    #[arg(long, default_value_t = false)]
    pub folders: bool,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub url: String,
    /// Display title; the url is used when omitted.
    #[arg(long, default_value = "")]
    pub title: String,
    /// Parent folder id; defaults to `SHELFMARK_DEFAULT_PARENT_ID` or the bookmarks bar.
    #[arg(long)]
    pub parent: Option<String>,
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
}

#[derive(Debug, Args)]
pub struct MkdirArgs {
    pub title: String,
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Debug, Args)]
pub struct ReorderArgs {
    pub folder_id: String,
    pub from: usize,
    pub to: usize,
    /// Positions count subfolders instead of bookmarks.
    #[arg(long, default_value_t = false)]
    pub folders: bool,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    pub id: String,
    pub parent_id: String,
    /// Final position under the new parent; appends when omitted.
    #[arg(long)]
    pub index: Option<usize>,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Args)]
pub struct TagArgs {
    pub id: String,
    /// Replacement tags; none clears them.
    pub tags: Vec<String>,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    pub id: String,
    /// Remove a folder with everything below it.
    #[arg(long, default_value_t = false)]
    pub recursive: bool,
}

#[derive(Debug, Args)]
pub struct CdArgs {
    pub folder_id: Option<String>,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Url of the page reported as active; no active page when omitted.
    #[arg(long)]
    pub tab_url: Option<String>,
    #[arg(long, requires = "tab_url")]
    pub tab_title: Option<String>,
    /// Page description reported by the page probe; the probe fails when unset.
    #[arg(long, requires = "tab_url")]
    pub description: Option<String>,
    #[arg(long = "keyword", value_name = "KEYWORD", requires = "description")]
    pub keywords: Vec<String>,
    /// Print the request log to stderr when stdin closes.
    #[arg(long, default_value_t = false)]
    pub print_request_log: bool,
}
