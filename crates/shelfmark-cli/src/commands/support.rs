use std::io::{self, Write};

use anyhow::Result;
use shelfmark_core::StaticPage;
use shelfmark_core::models::{PageDetails, TabInfo};

use crate::cli::ServeArgs;

pub(super) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// The page `serve` reports as active. Without a description the page probe fails, which
/// exercises the keyword fallback.
pub(super) fn static_page(args: &ServeArgs) -> StaticPage {
    let tab = args.tab_url.as_ref().map(|url| TabInfo {
        url: url.clone(),
        title: args.tab_title.clone().unwrap_or_default(),
        favicon: None,
    });
    let details = args.description.as_ref().map(|description| PageDetails {
        description: description.clone(),
        keywords: args.keywords.clone(),
        content: String::new(),
    });
    StaticPage::new(tab, details)
}
