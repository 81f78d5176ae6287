use regex::RegexBuilder;

use crate::models::{BookmarkItem, FolderItem, Span};

/// Every bookmark of `folder` and all of its descendants, own bookmarks first.
#[must_use]
pub fn collect(folder: &FolderItem) -> Vec<BookmarkItem> {
    let mut out = Vec::new();
    collect_into(folder, &mut out);
    out
}

fn collect_into(folder: &FolderItem, out: &mut Vec<BookmarkItem>) {
    out.extend(folder.children.iter().cloned());
    for child in &folder.child_folders {
        collect_into(child, out);
    }
}

/// Bookmarks of the whole forest in tree order.
#[must_use]
pub fn collect_forest(forest: &[FolderItem]) -> Vec<BookmarkItem> {
    let mut out = Vec::new();
    for folder in forest {
        collect_into(folder, &mut out);
    }
    out
}

/// Case-insensitive substring match over title, url and tags.
#[must_use]
pub fn bookmark_matches(item: &BookmarkItem, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    contains_folded(&item.title, &needle)
        || contains_folded(&item.url, &needle)
        || item.tags.iter().any(|tag| contains_folded(tag, &needle))
}

#[must_use]
pub fn filter(items: &[BookmarkItem], query: &str) -> Vec<BookmarkItem> {
    if query.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| bookmark_matches(item, query))
        .cloned()
        .collect()
}

/// A folder matches when its own title does or when any bookmark below it does.
#[must_use]
pub fn folder_matches(folder: &FolderItem, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    contains_folded(&folder.title, &query.to_lowercase()) || subtree_has_match(folder, query)
}

fn subtree_has_match(folder: &FolderItem, query: &str) -> bool {
    folder
        .children
        .iter()
        .any(|item| bookmark_matches(item, query))
        || folder
            .child_folders
            .iter()
            .any(|child| subtree_has_match(child, query))
}

#[must_use]
pub fn filter_folders(folders: &[FolderItem], query: &str) -> Vec<FolderItem> {
    folders
        .iter()
        .filter(|folder| folder_matches(folder, query))
        .cloned()
        .collect()
}

/// Flat quick search over the whole forest, truncated to `limit`.
#[must_use]
pub fn search_forest(forest: &[FolderItem], query: &str, limit: usize) -> Vec<BookmarkItem> {
    let mut hits = filter(&collect_forest(forest), query);
    hits.truncate(limit);
    hits
}

/// Splits `text` into alternating plain and matched spans.
///
/// Matching is case-insensitive on the literal query; the returned span texts concatenate back
/// to `text`.
#[must_use]
pub fn highlight(text: &str, query: &str) -> Vec<Span> {
    if query.is_empty() {
        return vec![Span::plain(text)];
    }
    let pattern = match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(err) => {
            tracing::warn!(error = %err, "highlight pattern rejected");
            return vec![Span::plain(text)];
        }
    };

    let mut spans = Vec::new();
    let mut cursor = 0;
    for found in pattern.find_iter(text) {
        if found.start() > cursor {
            spans.push(Span::plain(&text[cursor..found.start()]));
        }
        spans.push(Span::matched(found.as_str()));
        cursor = found.end();
    }
    if cursor < text.len() || spans.is_empty() {
        spans.push(Span::plain(&text[cursor..]));
    }
    spans
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}
