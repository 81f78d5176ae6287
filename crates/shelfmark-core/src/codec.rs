//! Packing of visit counts and tags into the host's single title field.
//!
//! Encoded form: `display [" (N)"] [" #tag1, tag2, ..."]`. Decoding peels the tag suffix first
//! and then the visit-count suffix from what remains, so the two suffixes never shadow each
//! other. Titles that carry neither suffix come back untouched.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MAX_PERSISTED_TAGS: usize = 5;

static TAG_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*#(.+)$").expect("valid regex"));
static COUNT_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*\((\d+)\)\s*$").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedTitle {
    pub display_title: String,
    pub tags: Vec<String>,
    pub visit_count: u32,
}

impl DecodedTitle {
    #[must_use]
    pub fn encode(&self) -> String {
        encode_title(&self.display_title, self.visit_count, &self.tags)
    }

    /// Same title and tags, one more visit.
    #[must_use]
    pub fn visited(&self) -> Self {
        Self {
            display_title: self.display_title.clone(),
            tags: self.tags.clone(),
            visit_count: self.visit_count.saturating_add(1),
        }
    }
}

/// Never fails: anything the grammar does not recognize is the display title itself.
#[must_use]
pub fn decode_title(title: &str) -> DecodedTitle {
    let mut matched = false;
    let mut remainder = title;
    let mut tags = Vec::new();

    if let Some(caps) = TAG_SUFFIX.captures(title) {
        let parsed = split_tags(caps.get(2).map_or("", |m| m.as_str()));
        if !parsed.is_empty() {
            matched = true;
            tags = parsed;
            remainder = caps.get(1).map_or("", |m| m.as_str());
        }
    }

    let mut visit_count = 0;
    if let Some(caps) = COUNT_SUFFIX.captures(remainder)
        && let Some(count) = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok())
    {
        matched = true;
        visit_count = count;
        remainder = caps.get(1).map_or("", |m| m.as_str());
    }

    if !matched {
        return DecodedTitle {
            display_title: title.to_string(),
            tags: Vec::new(),
            visit_count: 0,
        };
    }

    DecodedTitle {
        display_title: remainder.trim().to_string(),
        tags,
        visit_count,
    }
}

#[must_use]
pub fn encode_title<S: AsRef<str>>(display_title: &str, visit_count: u32, tags: &[S]) -> String {
    let mut out = display_title.trim().to_string();
    if visit_count > 0 {
        let _ = write!(out, " ({visit_count})");
    }
    let tags = normalize_tags(tags);
    if !tags.is_empty() {
        out.push_str(" #");
        out.push_str(&tags.join(", "));
    }
    out
}

/// Trimmed, non-empty, first occurrence of each tag, capped at [`MAX_PERSISTED_TAGS`].
#[must_use]
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    distinct(tags.iter().map(|tag| tag.as_ref().trim()))
        .into_iter()
        .take(MAX_PERSISTED_TAGS)
        .collect()
}

fn split_tags(raw: &str) -> Vec<String> {
    distinct(raw.split(|ch: char| ch == ',' || ch.is_whitespace()).map(str::trim))
}

fn distinct<'a>(tags: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.filter(|tag| !tag.is_empty() && seen.insert(*tag))
        .map(str::to_string)
        .collect()
}
