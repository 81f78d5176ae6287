use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use url::Url;

use crate::error::{Result, ShelfError};
use crate::models::{PageDetails, PageInfo, TabInfo};

const INTERNAL_PREFIXES: [&str; 4] = ["chrome://", "chrome-extension://", "edge://", "about:"];
const MAX_TITLE_KEYWORDS: usize = 5;
const MAX_KEYWORDS: usize = 8;

static WORD_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-_|,，。]+").expect("valid regex"));

/// Access to the page the user is looking at.
#[async_trait]
pub trait ActivePage: Send + Sync {
    async fn active_tab(&self) -> Result<Option<TabInfo>>;

    /// Probes the page itself; may fail when the page cannot be scripted.
    async fn page_details(&self, tab: &TabInfo) -> Result<PageDetails>;
}

/// Fixed tab and optional details, for hosts that know the page up front.
#[derive(Debug, Clone, Default)]
pub struct StaticPage {
    tab: Option<TabInfo>,
    details: Option<PageDetails>,
}

impl StaticPage {
    #[must_use]
    pub const fn new(tab: Option<TabInfo>, details: Option<PageDetails>) -> Self {
        Self { tab, details }
    }
}

#[async_trait]
impl ActivePage for StaticPage {
    async fn active_tab(&self) -> Result<Option<TabInfo>> {
        Ok(self.tab.clone())
    }

    async fn page_details(&self, tab: &TabInfo) -> Result<PageDetails> {
        self.details
            .clone()
            .ok_or_else(|| ShelfError::Store(format!("page cannot be probed: {}", tab.url)))
    }
}

#[must_use]
pub fn is_internal_page(url: &str) -> bool {
    INTERNAL_PREFIXES
        .iter()
        .any(|prefix| url.starts_with(prefix))
}

/// Keywords guessed from the tab title and host when the page cannot be probed.
#[must_use]
pub fn basic_keywords(title: &str, url: &str) -> Vec<String> {
    let mut candidates = WORD_SEPARATORS
        .split(title)
        .filter(|word| (2..20).contains(&word.chars().count()))
        .take(MAX_TITLE_KEYWORDS)
        .map(str::to_string)
        .collect::<Vec<_>>();

    if let Ok(parsed) = Url::parse(url)
        && let Some(host) = parsed.host_str()
    {
        let host = host.strip_prefix("www.").unwrap_or(host);
        if let Some(label) = host.split('.').next()
            && !label.is_empty()
        {
            candidates.push(label.to_string());
        }
    }

    let mut keywords = Vec::new();
    for candidate in candidates {
        if !keywords.contains(&candidate) {
            keywords.push(candidate);
        }
    }
    keywords.truncate(MAX_KEYWORDS);
    keywords
}

/// Active tab merged with page details.
///
/// Internal browser pages are never probed. A failed probe degrades to [`basic_keywords`].
pub async fn current_page_info<P>(page: &P) -> Result<PageInfo>
where
    P: ActivePage + ?Sized,
{
    let tab = page
        .active_tab()
        .await?
        .ok_or_else(|| ShelfError::NotFound("active page".to_string()))?;

    if is_internal_page(&tab.url) {
        return Ok(PageInfo::from_tab(
            tab,
            PageDetails {
                keywords: vec!["browser".to_string(), "system page".to_string()],
                ..PageDetails::default()
            },
        ));
    }

    match page.page_details(&tab).await {
        Ok(details) => Ok(PageInfo::from_tab(tab, details)),
        Err(err) => {
            tracing::warn!(url = %tab.url, error = %err, "page probe failed; using basic keywords");
            let keywords = basic_keywords(&tab.title, &tab.url);
            Ok(PageInfo::from_tab(
                tab,
                PageDetails {
                    keywords,
                    ..PageDetails::default()
                },
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(url: &str, title: &str) -> TabInfo {
        TabInfo {
            url: url.to_string(),
            title: title.to_string(),
            favicon: None,
        }
    }

    #[test]
    fn basic_keywords_take_title_words_and_host_label() {
        let keywords = basic_keywords(
            "Tokio - An asynchronous Rust runtime | docs",
            "https://www.tokio.rs/tokio/tutorial",
        );
        assert_eq!(keywords, vec!["Tokio", "An", "asynchronous", "Rust", "runtime", "tokio"]);
    }

    #[test]
    fn basic_keywords_drop_short_long_and_duplicate_words() {
        let long = "x".repeat(20);
        let title = format!("a {long} rust，rust。guide");
        let keywords = basic_keywords(&title, "not a url");
        assert_eq!(keywords, vec!["rust", "guide"]);
    }

    #[test]
    fn basic_keywords_cap_at_eight() {
        let keywords = basic_keywords(
            "one two three four five six seven eight nine",
            "https://news.example.com",
        );
        assert_eq!(keywords.len(), 6);
        assert_eq!(keywords.last().map(String::as_str), Some("news"));
    }

    #[tokio::test]
    async fn internal_pages_get_default_keywords_without_probe() {
        let page = StaticPage::new(
            Some(tab("chrome://settings", "Settings")),
            Some(PageDetails {
                description: "never used".to_string(),
                keywords: vec!["probe".to_string()],
                content: String::new(),
            }),
        );
        let info = current_page_info(&page).await.expect("info");
        assert_eq!(info.keywords, vec!["browser", "system page"]);
        assert!(info.description.is_empty());
    }

    #[tokio::test]
    async fn probe_failure_degrades_to_basic_keywords() {
        let page = StaticPage::new(Some(tab("https://docs.rs/serde", "serde - Rust")), None);
        let info = current_page_info(&page).await.expect("info");
        assert_eq!(info.keywords, vec!["serde", "Rust", "docs"]);
        assert_eq!(info.url, "https://docs.rs/serde");
    }

    #[tokio::test]
    async fn probe_details_are_merged() {
        let details = PageDetails {
            description: "Serialization framework".to_string(),
            keywords: vec!["serde".to_string()],
            content: "body".to_string(),
        };
        let page = StaticPage::new(Some(tab("https://serde.rs", "Serde")), Some(details.clone()));
        let info = current_page_info(&page).await.expect("info");
        assert_eq!(info.description, details.description);
        assert_eq!(info.keywords, details.keywords);
    }

    #[tokio::test]
    async fn missing_tab_is_an_error() {
        let err = current_page_info(&StaticPage::default())
            .await
            .expect_err("no tab");
        assert!(matches!(err, ShelfError::NotFound(_)));
    }
}
