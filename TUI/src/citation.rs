//! Citation formatting for APA, MLA and Chicago styles.

use std::sync::LazyLock;

use chrono::{DateTime, TimeZone};
use regex::Regex;

pub const UNKNOWN: &str = "Unknown";
pub const INVALID_STYLE: &str = "Invalid citation style.";

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?([a-zA-Z0-9-]+)\.[a-zA-Z]{2,}(?:/|$)")
        .expect("domain pattern is valid")
});

/// Metadata scraped from a page. Missing fields hold `"Unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub author: String,
    pub date_published: String,
}

impl PageMetadata {
    pub fn new(title: impl Into<String>, author: impl Into<String>, date_published: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            date_published: date_published.into(),
        }
    }

    /// Returned when the page could not be fetched at all.
    pub fn invalid_url() -> Self {
        Self::new("Invalid URL", UNKNOWN, UNKNOWN)
    }
}

impl Default for PageMetadata {
    fn default() -> Self {
        Self::new(UNKNOWN, UNKNOWN, UNKNOWN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationStyle {
    Apa,
    Mla,
    Chicago,
}

impl CitationStyle {
    pub const ALL: [CitationStyle; 3] = [CitationStyle::Apa, CitationStyle::Mla, CitationStyle::Chicago];

    pub fn name(self) -> &'static str {
        match self {
            CitationStyle::Apa => "APA",
            CitationStyle::Mla => "MLA",
            CitationStyle::Chicago => "Chicago",
        }
    }

    /// Exact, case-sensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.name() == name)
    }

    pub fn next(self) -> Self {
        match self {
            CitationStyle::Apa => CitationStyle::Mla,
            CitationStyle::Mla => CitationStyle::Chicago,
            CitationStyle::Chicago => CitationStyle::Apa,
        }
    }

    fn render<Tz: TimeZone>(self, meta: &PageMetadata, url: &str, accessed: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let domain = site_name(url);
        match self {
            CitationStyle::Apa => {
                let year = if meta.date_published == UNKNOWN {
                    "n.d.".to_string()
                } else {
                    meta.date_published.chars().take(4).collect()
                };
                format!(
                    "{}. ({}). {}. {}. Retrieved from {}",
                    meta.author, year, meta.title, domain, url
                )
            }
            CitationStyle::Mla => format!(
                "{}. \"{}.\" {}, {}, {}. Accessed {}.",
                meta.author,
                meta.title,
                domain,
                meta.date_published,
                url,
                format_accessed(accessed)
            ),
            CitationStyle::Chicago => format!(
                "{}. \"{}.\" {}. {}. {}.",
                meta.author, meta.title, domain, meta.date_published, url
            ),
        }
    }
}

/// Format a citation for the style named `style`.
///
/// Unknown style names produce [`INVALID_STYLE`] rather than an error.
pub fn format_citation<Tz: TimeZone>(meta: &PageMetadata, url: &str, style: &str, accessed: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match CitationStyle::from_name(style) {
        Some(style) => style.render(meta, url, accessed),
        None => INVALID_STYLE.to_string(),
    }
}

/// Second-level label of the URL's host, capitalized; `"Unknown"` when the
/// URL has no recognizable `label.tld` part.
pub fn site_name(url: &str) -> String {
    DOMAIN_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|label| capitalize(label.as_str()))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// `DD Mon YYYY, HH:MM AM/PM`
pub fn format_accessed<Tz: TimeZone>(accessed: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    accessed.format("%d %b %Y, %I:%M %p").to_string()
}
