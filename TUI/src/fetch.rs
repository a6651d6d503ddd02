// Page metadata fetching: one GET, best-effort HTML extraction

use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use scraper::{Html, Selector};

use crate::citation::{PageMetadata, UNKNOWN};

#[derive(Debug)]
pub enum FetchError {
    Request(String),
    Status(u16),
    Body(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Request(e) => write!(f, "request failed: {}", e),
            FetchError::Status(code) => write!(f, "HTTP status {}", code),
            FetchError::Body(e) => write!(f, "could not read body: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

pub fn build_client(timeout: Duration, user_agent: &str) -> Client {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .unwrap_or_else(|e| {
            warn!("falling back to default HTTP client: {}", e);
            Client::new()
        })
}

/// Fetch `url` and extract its metadata.
///
/// Any failure yields [`PageMetadata::invalid_url`]; the cause is only logged.
pub async fn fetch_metadata(client: &Client, url: &str) -> PageMetadata {
    match fetch_html(client, url).await {
        Ok(html) => {
            let meta = extract_metadata(&html);
            debug!("fetched {}: {:?}", url, meta);
            meta
        }
        Err(e) => {
            warn!("fetch {} failed: {}", url, e);
            PageMetadata::invalid_url()
        }
    }
}

async fn fetch_html(client: &Client, url: &str) -> Result<String, FetchError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Request(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    resp.text().await.map_err(|e| FetchError::Body(e.to_string()))
}

/// Pull title, author and publish date out of an HTML document.
pub fn extract_metadata(html: &str) -> PageMetadata {
    let doc = Html::parse_document(html);

    let title = select_first(&doc, "title")
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string());

    PageMetadata {
        title,
        author: meta_content(&doc, r#"meta[name="author"]"#),
        date_published: meta_content(&doc, r#"meta[name="datePublished"]"#),
    }
}

fn select_first<'a>(doc: &'a Html, selector: &str) -> Option<scraper::ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector).next()
}

fn meta_content(doc: &Html, selector: &str) -> String {
    select_first(doc, selector)
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
