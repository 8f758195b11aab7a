//! Job description acquisition: fetch a posting page and keep its visible text.

use reqwest::{Client, Url};
use scraper::{Html, Node};
use thiserror::Error;
use tracing::{info, warn};

pub const FETCH_ERROR_PREFIX: &str = "Error fetching job description: ";

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head", "svg"];

#[derive(Debug, Error)]
enum FetchError {
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("page has no visible text")]
    Empty,
}

/// A fetched job description. `text` holds either the page text or an
/// inline error message; `ok` tells which.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub text: String,
    pub ok: bool,
}

/// Fetches `url` and returns its visible text. Failures are returned as a
/// `FETCH_ERROR_PREFIX` message in `text` with `ok == false`.
pub async fn fetch_job_description(client: &Client, url: &str) -> FetchedPage {
    match try_fetch(client, url).await {
        Ok(text) => {
            info!("Fetched job description from {url} ({} chars)", text.len());
            FetchedPage {
                url: url.to_string(),
                text,
                ok: true,
            }
        }
        Err(e) => {
            warn!("Failed to fetch job description from {url}: {e}");
            FetchedPage {
                url: url.to_string(),
                text: format!("{FETCH_ERROR_PREFIX}{e}"),
                ok: false,
            }
        }
    }
}

async fn try_fetch(client: &Client, url: &str) -> Result<String, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(url.to_string()));
    }

    let html = client
        .get(parsed)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let text = extract_visible_text(&html);
    if text.is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(text)
}

/// Visible text of an HTML document, one text run per line with runs of
/// whitespace collapsed. Prefers `<body>` when present.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = *document.root_element();
    let scope = root
        .descendants()
        .find(|n| matches!(n.value(), Node::Element(e) if e.name() == "body"))
        .unwrap_or(root);

    scope
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some((node, text)),
            _ => None,
        })
        .filter(|(node, _)| {
            !node.ancestors().any(|a| {
                matches!(a.value(), Node::Element(e) if HIDDEN_ELEMENTS.contains(&e.name()))
            })
        })
        .map(|(_, text)| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSTING: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Careers</title><style>body { color: red; }</style></head>
  <body>
    <nav>Home</nav>
    <h1>Senior   Rust Engineer</h1>
    <script>window.tracking = true;</script>
    <p>Requirements: 5+ years Rust required.</p>
    <noscript>Enable JavaScript</noscript>
    <ul><li>Tokio</li><li>Axum</li></ul>
  </body>
</html>"#;

    #[test]
    fn test_extracts_visible_body_text() {
        assert_eq!(
            extract_visible_text(POSTING),
            "Home\nSenior Rust Engineer\nRequirements: 5+ years Rust required.\nTokio\nAxum"
        );
    }

    #[test]
    fn test_drops_script_and_style_content() {
        let text = extract_visible_text(POSTING);
        assert!(!text.contains("window.tracking"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("Careers"));
    }

    #[test]
    fn test_fragment_without_body_still_extracts() {
        assert_eq!(extract_visible_text("<p>Only   this</p>"), "Only this");
    }

    #[tokio::test]
    async fn test_invalid_url_becomes_inline_error() {
        let page = fetch_job_description(&Client::new(), "not a url").await;
        assert!(!page.ok);
        assert!(page.text.starts_with(FETCH_ERROR_PREFIX));
    }

    #[tokio::test]
    async fn test_non_http_scheme_is_rejected() {
        let page = fetch_job_description(&Client::new(), "file:///etc/passwd").await;
        assert!(!page.ok);
        assert!(page.text.contains("invalid URL"));
    }
}
