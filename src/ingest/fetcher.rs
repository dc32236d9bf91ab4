//! Document download and plain-text extraction.
//!
//! PDFs are parsed page by page with `pdf-extract`; webpages are parsed
//! with `scraper` and reduced to their visible text nodes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use thiserror::Error;

use crate::sources::{SourceKind, SourceUrl};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("PDF extraction task failed: {0}")]
    Task(String),
}

impl FetchError {
    /// Human readable status line for a failed source.
    pub fn status_message(&self, source: &SourceUrl) -> String {
        match self {
            FetchError::Status(_) => {
                format!("Failed to download {}: {}", source.kind.label(), source.url)
            }
            other => format!(
                "Error processing {} {}: {}",
                source.kind.label(),
                source.url,
                other
            ),
        }
    }
}

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Downloads `source` and returns its extracted text.
    async fn fetch(&self, source: &SourceUrl) -> Result<String, FetchError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn download(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, source: &SourceUrl) -> Result<String, FetchError> {
        tracing::info!("Downloading {}: {}", source.kind.label(), source.url);
        let response = self.download(&source.url).await?;

        match source.kind {
            SourceKind::Pdf => {
                let bytes = response.bytes().await?.to_vec();
                tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
                    .await
                    .map_err(|err| FetchError::Task(err.to_string()))?
            }
            SourceKind::Webpage => {
                let html = response.text().await?;
                Ok(extract_visible_text(&html))
            }
        }
    }
}

/// Concatenates the text of every page, each followed by a blank line.
///
/// `pdf-extract` panics on some malformed font encodings instead of
/// returning an error, so the panic is caught and reported as a failure.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, FetchError> {
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes));

    match result {
        Ok(Ok(pages)) => Ok(pages
            .iter()
            .map(|page| format!("{}\n\n", page))
            .collect()),
        Ok(Err(err)) => Err(FetchError::Pdf(err.to_string())),
        Err(_panic) => Err(FetchError::Pdf(
            "PDF parsing panicked (likely malformed font encoding)".to_string(),
        )),
    }
}

const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Visible text nodes of an HTML document, trimmed and joined by newlines.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed);
        }
    }

    lines.join("\n")
}
