use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use futures_util::stream::{self, StreamExt};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use super::fetcher::DocumentFetcher;
use super::splitter::RecursiveSplitter;
use super::{IngestReport, SourceOutcome};
use crate::sources::SourceLocator;

/// Maximum number of citations attached to an answer.
pub const MAX_CITATIONS: usize = 3;

const UNDERGRADUATE_LABEL: &str = "Undergraduate Catalog";
const GRADUATE_LABEL: &str = "Graduate Catalog";

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b[A-Z]{2,4} \d{4}[A-Z]?\b").expect("identifier pattern is valid")
    })
}

/// Course identifiers (department code, space, four digit number, optional
/// suffix letter) in order of appearance.
pub fn extract_identifiers(text: &str) -> Vec<&str> {
    identifier_pattern()
        .find_iter(text)
        .map(|m| m.as_str())
        .collect()
}

/// Identifier → URL of the document it was last seen in.
///
/// Kept sorted by identifier so lookups walk it in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentifierMap {
    entries: BTreeMap<String, String>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every identifier in `text` against `url`, replacing earlier
    /// URLs for the same identifier.
    pub fn record_document(&mut self, text: &str, url: &str) -> usize {
        let mut recorded = 0;
        for identifier in extract_identifiers(text) {
            self.entries.insert(identifier.to_string(), url.to_string());
            recorded += 1;
        }
        recorded
    }

    pub fn insert(&mut self, identifier: impl Into<String>, url: impl Into<String>) {
        self.entries.insert(identifier.into(), url.into());
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.entries.get(identifier).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub label: String,
    pub url: String,
}

impl Citation {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Candidate sources for a piece of retrieved context.
///
/// Identifiers found in `content` map to the page they came from. When none
/// match, mentions of undergraduate / graduate study fall back to the first
/// and second catalog PDF. Duplicates are dropped keeping the first
/// occurrence and at most [`MAX_CITATIONS`] are returned.
pub fn identify_source_urls(
    content: &str,
    identifiers: &IdentifierMap,
    pdf_urls: &[String],
) -> Vec<Citation> {
    let mut candidates: Vec<Citation> = identifiers
        .iter()
        .filter(|(identifier, _)| content.contains(identifier))
        .map(|(identifier, url)| Citation::new(identifier, url))
        .collect();

    if candidates.is_empty() {
        let lowered = content.to_lowercase();
        if lowered.contains("undergraduate") {
            if let Some(url) = pdf_urls.first() {
                candidates.push(Citation::new(UNDERGRADUATE_LABEL, url));
            }
        }
        // "undergraduate" contains "graduate", so both catalogs can apply.
        if lowered.contains("graduate") {
            if let Some(url) = pdf_urls.get(1) {
                candidates.push(Citation::new(GRADUATE_LABEL, url));
            }
        }
    }

    let mut unique: Vec<Citation> = Vec::new();
    for candidate in candidates {
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
        if unique.len() == MAX_CITATIONS {
            break;
        }
    }
    unique
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No text was extracted from the provided sources")]
    EmptyCorpus { report: IngestReport },
}

/// Chunks ready for embedding plus the identifier map built while reading.
#[derive(Debug, Clone)]
pub struct ProcessedCorpus {
    pub chunks: Vec<String>,
    pub identifiers: IdentifierMap,
    pub report: IngestReport,
}

pub struct DocumentProcessor {
    locator: SourceLocator,
    fetcher: Arc<dyn DocumentFetcher>,
    splitter: RecursiveSplitter,
    concurrency: usize,
}

impl DocumentProcessor {
    pub fn new(
        locator: SourceLocator,
        fetcher: Arc<dyn DocumentFetcher>,
        splitter: RecursiveSplitter,
    ) -> Self {
        Self {
            locator,
            fetcher,
            splitter,
            concurrency: 1,
        }
    }

    /// Allows up to `concurrency` downloads in flight. Results are still
    /// consumed in source order, so the identifier map ends up the same as
    /// with sequential fetching.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn locator(&self) -> &SourceLocator {
        &self.locator
    }

    /// Fetches every source, records identifiers and splits the combined
    /// text into chunks. Failed sources are skipped.
    pub async fn process_documents(&self) -> Result<ProcessedCorpus, IngestError> {
        let sources = self.locator.all_sources();

        let mut results = stream::iter(sources.into_iter().map(|source| {
            let fetcher = Arc::clone(&self.fetcher);
            async move {
                let result = fetcher.fetch(&source).await;
                (source, result)
            }
        }))
        .buffered(self.concurrency);

        let mut report = IngestReport::default();
        let mut identifiers = IdentifierMap::new();
        let mut texts: Vec<String> = Vec::new();

        while let Some((source, result)) = results.next().await {
            match result {
                Ok(text) if !text.is_empty() => {
                    let status = format!("Processed {}: {}", source.kind.label(), source.url);
                    tracing::info!("{}", status);
                    identifiers.record_document(&text, &source.url);
                    report.sources.push(SourceOutcome {
                        url: source.url.clone(),
                        kind: source.kind,
                        ok: true,
                        status,
                        characters: text.chars().count(),
                    });
                    texts.push(text);
                }
                Ok(_) => {
                    let status = format!("No text found in {}: {}", source.kind.label(), source.url);
                    tracing::warn!("{}", status);
                    report.sources.push(SourceOutcome {
                        url: source.url.clone(),
                        kind: source.kind,
                        ok: false,
                        status,
                        characters: 0,
                    });
                }
                Err(err) => {
                    let status = err.status_message(&source);
                    tracing::warn!("{}", status);
                    report.sources.push(SourceOutcome {
                        url: source.url.clone(),
                        kind: source.kind,
                        ok: false,
                        status,
                        characters: 0,
                    });
                }
            }
        }

        if texts.is_empty() {
            tracing::error!("No text was extracted from the provided sources.");
            return Err(IngestError::EmptyCorpus { report });
        }

        let combined = texts.join("\n\n");
        report.total_characters = combined.chars().count();
        tracing::info!(
            "Extracted {} characters of text from {} sources.",
            report.total_characters,
            report.succeeded()
        );

        let chunks = self.splitter.split_text(&combined);
        report.chunk_count = chunks.len();
        tracing::info!("Text split into {} chunks.", chunks.len());

        Ok(ProcessedCorpus {
            chunks,
            identifiers,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::core::config::SourcesConfig;
    use crate::ingest::FetchError;
    use crate::sources::SourceUrl;

    /// Every page mentions CSE 2050; earlier pages take longer to answer.
    struct SlowEarlyFetcher;

    #[async_trait]
    impl DocumentFetcher for SlowEarlyFetcher {
        async fn fetch(&self, source: &SourceUrl) -> Result<String, FetchError> {
            let delay = if source.url.ends_with("/a/") { 30 } else { 1 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(format!("CSE 2050 on {}", source.url))
        }
    }

    fn processor(concurrency: usize) -> DocumentProcessor {
        let locator = SourceLocator::new(SourcesConfig {
            pdf_urls: Vec::new(),
            undergraduate_courses_url: "https://x.test/".into(),
            graduate_courses_url: "https://grad.x.test/".into(),
            undergraduate_codes: vec!["a".into(), "b".into()],
            graduate_codes: Vec::new(),
        });
        DocumentProcessor::new(locator, Arc::new(SlowEarlyFetcher), RecursiveSplitter::default())
            .with_concurrency(concurrency)
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn processing_future_can_move_across_threads() {
        let processor = processor(2);
        let future = processor.process_documents();
        assert_send(&future);
    }

    #[tokio::test]
    async fn concurrent_fetches_keep_source_order() {
        let corpus = processor(2).process_documents().await.unwrap();

        let urls: Vec<&str> = corpus.report.sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x.test/a/", "https://x.test/b/"]);
        assert_eq!(corpus.identifiers.get("CSE 2050"), Some("https://x.test/b/"));
        assert_eq!(corpus.chunks.len(), 1);
    }

    #[test]
    fn identifiers_match_course_code_pattern() {
        let text = "Take CSE 2050 and MATH 1131Q before STAT 3025. Not: cse 2050, C 1234, \
                    ABCDE 1234, CSE 205, CSE  2050, CSE 20501.";
        assert_eq!(
            extract_identifiers(text),
            vec!["CSE 2050", "MATH 1131Q", "STAT 3025"]
        );
    }

    #[test]
    fn every_extracted_identifier_has_the_expected_shape() {
        let text = "ACCT 2001 BME 3100W ECE 4099 FNCE 3101 OPIM 3801 PHYS 1501Q x";
        for identifier in extract_identifiers(text) {
            let (dept, number) = identifier.split_once(' ').expect("one space");
            assert!((2..=4).contains(&dept.len()));
            assert!(dept.chars().all(|c| c.is_ascii_uppercase()));
            let digits: String = number.chars().take(4).collect();
            assert!(digits.chars().all(|c| c.is_ascii_digit()));
            assert!(number.len() == 4 || number.len() == 5);
            if number.len() == 5 {
                assert!(number.chars().last().is_some_and(|c| c.is_ascii_uppercase()));
            }
        }
    }

    #[test]
    fn later_documents_overwrite_earlier_urls() {
        let mut map = IdentifierMap::new();
        map.record_document("CSE 2050 assignments available", "https://a.test/");
        map.record_document("CSE 2050 is an intro course, see MATH 1131Q", "https://b.test/");

        assert_eq!(map.get("CSE 2050"), Some("https://b.test/"));
        assert_eq!(map.get("MATH 1131Q"), Some("https://b.test/"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn citations_come_from_matching_identifiers() {
        let mut map = IdentifierMap::new();
        map.insert("CSE 2050", "https://x.test/cse/");
        map.insert("MATH 1131Q", "https://x.test/math/");

        let citations = identify_source_urls("CSE 2050 covers data structures", &map, &[]);
        assert_eq!(citations, vec![Citation::new("CSE 2050", "https://x.test/cse/")]);
    }

    #[test]
    fn citations_fall_back_to_catalog_pdfs() {
        let pdfs = vec!["https://x.test/ug.pdf".to_string(), "https://x.test/g.pdf".to_string()];
        let map = IdentifierMap::new();

        let graduate = identify_source_urls("Graduate admission requirements", &map, &pdfs);
        assert_eq!(graduate, vec![Citation::new("Graduate Catalog", "https://x.test/g.pdf")]);

        let undergraduate = identify_source_urls("Undergraduate majors", &map, &pdfs);
        assert_eq!(
            undergraduate,
            vec![
                Citation::new("Undergraduate Catalog", "https://x.test/ug.pdf"),
                Citation::new("Graduate Catalog", "https://x.test/g.pdf"),
            ]
        );

        assert!(identify_source_urls("nothing relevant", &map, &pdfs).is_empty());
        assert!(identify_source_urls("graduate", &map, &pdfs[..1]).is_empty());
    }

    #[test]
    fn citations_are_capped_and_unique() {
        let mut map = IdentifierMap::new();
        for (code, url) in [
            ("CSE 1010", "https://x.test/cse/"),
            ("CSE 2050", "https://x.test/cse/"),
            ("CSE 2100", "https://x.test/cse/"),
            ("CSE 3100", "https://x.test/cse/"),
            ("MATH 1131Q", "https://x.test/math/"),
        ] {
            map.insert(code, url);
        }
        let content = "CSE 1010 CSE 2050 CSE 2100 CSE 3100 MATH 1131Q CSE 2050";

        let citations = identify_source_urls(content, &map, &[]);
        assert_eq!(citations.len(), MAX_CITATIONS);
        for (i, a) in citations.iter().enumerate() {
            for b in &citations[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(citations[0].label, "CSE 1010");
    }
}
