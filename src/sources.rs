//! Source locator: the static catalog PDFs plus one course webpage per
//! department code.

use serde::{Deserialize, Serialize};

use crate::core::config::SourcesConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Pdf,
    Webpage,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Pdf => "PDF",
            SourceKind::Webpage => "webpage",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUrl {
    pub url: String,
    pub kind: SourceKind,
}

impl SourceUrl {
    pub fn pdf(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: SourceKind::Pdf,
        }
    }

    pub fn webpage(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: SourceKind::Webpage,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceLocator {
    config: SourcesConfig,
}

impl SourceLocator {
    pub fn new(config: SourcesConfig) -> Self {
        Self { config }
    }

    pub fn pdf_urls(&self) -> &[String] {
        &self.config.pdf_urls
    }

    /// `{base}{code}/` for every undergraduate code, then every graduate code.
    pub fn course_urls(&self) -> Vec<String> {
        let undergraduate = self
            .config
            .undergraduate_codes
            .iter()
            .map(|code| course_url(&self.config.undergraduate_courses_url, code));
        let graduate = self
            .config
            .graduate_codes
            .iter()
            .map(|code| course_url(&self.config.graduate_courses_url, code));
        undergraduate.chain(graduate).collect()
    }

    /// Every source in ingestion order: PDFs first, then course pages.
    pub fn all_sources(&self) -> Vec<SourceUrl> {
        self.pdf_urls()
            .iter()
            .cloned()
            .map(SourceUrl::pdf)
            .chain(self.course_urls().into_iter().map(SourceUrl::webpage))
            .collect()
    }
}

fn course_url(base: &str, code: &str) -> String {
    let code = code.trim().trim_matches('/');
    if base.ends_with('/') {
        format!("{}{}/", base, code)
    } else {
        format!("{}/{}/", base, code)
    }
}
