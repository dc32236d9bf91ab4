use std::sync::OnceLock;

use regex::Regex;

use crate::ingest::Citation;

fn think_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<think>.*</think>").expect("think pattern is valid"))
}

/// Removes the model's `<think>...</think>` reasoning, from the first
/// opening tag to the last closing tag. Leading whitespace left behind is
/// trimmed; text without the tags is returned unchanged.
pub fn clean_response(raw: &str) -> String {
    match think_pattern().find(raw) {
        Some(_) => think_pattern().replace(raw, "").trim_start().to_string(),
        None => raw.to_string(),
    }
}

/// Appends a `Sources:` list unless the reply already links one of the
/// citations.
pub fn append_sources(mut reply: String, citations: &[Citation]) -> String {
    if citations.is_empty() || citations.iter().any(|c| reply.contains(&c.url)) {
        return reply;
    }
    reply.push_str("\n\nSources:");
    for citation in citations {
        reply.push_str(&format!("\n- {}: {}", citation.label, citation.url));
    }
    reply
}
