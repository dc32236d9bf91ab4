//! Recursive character splitter.
//!
//! Splits on the largest separator present in the text (paragraph, line,
//! word, character), recursing into pieces that are still too long, then
//! greedily merges neighbouring pieces into chunks of at most `chunk_size`
//! characters. Each new chunk starts with the tail of the previous one,
//! at most `chunk_overlap` characters long. Separators stay attached to the
//! start of the piece that follows them.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    config: SplitterConfig,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub fn new(config: SplitterConfig) -> Self {
        let chunk_size = config.chunk_size.max(1);
        let chunk_overlap = config.chunk_overlap.min(chunk_size - 1);
        Self {
            config: SplitterConfig {
                chunk_size,
                chunk_overlap,
            },
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (index, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                remaining = &separators[index + 1..];
                break;
            }
        }

        let mut short_pieces: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.config.chunk_size {
                short_pieces.push(piece);
                continue;
            }
            if !short_pieces.is_empty() {
                final_chunks.extend(self.merge_splits(&short_pieces, ""));
                short_pieces.clear();
            }
            if remaining.is_empty() {
                final_chunks.push(piece.to_string());
            } else {
                final_chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !short_pieces.is_empty() {
            final_chunks.extend(self.merge_splits(&short_pieces, ""));
        }

        final_chunks
    }

    fn merge_splits(&self, splits: &[&str], separator: &str) -> Vec<String> {
        let chunk_size = self.config.chunk_size;
        let chunk_overlap = self.config.chunk_overlap;
        let separator_len = char_len(separator);

        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in splits {
            let len = char_len(piece);
            let joiner = if current.is_empty() { 0 } else { separator_len };

            if total + len + joiner > chunk_size {
                if total > chunk_size {
                    tracing::warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total,
                        chunk_size
                    );
                }
                if !current.is_empty() {
                    if let Some(chunk) = join_pieces(&current, separator) {
                        chunks.push(chunk);
                    }
                    // Drop pieces from the front until what is left fits the
                    // overlap budget and leaves room for the next piece.
                    while total > chunk_overlap
                        || (total > 0
                            && total
                                + len
                                + if current.is_empty() { 0 } else { separator_len }
                                > chunk_size)
                    {
                        let Some(front) = current.pop_front() else {
                            break;
                        };
                        let joined = if current.is_empty() { 0 } else { separator_len };
                        total -= char_len(front) + joined;
                    }
                }
            }

            current.push_back(piece);
            total += len + if current.len() > 1 { separator_len } else { 0 };
        }

        if let Some(chunk) = join_pieces(&current, separator) {
            chunks.push(chunk);
        }

        chunks
    }
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self::new(SplitterConfig::default())
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Splits `text` before every occurrence of `separator`, so each piece but
/// the first begins with the separator. Empty pieces are dropped. An empty
/// separator splits into single characters.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(index, ch)| &text[index..index + ch.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (index, _) in text.match_indices(separator) {
        pieces.push(&text[start..index]);
        start = index;
    }
    pieces.push(&text[start..]);
    pieces.retain(|piece| !piece.is_empty());
    pieces
}

fn join_pieces(pieces: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = pieces.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(count: usize) -> String {
        (0..count)
            .map(|i| format!("word{}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Longest prefix of `next` that is also a suffix of `prev`.
    fn overlap_len(prev: &str, next: &str) -> usize {
        let max = prev.len().min(next.len());
        (1..=max)
            .rev()
            .find(|&k| next.is_char_boundary(k) && prev.ends_with(&next[..k]))
            .unwrap_or(0)
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let splitter = RecursiveSplitter::default();
        assert_eq!(
            splitter.split_text("  CSE 2050 is an intro course.  "),
            vec!["CSE 2050 is an intro course."]
        );
    }

    #[test]
    fn empty_and_blank_text_yield_no_chunks() {
        let splitter = RecursiveSplitter::default();
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text(" \n\n \n").is_empty());
    }

    #[test]
    fn chunks_respect_size_limit() {
        let splitter = RecursiveSplitter::default();
        let text = numbered_words(600);
        let chunks = splitter.split_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 500, "chunk too long: {}", chunk.len());
        }
    }

    #[test]
    fn consecutive_chunks_overlap_within_budget() {
        let splitter = RecursiveSplitter::default();
        let text = numbered_words(600);
        let chunks = splitter.split_text(&text);

        for pair in chunks.windows(2) {
            let overlap = overlap_len(&pair[0], &pair[1]);
            assert!(overlap > 0, "no overlap between {:?} and {:?}", pair[0], pair[1]);
            assert!(overlap <= 50, "overlap {} exceeds budget", overlap);
        }
    }

    #[test]
    fn splitting_is_deterministic() {
        let splitter = RecursiveSplitter::default();
        let text = format!(
            "{}\n\n{}\n{}",
            numbered_words(120),
            numbered_words(80),
            numbered_words(200)
        );
        assert_eq!(splitter.split_text(&text), splitter.split_text(&text));
    }

    #[test]
    fn paragraphs_are_preferred_boundaries() {
        let splitter = RecursiveSplitter::new(SplitterConfig {
            chunk_size: 40,
            chunk_overlap: 5,
        });
        let text = "First paragraph is here.\n\nSecond paragraph is here.";
        assert_eq!(
            splitter.split_text(text),
            vec!["First paragraph is here.", "Second paragraph is here."]
        );
    }

    #[test]
    fn unbroken_text_falls_back_to_characters() {
        let splitter = RecursiveSplitter::new(SplitterConfig {
            chunk_size: 10,
            chunk_overlap: 2,
        });
        let chunks = splitter.split_text(&"x".repeat(25));
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks[0], "x".repeat(10));
    }

    #[test]
    fn separator_split_keeps_separator_on_following_piece() {
        assert_eq!(
            split_keeping_separator("a\n\nb\n\n\n\nc", "\n\n"),
            vec!["a", "\n\nb", "\n\n", "\n\nc"]
        );
        assert_eq!(split_keeping_separator("hé", ""), vec!["h", "é"]);
    }

    #[test]
    fn multibyte_text_is_measured_in_characters() {
        let splitter = RecursiveSplitter::new(SplitterConfig {
            chunk_size: 12,
            chunk_overlap: 0,
        });
        let chunks = splitter.split_text("ééé ééé ééé ééé ééé");
        assert!(chunks.iter().all(|c| c.chars().count() <= 12));
        assert_eq!(chunks.join(" "), "ééé ééé ééé ééé ééé");
    }
}
