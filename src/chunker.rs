//! Recursive character splitter.
//!
//! Text is cut on the coarsest separator present (paragraphs, then lines,
//! then words, then characters), and the pieces are greedily merged back into
//! chunks of at most `chunk_size` characters, each carrying up to
//! `chunk_overlap` characters of the previous chunk's tail.

use crate::config::Settings;
use crate::document::{Document, Metadata};
use serde_json::json;
use std::collections::VecDeque;

pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn split_on<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        text.char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect()
    } else {
        text.split(separator).filter(|s| !s.is_empty()).collect()
    }
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    /// Splits `text` into ordered, trimmed, non-empty chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// Splits `text` into documents tagged with their `source`, position in
    /// the sequence, and byte offset in `text` (`null` when the chunk is not
    /// a verbatim substring, e.g. after collapsing repeated separators).
    pub fn split_document(&self, text: &str, source: &str) -> Vec<Document> {
        let mut search_from = 0;
        self.split_text(text)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, chunk)| {
                let start = text[search_from..]
                    .find(chunk.as_str())
                    .map(|offset| offset + search_from);
                if let Some(start) = start {
                    search_from = start + 1;
                    while search_from < text.len() && !text.is_char_boundary(search_from) {
                        search_from += 1;
                    }
                }

                let mut metadata = Metadata::new();
                metadata.insert("source".into(), json!(source));
                metadata.insert("chunk_index".into(), json!(chunk_index));
                metadata.insert("start_index".into(), json!(start));
                Document::with_metadata(chunk, metadata)
            })
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = match separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
        {
            Some(i) => (separators[i].as_str(), &separators[i + 1..]),
            None => ("", &separators[separators.len()..]),
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in split_on(text, separator) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge_splits(&pending, separator));
                pending.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge_splits(&pending, separator));
        }
        chunks
    }

    fn merge_splits(&self, splits: &[&str], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let joined_len = |current: &VecDeque<&str>| {
            if current.is_empty() {
                0
            } else {
                separator_len
            }
        };

        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for &piece in splits {
            let len = char_len(piece);
            if !current.is_empty() && total + len + joined_len(&current) > self.chunk_size {
                push_joined(&mut chunks, &current, separator);

                // Keep at most `chunk_overlap` characters for the next chunk.
                while total > self.chunk_overlap
                    || (total > 0 && total + len + joined_len(&current) > self.chunk_size)
                {
                    let Some(first) = current.pop_front() else {
                        break;
                    };
                    total -= char_len(first) + joined_len(&current);
                }
            }
            total += len + joined_len(&current);
            current.push_back(piece);
        }
        push_joined(&mut chunks, &current, separator);
        chunks
    }
}

fn push_joined(chunks: &mut Vec<String>, pieces: &VecDeque<&str>, separator: &str) {
    let joined = pieces.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_text_has_no_chunks() {
        let splitter = TextSplitter::new(1000, 200);
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text("  \n\n  ").is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let splitter = TextSplitter::new(1000, 200);
        assert_eq!(splitter.split_text("Short text."), vec!["Short text."]);
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let splitter = TextSplitter::new(20, 8);
        let chunks = splitter.split_text("one two three four five six seven eight nine ten");
        assert_eq!(
            chunks,
            vec!["one two three four", "four five six seven", "seven eight nine ten"]
        );
    }

    #[test]
    fn without_overlap_chunks_partition_the_words() {
        let splitter = TextSplitter::new(20, 0);
        let text = "one two three four five six seven eight nine ten";
        let chunks = splitter.split_text(text);
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn chunks_respect_size_limit() {
        let paragraph = "The quick brown fox jumps over the lazy dog. ".repeat(30);
        let text = format!("{}\n\n{}\nsupercalifragilisticexpialidocious", paragraph, paragraph);
        let splitter = TextSplitter::new(100, 20);
        let chunks = splitter.split_text(&text);

        assert!(chunks.len() > 2);
        for chunk in &chunks {
            assert!(char_len(chunk) <= 100, "chunk too long: {:?}", chunk);
        }
    }

    #[test]
    fn oversized_words_are_split_by_character() {
        let splitter = TextSplitter::new(4, 0);
        assert_eq!(splitter.split_text("abcdefghij"), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn paragraphs_are_preferred_boundaries() {
        let splitter = TextSplitter::new(30, 0);
        let chunks = splitter.split_text("first paragraph here\n\nsecond paragraph here");
        assert_eq!(chunks, vec!["first paragraph here", "second paragraph here"]);
    }

    #[test]
    fn sizes_are_counted_in_characters() {
        let splitter = TextSplitter::new(3, 0);
        assert_eq!(splitter.split_text("ééééé"), vec!["ééé", "éé"]);
    }

    #[test]
    fn documents_carry_source_and_offsets() {
        let splitter = TextSplitter::new(20, 8);
        let text = "one two three four five six seven eight nine ten";
        let documents = splitter.split_document(text, "numbers.txt");

        assert_eq!(documents.len(), 3);
        for (i, document) in documents.iter().enumerate() {
            assert_eq!(document.metadata["source"], json!("numbers.txt"));
            assert_eq!(document.metadata["chunk_index"], json!(i));
            let start = document.metadata["start_index"].as_u64().unwrap() as usize;
            assert!(text[start..].starts_with(&document.text));
        }
        assert_eq!(documents[1].metadata["start_index"], json!(14));
    }
}
