//! Recursive character splitting of page text into overlapping chunks
//!
//! Text is split on the coarsest separator that occurs in it. Pieces that
//! still exceed the chunk size are split again with the remaining, finer
//! separators; small neighbouring pieces are merged back together up to the
//! chunk size, carrying at most `chunk_overlap` characters into the next
//! chunk. Separators stay attached to the start of the piece that follows
//! them. Lengths are counted in characters.

use std::collections::VecDeque;

use crate::config::ChunkingConfig;
use crate::types::{Chunk, PageDocument};

/// Recursive character text splitter
#[derive(Debug, Clone)]
pub struct RecursiveTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl RecursiveTextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize, separators: Vec<String>) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators,
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap, config.separators.clone())
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split one text into trimmed, non-empty chunks
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    /// Split every page, each chunk inheriting its page metadata
    pub fn split_documents(&self, pages: &[PageDocument]) -> Vec<Chunk> {
        pages
            .iter()
            .flat_map(|page| {
                self.split_text(&page.content)
                    .into_iter()
                    .enumerate()
                    .map(|(position, text)| Chunk::new(text, page.metadata.clone(), position))
            })
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        // First separator present in the text; the empty separator always matches
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut finer: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(std::mem::take(&mut pending)));
            }
            if finer.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_recursive(&piece, finer));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge(pending));
        }

        chunks
    }

    /// Greedily join pieces up to the chunk size, keeping a tail of at most
    /// `chunk_overlap` characters as the start of the next chunk
    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: VecDeque<String> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(&piece);
            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total,
                        self.chunk_size
                    );
                }
                if !current.is_empty() {
                    if let Some(chunk) = join_trimmed(&current) {
                        chunks.push(chunk);
                    }
                    while total > self.chunk_overlap
                        || (total > 0 && total + len > self.chunk_size)
                    {
                        match current.pop_front() {
                            Some(front) => total -= char_len(&front),
                            None => break,
                        }
                    }
                }
            }
            total += len;
            current.push_back(piece);
        }

        if let Some(chunk) = join_trimmed(&current) {
            chunks.push(chunk);
        }

        chunks
    }
}

impl Default for RecursiveTextSplitter {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

/// Split on `separator`, attaching each separator to the piece after it.
/// An empty separator splits into single characters.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        pieces.push(&text[start..idx]);
        start = idx;
    }
    pieces.push(&text[start..]);

    pieces
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .map(String::from)
        .collect()
}

fn join_trimmed(pieces: &VecDeque<String>) -> Option<String> {
    let joined: String = pieces.iter().map(String::as_str).collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
