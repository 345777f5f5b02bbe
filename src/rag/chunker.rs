//! Text splitting for embedding.
//!
//! Splits page text into overlapping character windows, preferring to
//! break at paragraph or sentence boundaries near the window end.

use serde::{Deserialize, Serialize};

/// A piece of a document, small enough to embed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Character offset in the original document.
    pub start_offset: usize,
    /// Chunk index within the source document.
    pub index: usize,
}

pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
        }
    }

    /// Split text into overlapping chunks.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let total_chars = chars.len();

        let mut chunks = Vec::new();
        if total_chars == 0 {
            return chunks;
        }

        let step = self.chunk_size.saturating_sub(self.chunk_overlap).max(1);
        let mut start = 0;
        let mut index = 0;

        while start < total_chars {
            let end = (start + self.chunk_size).min(total_chars);
            let window: String = chars[start..end].iter().collect();

            let chunk_text = if end < total_chars {
                break_at_boundary(&window)
            } else {
                window
            };

            let trimmed = chunk_text.trim();
            if !trimmed.is_empty() {
                chunks.push(Chunk {
                    text: trimmed.to_string(),
                    start_offset: start,
                    index,
                });
                index += 1;
            }

            start += step;
        }

        chunks
    }
}

/// Cut the window at the last paragraph or sentence boundary found in
/// its final 20%, falling back to the full window.
fn break_at_boundary(text: &str) -> String {
    const BOUNDARIES: [&str; 8] = ["\n\n", ". ", "! ", "? ", ".\n", "!\n", "?\n", "\n"];

    let mut search_start = (text.len() * 80) / 100;
    while search_start > 0 && !text.is_char_boundary(search_start) {
        search_start -= 1;
    }
    let tail = &text[search_start..];

    for boundary in BOUNDARIES {
        if let Some(pos) = tail.rfind(boundary) {
            return text[..search_start + pos + boundary.len()].to_string();
        }
    }

    text.to_string()
}
