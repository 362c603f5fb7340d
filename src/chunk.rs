//! Sliding-window text chunker with sentence pullback.
//!
//! Splits document text into overlapping, bounded-size segments. Windows
//! prefer to end just after a sentence delimiter (`.`, `!`, `?`, newline)
//! when one falls in the second half of the window; consecutive windows
//! share `overlap` characters of context for retrieval recall across
//! sentence boundaries.
//!
//! All positions are measured in characters, never bytes, so multi-byte
//! text never splits inside a code point.

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;
/// Default overlap between consecutive windows.
pub const DEFAULT_OVERLAP: usize = 50;

fn is_sentence_end(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\n')
}

/// Split `text` into chunks of at most `chunk_size` characters.
///
/// Empty or whitespace-only text produces zero chunks; text no longer than
/// `chunk_size` produces exactly one chunk. Chunks are trimmed, and chunks
/// that trim to empty are dropped.
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        return vec![text.trim().to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let mut end = (start + chunk_size).min(chars.len());

        // Pull the cut back to just after the last sentence delimiter in the
        // window, but never below half the target size (avoids degenerate
        // one-character chunks on delimiter-dense text).
        if end < chars.len() {
            if let Some(pos) = (start..end).rev().find(|&i| is_sentence_end(chars[i])) {
                let cut = pos + 1;
                if cut - start > chunk_size / 2 {
                    end = cut;
                }
            }
        }

        let piece: String = chars[start..end].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        if end == chars.len() {
            break;
        }

        // Back up by the overlap, but always advance by at least one char.
        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { start + 1 };
    }

    chunks
}
