//! Length guard and character-budget chunking.
//!
//! Chunking is greedy and paragraph-first: paragraphs (separated by a blank line) are packed
//! into a buffer until the next one would overflow the budget. Paragraphs that are too large on
//! their own are broken into sentences on `". "`, `"! "` and `"? "`, which are packed the same
//! way and rejoined with a single space.
//!
//! A sentence longer than the budget is never split further and ends up as an oversized chunk.
//! Consumers of the chunk list tolerate this, so it stays.
//!
//! All lengths are counted in characters, not bytes.

use super::types::ChunkingError;

/// Separator between paragraphs.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";
/// Marker appended to text cut by [`apply_length_guard`].
pub const TRUNCATION_MARKER: &str = "\n\n[Document truncated due to length]";

const SENTENCE_SEPARATOR: &str = " ";

/// Cut `text` to `max_chars` characters and append [`TRUNCATION_MARKER`].
///
/// Returns the (possibly truncated) text and whether truncation happened.
pub fn apply_length_guard(mut text: String, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            text.truncate(cut);
            text.push_str(TRUNCATION_MARKER);
            (text, true)
        }
        None => (text, false),
    }
}

/// Split `text` into ordered chunks of at most `chunk_size` characters (best effort).
///
/// Text that already fits is returned as a single chunk, verbatim. Returns
/// [`ChunkingError::InvalidChunkSize`] for a zero budget.
pub fn chunk_text(text: &str, chunk_size: usize) -> Result<Vec<String>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if char_len(text) <= chunk_size {
        return Ok(vec![text.to_string()]);
    }

    let mut packer = ChunkPacker::new(chunk_size);
    for paragraph in text.split(PARAGRAPH_SEPARATOR) {
        packer.push_paragraph(paragraph);
    }
    Ok(packer.finish())
}

struct ChunkPacker {
    budget: usize,
    buffer: String,
    buffer_len: usize,
    chunks: Vec<String>,
}

impl ChunkPacker {
    fn new(budget: usize) -> Self {
        Self {
            budget,
            buffer: String::new(),
            buffer_len: 0,
            chunks: Vec::new(),
        }
    }

    fn push_paragraph(&mut self, paragraph: &str) {
        let len = char_len(paragraph);
        // Separator length is not part of the overflow check.
        if self.buffer_len + len <= self.budget {
            self.append(paragraph, len, PARAGRAPH_SEPARATOR);
            return;
        }

        self.flush();
        if len > self.budget {
            for sentence in split_sentences(paragraph) {
                self.push_sentence(sentence);
            }
        } else {
            self.replace(paragraph, len);
        }
    }

    fn push_sentence(&mut self, sentence: &str) {
        let len = char_len(sentence);
        if self.buffer_len + len > self.budget {
            self.flush();
            self.replace(sentence, len);
        } else {
            self.append(sentence, len, SENTENCE_SEPARATOR);
        }
    }

    fn append(&mut self, piece: &str, len: usize, separator: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push_str(separator);
            self.buffer_len += char_len(separator);
        }
        self.buffer.push_str(piece);
        self.buffer_len += len;
    }

    fn replace(&mut self, piece: &str, len: usize) {
        self.buffer.clear();
        self.buffer.push_str(piece);
        self.buffer_len = len;
    }

    fn flush(&mut self) {
        let trimmed = self.buffer.trim();
        if !trimmed.is_empty() {
            self.chunks.push(trimmed.to_string());
        }
        self.buffer.clear();
        self.buffer_len = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

/// Split a paragraph after `.`, `!` or `?` followed by a space.
///
/// Punctuation stays with its sentence; the single space after it is dropped.
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(space, ' ')) = chars.peek() {
            sentences.push(&paragraph[start..=index]);
            chars.next();
            start = space + 1;
        }
    }

    if start < paragraph.len() {
        sentences.push(&paragraph[start..]);
    }
    sentences
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
