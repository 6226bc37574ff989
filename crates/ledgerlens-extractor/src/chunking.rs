//! Fixed-size sliding window chunking
//!
//! Windows are measured in characters, not bytes. Each window after the
//! first starts `window_size - overlap` characters past the previous one;
//! the sequence ends with the first window that reaches the end of the text.

use crate::error::ExtractorError;

/// Splits text into overlapping fixed-size windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    window_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a chunker; `overlap` must be smaller than `window_size`
    pub fn new(window_size: usize, overlap: usize) -> Result<Self, ExtractorError> {
        if window_size == 0 {
            return Err(ExtractorError::Config(
                "window_size must be greater than 0".to_string(),
            ));
        }
        if overlap >= window_size {
            return Err(ExtractorError::Config(format!(
                "overlap ({}) must be smaller than window_size ({})",
                overlap, window_size
            )));
        }
        Ok(Self {
            window_size,
            overlap,
        })
    }

    /// Characters between the starts of consecutive windows
    pub fn step(&self) -> usize {
        self.window_size - self.overlap
    }

    /// Lazily iterate over the windows of `text`.
    ///
    /// The iterator borrows `text` and is `Clone`, so the sequence can be
    /// restarted from any point.
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            text,
            start: 0,
            window_size: self.window_size,
            step: self.step(),
            done: text.is_empty(),
        }
    }

    /// Collect the windows of `text` into owned strings
    pub fn split(&self, text: &str) -> Vec<String> {
        self.chunks(text).map(str::to_string).collect()
    }
}

/// Iterator over the windows of a text
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    start: usize,
    window_size: usize,
    step: usize,
    done: bool,
}

/// Byte offset `chars` characters past `from`, or the end of the text
fn advance(text: &str, from: usize, chars: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(chars)
        .map(|(offset, _)| from + offset)
        .unwrap_or(text.len())
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let end = advance(self.text, self.start, self.window_size);
        let chunk = &self.text[self.start..end];

        if end == self.text.len() {
            self.done = true;
        } else {
            self.start = advance(self.text, self.start, self.step);
        }

        Some(chunk)
    }
}
