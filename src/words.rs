//! Word counting

use std::sync::RwLock;

use once_cell::sync::Lazy;
use regex::Regex;

/// Em-dashes join words without spaces ("this—that"), so they separate
/// words just like whitespace does.
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\u{2014}]+").expect("separator pattern is valid"));

/// Number of words in `text`. Zero for empty or whitespace-only input.
pub fn count_words(text: &str) -> u64 {
    SEPARATORS
        .split(text.trim())
        .filter(|token| !token.is_empty())
        .count() as u64
}

/// Anything that can report the current word count on demand
pub trait WordSource: Send + Sync {
    fn word_count(&self) -> u64;
}

/// Live, shared text buffer
#[derive(Debug, Default)]
pub struct TextBuffer {
    text: RwLock<String>,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: RwLock::new(text.into()),
        }
    }

    /// Replace the whole buffer
    pub fn replace(&self, text: impl Into<String>) {
        match self.text.write() {
            Ok(mut guard) => *guard = text.into(),
            Err(poisoned) => *poisoned.into_inner() = text.into(),
        }
    }

    /// Copy of the current text
    pub fn snapshot(&self) -> String {
        match self.text.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl WordSource for TextBuffer {
    fn word_count(&self) -> u64 {
        match self.text.read() {
            Ok(guard) => count_words(&guard),
            Err(poisoned) => count_words(&poisoned.into_inner()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t  "), 0);
    }

    #[test]
    fn test_mixed_whitespace() {
        assert_eq!(count_words("  a   b\tc\n d "), 4);
        assert_eq!(count_words("one\r\ntwo"), 2);
    }

    #[test]
    fn test_em_dash_separates_words() {
        assert_eq!(count_words("this—that"), 2);
        assert_eq!(count_words("wait — what"), 2);
        assert_eq!(count_words("—"), 0);
    }

    #[test]
    fn test_hyphen_and_en_dash_do_not_split() {
        assert_eq!(count_words("well-known"), 1);
        assert_eq!(count_words("pages 10–12"), 2);
    }

    #[test]
    fn test_text_buffer_counts_live_contents() {
        let buffer = TextBuffer::new("one two");
        assert_eq!(buffer.word_count(), 2);
        buffer.replace("one two three four");
        assert_eq!(buffer.word_count(), 4);
        assert_eq!(buffer.snapshot(), "one two three four");
    }
}
