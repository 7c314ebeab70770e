pub mod google;

pub use google::GoogleTranslator;

use crate::errors::TranslationError;

/// Rewrites analysis text into another language.
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslationError>;
}

/// Splits `text` into consecutive slices of at most `max_chars` characters.
///
/// Cuts fall on line ends where possible; a single line longer than the limit
/// is cut mid-line. Concatenating the slices gives back `text`.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut end = 0;
    let mut chars = 0;

    for line in text.split_inclusive('\n') {
        let line_chars = line.chars().count();
        if chars > 0 && chars + line_chars > max_chars {
            chunks.push(&text[start..end]);
            start = end;
            chars = 0;
        }

        if line_chars > max_chars {
            let mut piece_start = end;
            let mut count = 0;
            for (offset, _) in line.char_indices() {
                if count == max_chars {
                    chunks.push(&text[piece_start..end + offset]);
                    piece_start = end + offset;
                    count = 0;
                }
                count += 1;
            }
            start = piece_start;
            chars = count;
        } else {
            chars += line_chars;
        }
        end += line.len();
    }

    if end > start {
        chunks.push(&text[start..end]);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("a\nb\n", 10), vec!["a\nb\n"]);
        assert!(chunk_text("", 10).is_empty());
    }

    #[test]
    fn cuts_on_line_ends() {
        assert_eq!(chunk_text("aaa\nbbb\nccc", 8), vec!["aaa\nbbb\n", "ccc"]);
    }

    #[test]
    fn long_line_is_split_by_characters() {
        assert_eq!(chunk_text("ab\n多空多空多", 2), vec!["ab", "\n", "多空", "多空", "多"]);
    }

    proptest! {
        #[test]
        fn chunks_reassemble_and_respect_limit(text in "(.{0,30}\n){0,10}.{0,30}", max in 1usize..25) {
            let chunks = chunk_text(&text, max);
            prop_assert_eq!(chunks.concat(), text.clone());
            for chunk in chunks {
                prop_assert!(!chunk.is_empty());
                prop_assert!(chunk.chars().count() <= max);
            }
        }
    }
}
