//! Word/separator splitting used for overlay measurement
//!
//! Selected text is measured one piece at a time so that every measured box
//! lies on a single visual line (words never wrap internally). Pieces alternate
//! between word runs `[\w']+` and everything in between.

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_PIECES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w']+|[^\w']+").expect("word piece pattern is valid"));

/// One measured piece, in character offsets relative to the split text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordPiece {
    pub start: usize,
    pub end: usize,
    pub is_word: bool,
}

/// Split text into alternating word and separator pieces
pub fn split(text: &str) -> Vec<WordPiece> {
    let mut pieces = Vec::new();
    let mut offset = 0;
    for found in WORD_PIECES.find_iter(text) {
        let len = found.as_str().chars().count();
        let is_word = found
            .as_str()
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '\'');
        pieces.push(WordPiece {
            start: offset,
            end: offset + len,
            is_word,
        });
        offset += len;
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        split(text)
            .iter()
            .map(|piece| text.chars().skip(piece.start).take(piece.end - piece.start).collect())
            .collect()
    }

    #[test]
    fn test_alternates_words_and_separators() {
        assert_eq!(texts("quick fox"), vec!["quick", " ", "fox"]);
        assert_eq!(
            texts("it's, well -- fine."),
            vec!["it's", ", ", "well", " -- ", "fine", "."]
        );
    }

    #[test]
    fn test_pieces_cover_the_text() {
        let text = "Überall: 42 Bäume!";
        let pieces = split(text);
        assert_eq!(pieces.first().map(|p| p.start), Some(0));
        assert_eq!(pieces.last().map(|p| p.end), Some(text.chars().count()));
        for pair in pieces.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert_ne!(pair[0].is_word, pair[1].is_word);
        }
    }

    #[test]
    fn test_whitespace_only_is_one_separator() {
        let pieces = split("   ");
        assert_eq!(pieces.len(), 1);
        assert!(!pieces[0].is_word);
    }
}
