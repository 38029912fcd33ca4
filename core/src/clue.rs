use crate::grapheme;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum answer length in graphemes.
pub const MIN_ANSWER_GRAPHEMES: usize = 2;
/// Maximum answer length in graphemes.
pub const MAX_ANSWER_GRAPHEMES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidAnswer {
    #[error("answer is empty after cleaning")]
    Empty,
    #[error("answer \"{0}\" is shorter than {MIN_ANSWER_GRAPHEMES} graphemes")]
    TooShort(String),
    #[error("answer \"{0}\" is longer than {MAX_ANSWER_GRAPHEMES} graphemes")]
    TooLong(String),
    #[error("answer \"{0}\" contains a brace character")]
    Brace(String),
}

/// An answer with its clue, segmented into the graphemes that will occupy
/// grid cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueItem {
    /// Cleaned, NFC-normalized answer text.
    pub answer: String,
    /// Free-form clue text.
    pub clue: String,
    /// Grapheme clusters of `answer`, in order. Joining them yields `answer`.
    pub graphemes: Vec<String>,
}

impl ClueItem {
    /// Clean and segment `answer`, rejecting answers that cannot occupy
    /// grid cells.
    ///
    /// Braces are rejected up front, before cleaning would strip them:
    /// they delimit multi-codepoint graphemes in the export alphabet, so
    /// an answer carrying its own braces cannot be encoded unambiguously.
    pub fn new(answer: &str, clue: &str) -> Result<Self, InvalidAnswer> {
        if answer.contains(['{', '}']) {
            return Err(InvalidAnswer::Brace(answer.trim().to_owned()));
        }
        let cleaned = grapheme::clean_answer_text(answer);
        if cleaned.is_empty() {
            return Err(InvalidAnswer::Empty);
        }
        let graphemes = grapheme::to_graphemes(&cleaned);
        if graphemes.len() < MIN_ANSWER_GRAPHEMES {
            return Err(InvalidAnswer::TooShort(cleaned));
        }
        if graphemes.len() > MAX_ANSWER_GRAPHEMES {
            return Err(InvalidAnswer::TooLong(cleaned));
        }
        Ok(Self {
            answer: cleaned,
            clue: grapheme::nfc(clue),
            graphemes,
        })
    }

    /// Answer length in graphemes.
    pub fn len(&self) -> usize {
        self.graphemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphemes.is_empty()
    }

    /// Whether `self` and `other` have at least one grapheme in common.
    pub fn shares_grapheme(&self, other: &ClueItem) -> bool {
        self.graphemes
            .iter()
            .any(|g| other.graphemes.iter().any(|h| grapheme::compare_graphemes(g, h)))
    }

    /// The answer in the editor export alphabet.
    pub fn encoded_answer(&self) -> String {
        self.graphemes.iter().map(|g| grapheme::encode_grapheme(g)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_messy_input() {
        let item = ClueItem::new(" hel-lo! ", "a greeting").unwrap();
        assert_eq!(item.answer, "hello");
        assert_eq!(item.graphemes.len(), 5);
        assert_eq!(item.graphemes.concat(), item.answer);
    }

    #[test]
    fn rejects_degenerate_answers() {
        assert_eq!(ClueItem::new("  ", "c"), Err(InvalidAnswer::Empty));
        assert_eq!(
            ClueItem::new("a", "c"),
            Err(InvalidAnswer::TooShort("a".into()))
        );
        let long = "x".repeat(MAX_ANSWER_GRAPHEMES + 1);
        assert!(matches!(
            ClueItem::new(&long, "c"),
            Err(InvalidAnswer::TooLong(_))
        ));
    }

    #[test]
    fn rejects_answers_containing_braces() {
        assert_eq!(
            ClueItem::new("CA{T}", "pet"),
            Err(InvalidAnswer::Brace("CA{T}".into()))
        );
        assert_eq!(
            ClueItem::new("}OOPS", "broken"),
            Err(InvalidAnswer::Brace("}OOPS".into()))
        );
    }

    #[test]
    fn devanagari_answer_keeps_cluster_cells() {
        let item = ClueItem::new("नमस्ते", "greeting").unwrap();
        assert_eq!(item.len(), 3);
        assert_eq!(item.graphemes[0], "न");
    }

    #[test]
    fn shares_grapheme_uses_nfc_identity() {
        let a = ClueItem::new("caf\u{00E9}", "").unwrap();
        let b = ClueItem::new("e\u{0301}tude", "").unwrap();
        assert!(a.shares_grapheme(&b));
        let c = ClueItem::new("xyz", "").unwrap();
        assert!(!a.shares_grapheme(&c));
    }
}
