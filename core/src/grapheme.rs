//! Grapheme-level text handling.
//!
//! Every grid cell holds one user-perceived character, so all text entering
//! the engine is NFC-normalized and segmented into extended grapheme
//! clusters (UAX #29). Comparisons go through [`compare_graphemes`] so that
//! precomposed and decomposed spellings of the same character match.

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Zero-width characters stripped from answers (ZWSP, ZWNJ, ZWJ, BOM).
const ZERO_WIDTH: [char; 4] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

/// Punctuation stripped from answers before segmentation.
const PUNCTUATION: [char; 17] = [
    '.', ',', '!', '?', ';', ':', '\'', '"', '(', ')', '[', ']', '{', '}', '-', '–', '—',
];

/// NFC-normalize a string.
pub fn nfc(text: &str) -> String {
    text.nfc().collect()
}

/// NFC-normalize, then segment into extended grapheme clusters.
///
/// Concatenating the result yields the normalized input.
pub fn to_graphemes(text: &str) -> Vec<String> {
    nfc(text).graphemes(true).map(str::to_owned).collect()
}

/// Number of grapheme clusters in `text`.
pub fn grapheme_length(text: &str) -> usize {
    nfc(text).graphemes(true).count()
}

/// The `index`-th grapheme cluster of `text`, if any.
pub fn grapheme_at(text: &str, index: usize) -> Option<String> {
    nfc(text).graphemes(true).nth(index).map(str::to_owned)
}

/// Number of code points in a single grapheme cluster.
pub fn codepoint_count(grapheme: &str) -> usize {
    grapheme.chars().count()
}

pub fn is_multi_codepoint(grapheme: &str) -> bool {
    codepoint_count(grapheme) > 1
}

/// Encode one grapheme for the editor export alphabet.
///
/// Multi-codepoint clusters are wrapped in braces so the consumer can split
/// the answer back into cells without running its own segmenter.
pub fn encode_grapheme(grapheme: &str) -> String {
    if is_multi_codepoint(grapheme) {
        format!("{{{grapheme}}}")
    } else {
        grapheme.to_owned()
    }
}

/// Encode a whole answer: each grapheme through [`encode_grapheme`].
pub fn encode_answer(text: &str) -> String {
    to_graphemes(text).iter().map(|g| encode_grapheme(g)).collect()
}

/// Decode an encoded answer back into its grapheme sequence.
///
/// `{…}` regions become single graphemes; the remainder is split by
/// grapheme cluster.
pub fn decode_answer(encoded: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut bare = String::new();
    let mut chars = encoded.chars();

    while let Some(c) = chars.next() {
        if c == '{' {
            if !bare.is_empty() {
                out.extend(bare.graphemes(true).map(str::to_owned));
                bare.clear();
            }
            let mut cluster = String::new();
            for inner in chars.by_ref() {
                if inner == '}' {
                    break;
                }
                cluster.push(inner);
            }
            if !cluster.is_empty() {
                out.push(cluster);
            }
        } else {
            bare.push(c);
        }
    }
    if !bare.is_empty() {
        out.extend(bare.graphemes(true).map(str::to_owned));
    }
    out
}

/// Whether two graphemes denote the same user-perceived character.
pub fn compare_graphemes(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    nfc(a) == nfc(b)
}

/// All index pairs `(i, j)` with `a[i]` NFC-equal to `b[j]`, in
/// `(i ascending, j ascending)` order.
pub fn find_common_graphemes(a: &[String], b: &[String]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, ga) in a.iter().enumerate() {
        for (j, gb) in b.iter().enumerate() {
            if compare_graphemes(ga, gb) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Strip whitespace, zero-width characters and punctuation from an answer,
/// then NFC-normalize what remains.
pub fn clean_answer_text(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| {
            !c.is_ascii_whitespace() && !ZERO_WIDTH.contains(c) && !PUNCTUATION.contains(c)
        })
        .collect();
    nfc(&stripped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nfc_is_idempotent() {
        let decomposed = "e\u{0301}"; // e + combining acute
        let once = nfc(decomposed);
        assert_eq!(once, "\u{00E9}");
        assert_eq!(nfc(&once), once);
    }

    #[test]
    fn segments_latin_text() {
        assert_eq!(to_graphemes("HELLO"), vec!["H", "E", "L", "L", "O"]);
        assert_eq!(grapheme_length("HELLO"), 5);
        assert_eq!(grapheme_at("HELLO", 1).as_deref(), Some("E"));
        assert_eq!(grapheme_at("HELLO", 5), None);
    }

    #[test]
    fn segments_devanagari_nukta_and_matra() {
        // ड़ा is nukta + vowel sign on one base consonant: a single cell.
        let graphemes = to_graphemes("वड़ा");
        assert_eq!(graphemes.len(), 2);
        assert_eq!(graphemes[0], "व");
        assert!(is_multi_codepoint(&graphemes[1]));
    }

    #[test]
    fn segments_devanagari_conjunct() {
        let graphemes = to_graphemes("क्र");
        assert_eq!(graphemes.len(), 1);
        assert!(is_multi_codepoint(&graphemes[0]));
    }

    #[test]
    fn compares_across_normalization_forms() {
        assert!(compare_graphemes("\u{00E9}", "e\u{0301}"));
        assert!(!compare_graphemes("e", "f"));
    }

    #[test]
    fn encodes_multi_codepoint_graphemes_with_braces() {
        assert_eq!(encode_grapheme("a"), "a");
        assert_eq!(encode_grapheme("क्र"), "{क्र}");
        assert_eq!(encode_answer("HELLO"), "HELLO");
    }

    #[test]
    fn encode_decode_round_trips() {
        for text in ["HELLO", "नमस्ते", "वड़ा", "ab\u{00E9}"] {
            let decoded = decode_answer(&encode_answer(text));
            assert_eq!(decoded, to_graphemes(text), "round trip failed for {text}");
        }
    }

    #[test]
    fn finds_common_graphemes_in_order() {
        let a = to_graphemes("HELP");
        let b = to_graphemes("HELLO");
        assert_eq!(
            find_common_graphemes(&a, &b),
            vec![(0, 0), (1, 1), (2, 2), (2, 3)]
        );
    }

    #[test]
    fn cleans_answer_text() {
        assert_eq!(clean_answer_text("  HEL-LO!  "), "HELLO");
        assert_eq!(clean_answer_text("a\u{200B}b\u{FEFF}c"), "abc");
        assert_eq!(clean_answer_text("{x}"), "x");
        assert_eq!(clean_answer_text("e\u{0301}tude"), "\u{00E9}tude");
    }
}
