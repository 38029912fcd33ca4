//! Pre-engine suitability filter.
//!
//! Words that cannot interlock with anything (or cannot fit at all) only
//! waste placement attempts, so they are dropped before the engine runs.

use crate::clue::ClueItem;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedWord {
    pub answer: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub kept: Vec<ClueItem>,
    pub removed: Vec<RemovedWord>,
    pub warning: Option<String>,
}

/// Maximum word count for a grid whose short side is `s`.
fn word_cap(s: usize) -> usize {
    match s {
        _ if s <= 7 => 8,
        _ if s <= 10 => 12,
        _ if s <= 15 => 20,
        _ if s <= 20 => 30,
        _ => 40,
    }
}

/// Score each word by how many others share a grapheme with it, drop
/// isolated long words and words that cannot fit, and cap the survivor
/// count for the grid size.
pub fn filter_clues(clues: &[ClueItem], width: usize, height: usize) -> FilterOutcome {
    let counts: Vec<usize> = clues
        .iter()
        .enumerate()
        .map(|(i, item)| {
            clues
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && item.shares_grapheme(other))
                .count()
        })
        .collect();

    let short_side = width.min(height);
    let mut kept: Vec<(usize, ClueItem)> = Vec::new();
    let mut removed: Vec<RemovedWord> = Vec::new();

    for (i, item) in clues.iter().enumerate() {
        if counts[i] == 0 && item.len() > 3 {
            removed.push(RemovedWord {
                answer: item.answer.clone(),
                reason: "shares no grapheme with any other word".to_owned(),
            });
            continue;
        }
        if short_side <= 11 && item.len() + 2 > short_side {
            removed.push(RemovedWord {
                answer: item.answer.clone(),
                reason: format!("too long for a {width}x{height} grid"),
            });
            continue;
        }
        kept.push((i, item.clone()));
    }

    let cap = word_cap(short_side);
    if kept.len() > cap {
        // Top-scoring words survive; the stable sort keeps insertion order
        // between equal scores.
        let mut ranked: Vec<usize> = (0..kept.len()).collect();
        ranked.sort_by(|&a, &b| counts[kept[b].0].cmp(&counts[kept[a].0]));
        ranked.truncate(cap);
        let chosen: Vec<bool> = {
            let mut chosen = vec![false; kept.len()];
            for &r in &ranked {
                chosen[r] = true;
            }
            chosen
        };

        let mut capped = Vec::with_capacity(cap);
        for (pos, (orig, item)) in kept.into_iter().enumerate() {
            if chosen[pos] {
                capped.push((orig, item));
            } else {
                removed.push(RemovedWord {
                    answer: item.answer.clone(),
                    reason: format!("exceeds the {cap}-word cap for this grid size"),
                });
            }
        }
        kept = capped;
    }

    let warning = if removed.is_empty() {
        None
    } else {
        Some(format!(
            "{} word(s) removed due to low crossword suitability",
            removed.len()
        ))
    };
    debug!(
        "suitability filter kept {} of {} words",
        kept.len(),
        clues.len()
    );

    FilterOutcome {
        kept: kept.into_iter().map(|(_, item)| item).collect(),
        removed,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(words: &[&str]) -> Vec<ClueItem> {
        words
            .iter()
            .map(|w| ClueItem::new(w, "clue").unwrap())
            .collect()
    }

    #[test]
    fn drops_isolated_long_words() {
        let clues = items(&["hello", "help", "qqqq"]);
        let outcome = filter_clues(&clues, 15, 15);

        assert_eq!(outcome.kept.len(), 2);
        assert_eq!(outcome.removed.len(), 1);
        assert_eq!(outcome.removed[0].answer, "qqqq");
        assert_eq!(
            outcome.warning.as_deref(),
            Some("1 word(s) removed due to low crossword suitability")
        );
    }

    #[test]
    fn keeps_isolated_filler_words() {
        // Three graphemes or fewer pass even without intersections.
        let clues = items(&["hello", "help", "xyz"]);
        let outcome = filter_clues(&clues, 15, 15);
        assert_eq!(outcome.kept.len(), 3);
    }

    #[test]
    fn drops_words_too_long_for_small_grids() {
        let clues = items(&["abcdefghij", "abc", "cab"]);
        let outcome = filter_clues(&clues, 10, 10);

        assert!(outcome.kept.iter().all(|item| item.answer != "abcdefghij"));
        assert_eq!(outcome.removed.len(), 1);
        assert!(outcome.removed[0].reason.contains("too long"));
    }

    #[test]
    fn long_words_pass_on_large_grids() {
        let clues = items(&["abcdefghijkl", "lab", "cab"]);
        let outcome = filter_clues(&clues, 20, 20);
        assert_eq!(outcome.kept.len(), 3);
    }

    #[test]
    fn caps_word_count_by_grid_size() {
        // 12 interlocking words on a 7x7 grid; the cap there is 8.
        let words: Vec<String> = (0..12).map(|i| format!("ab{}", (b'a' + i) as char)).collect();
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let clues = items(&refs);
        let outcome = filter_clues(&clues, 7, 7);

        assert_eq!(outcome.kept.len(), 8);
        assert_eq!(outcome.removed.len(), 4);
        // Equal scores: insertion order decides.
        assert_eq!(outcome.kept[0].answer, "aba");
        assert!(outcome.removed.iter().any(|r| r.reason.contains("cap")));
    }
}
