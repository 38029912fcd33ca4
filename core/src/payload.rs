//! Editor-export serialization.
//!
//! Turns a finished puzzle into the query-string payload consumed by the
//! grid editor, plus display and stats views of the same data.

use crate::puzzle::{CrosswordPuzzle, PuzzleStats};
use crate::direction::Direction;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedWordInfo {
    pub number: usize,
    pub answer: String,
    pub clue: String,
    pub start_x: usize,
    pub start_y: usize,
    pub direction: Direction,
    pub grapheme_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnplacedWordInfo {
    pub number: usize,
    pub answer: String,
    pub clue: String,
    pub grapheme_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PuzzlePayload {
    /// `ans{n}=…&question{n}=…` pairs, `application/x-www-form-urlencoded`.
    pub query: String,
    pub grid: Vec<Vec<Option<String>>>,
    pub placed: Vec<PlacedWordInfo>,
    pub unplaced: Vec<UnplacedWordInfo>,
    pub stats: PuzzleStats,
}

/// Percent-encode one form value (space becomes `+`).
pub fn form_urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for &byte in value.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

/// Serialize a puzzle for the editor.
///
/// Words are renumbered from 1 across the exported subset: placed words in
/// placement order, then the unplaced words unless `remove_unplaced` drops
/// them.
pub fn serialize_puzzle(puzzle: &CrosswordPuzzle, remove_unplaced: bool) -> PuzzlePayload {
    let mut query = String::new();
    let mut number = 0;

    let mut placed = Vec::with_capacity(puzzle.placements.len());
    for placement in &puzzle.placements {
        number += 1;
        let _ = write!(
            query,
            "{}ans{number}={}&question{number}={}",
            if number > 1 { "&" } else { "" },
            form_urlencode(&placement.item.encoded_answer()),
            form_urlencode(&placement.item.clue),
        );
        placed.push(PlacedWordInfo {
            number,
            answer: placement.item.answer.clone(),
            clue: placement.item.clue.clone(),
            start_x: placement.x,
            start_y: placement.y,
            direction: placement.direction,
            grapheme_count: placement.item.len(),
        });
    }

    let mut unplaced = Vec::with_capacity(puzzle.unplaced.len());
    for item in &puzzle.unplaced {
        if !remove_unplaced {
            number += 1;
            let _ = write!(
                query,
                "{}ans{number}={}&question{number}={}",
                if number > 1 { "&" } else { "" },
                form_urlencode(&item.encoded_answer()),
                form_urlencode(&item.clue),
            );
        }
        unplaced.push(UnplacedWordInfo {
            number: if remove_unplaced { 0 } else { number },
            answer: item.answer.clone(),
            clue: item.clue.clone(),
            grapheme_count: item.len(),
        });
    }

    if remove_unplaced {
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str("removeUnplacedWords=true");
    }

    PuzzlePayload {
        query,
        grid: puzzle.grid.display(),
        placed,
        unplaced,
        stats: puzzle.stats,
    }
}
