use crate::clue::ClueItem;
use crate::direction::Direction;
use crate::grid::Grid;
use serde::{Deserialize, Serialize};

/// A committed word on the grid.
///
/// `word_id` is 1-based, assigned in placement order, and stable for the
/// lifetime of the puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub word_id: u32,
    pub item: ClueItem,
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
}

impl Placement {
    pub fn len(&self) -> usize {
        self.item.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_empty()
    }

    /// The covered cells, start to end.
    pub fn positions(&self) -> Vec<(usize, usize)> {
        let (dx, dy) = self.direction.delta();
        (0..self.len())
            .map(|i| {
                (
                    (self.x as i64 + dx * i as i64) as usize,
                    (self.y as i64 + dy * i as i64) as usize,
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PuzzleStats {
    pub requested: usize,
    pub placed: usize,
    pub unplaced: usize,
    pub fill_ratio: f64,
}

/// A finished crossword: cropped grid, committed placements, and the words
/// that found no home.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrosswordPuzzle {
    pub grid: Grid,
    pub placements: Vec<Placement>,
    pub unplaced: Vec<ClueItem>,
    pub width: usize,
    pub height: usize,
    pub warning: Option<String>,
    pub stats: PuzzleStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_follow_the_word_axis() {
        let item = ClueItem::new("abc", "").unwrap();
        let across = Placement {
            word_id: 1,
            item: item.clone(),
            x: 2,
            y: 5,
            direction: Direction::Across,
        };
        assert_eq!(across.positions(), vec![(2, 5), (3, 5), (4, 5)]);

        let down = Placement {
            word_id: 2,
            item,
            x: 2,
            y: 5,
            direction: Direction::Down,
        };
        assert_eq!(down.positions(), vec![(2, 5), (2, 6), (2, 7)]);
    }
}
