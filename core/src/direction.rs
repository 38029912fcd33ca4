use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Across,
    Down,
}

impl Direction {
    /// Unit step along the word axis as `(dx, dy)`.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::Across => (1, 0),
            Direction::Down => (0, 1),
        }
    }

    pub fn perpendicular(self) -> Direction {
        match self {
            Direction::Across => Direction::Down,
            Direction::Down => Direction::Across,
        }
    }
}
