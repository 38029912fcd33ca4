use serde::{Deserialize, Serialize};

/// One grid cell: the grapheme it holds (if any) and the ids of the words
/// covering it, in placement order. `word_ids` is non-empty iff the cell is
/// occupied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub grapheme: Option<String>,
    pub word_ids: Vec<u32>,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.grapheme.is_none()
    }

    pub fn is_occupied(&self) -> bool {
        self.grapheme.is_some()
    }

    /// A cell covered by more than one word.
    pub fn is_intersection(&self) -> bool {
        self.word_ids.len() > 1
    }
}

/// Rectangular cell grid addressed as `(x = column, y = row)`, 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        let cells = vec![vec![Cell::default(); width]; height];
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.cells.get(y)?.get(x)
    }

    pub fn cell_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        self.cells.get_mut(y)?.get_mut(x)
    }

    pub fn grapheme_at(&self, x: usize, y: usize) -> Option<&str> {
        self.cell(x, y)?.grapheme.as_deref()
    }

    /// Whether `(x, y)` is outside the grid or an empty cell. Signed
    /// coordinates let callers probe neighbors of border cells.
    pub fn is_empty_at(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return true;
        }
        self.cells[y as usize][x as usize].is_empty()
    }

    /// Write `grapheme` into `(x, y)` if the cell is empty and record
    /// `word_id` as covering it. Out-of-bounds writes are ignored; callers
    /// validate bounds first.
    pub fn place(&mut self, x: usize, y: usize, grapheme: &str, word_id: u32) {
        if let Some(cell) = self.cell_mut(x, y) {
            if cell.grapheme.is_none() {
                cell.grapheme = Some(grapheme.to_owned());
            }
            cell.word_ids.push(word_id);
        }
    }

    /// Grapheme per cell, for display and the grid artifact.
    pub fn display(&self) -> Vec<Vec<Option<String>>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.grapheme.clone()).collect())
            .collect()
    }

    pub fn filled_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|c| c.is_occupied()).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_sets_grapheme_once_and_stacks_word_ids() {
        let mut grid = Grid::new(3, 3);
        grid.place(1, 1, "A", 1);
        grid.place(1, 1, "A", 2);

        let cell = grid.cell(1, 1).unwrap();
        assert_eq!(cell.grapheme.as_deref(), Some("A"));
        assert_eq!(cell.word_ids, vec![1, 2]);
        assert!(cell.is_intersection());
        assert_eq!(grid.filled_count(), 1);
    }

    #[test]
    fn out_of_bounds_probes_read_as_empty() {
        let grid = Grid::new(2, 2);
        assert!(grid.is_empty_at(-1, 0));
        assert!(grid.is_empty_at(0, 2));
        assert!(grid.cell(5, 5).is_none());
    }
}
