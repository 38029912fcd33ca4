//! Seeded crossword placement engine.
//!
//! Words are sorted by connectivity, placed one at a time so they interlock
//! at shared graphemes, and validated against strict adjacency and boundary
//! rules. Low-fill attempts are retried with shuffled orderings and
//! randomized tie-breaking; the best attempt wins. The same
//! `(clues, width, height, seed)` tuple always produces the same puzzle.

use crate::clue::ClueItem;
use crate::direction::Direction;
use crate::grapheme;
use crate::grid::Grid;
use crate::puzzle::{CrosswordPuzzle, Placement, PuzzleStats};
use crate::rng::PuzzleRng;
use log::{debug, info};
use std::time::{SystemTime, UNIX_EPOCH};

/// Engine configuration parameters.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    /// Missing seed: derived from the wall clock.
    pub seed: Option<u64>,
    pub retry_attempts: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 18,
            height: 18,
            seed: None,
            retry_attempts: 20,
        }
    }
}

/// Fill ratio below which shuffled retries are attempted.
const RETRY_FILL_THRESHOLD: f64 = 0.6;
/// Fill ratio below which the result carries a warning.
const LOW_FILL_THRESHOLD: f64 = 0.4;

/// A fully specified word for manual advanced mode.
#[derive(Debug, Clone)]
pub struct ManualWord {
    pub answer: String,
    pub clue: String,
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
}

/// Tracks every successful start cell, to reject colliding starts.
#[derive(Debug, Clone)]
struct StartRecord {
    x: usize,
    y: usize,
    direction: Direction,
    first: String,
}

/// Grid state of one placement attempt.
struct Engine {
    width: usize,
    height: usize,
    grid: Grid,
    placements: Vec<Placement>,
    starts: Vec<StartRecord>,
    next_word_id: u32,
}

impl Engine {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            grid: Grid::new(width, height),
            placements: Vec::new(),
            starts: Vec::new(),
            next_word_id: 1,
        }
    }

    /// Place the first word centered on the grid. Returns false when
    /// neither orientation fits.
    fn place_first(&mut self, item: &ClueItem, rng: &mut PuzzleRng, randomized: bool) -> bool {
        let len = item.len() as i64;
        let mut options: Vec<(i64, i64, Direction)> = Vec::new();

        for direction in [Direction::Across, Direction::Down] {
            let (x, y) = match direction {
                Direction::Across => ((self.width as i64 - len) / 2, self.height as i64 / 2),
                Direction::Down => (self.width as i64 / 2, (self.height as i64 - len) / 2),
            };
            if self.validate(item, x, y, direction) {
                options.push((x, y, direction));
            }
        }

        let index = match options.len() {
            0 => return false,
            1 => 0,
            n if randomized => rng.pick(n),
            _ => 0,
        };
        let (x, y, direction) = options[index];
        self.commit(item, x as usize, y as usize, direction);
        true
    }

    /// Place a word so it crosses an already-placed word at a shared
    /// grapheme. Among valid candidates the one closest to the grid center
    /// wins (default) or a PRNG-ranked one (retry mode).
    fn place_connected(
        &mut self,
        item: &ClueItem,
        lookahead: usize,
        rng: &mut PuzzleRng,
        randomized: bool,
    ) -> bool {
        let mut best: Option<(usize, i64, i64, i64, Direction)> = None;

        for placement_index in 0..self.placements.len() {
            let (pairs, anchor_x, anchor_y, direction) = {
                let placed = &self.placements[placement_index];
                (
                    grapheme::find_common_graphemes(&item.graphemes, &placed.item.graphemes),
                    placed.x as i64,
                    placed.y as i64,
                    placed.direction,
                )
            };
            let (dx, dy) = direction.delta();
            let new_direction = direction.perpendicular();

            for (i, j) in pairs {
                // Align grapheme i of the candidate onto cell j of the
                // placed word; the start backs up along the new axis.
                let cell_x = anchor_x + dx * j as i64;
                let cell_y = anchor_y + dy * j as i64;
                let (x, y) = match new_direction {
                    Direction::Across => (cell_x - i as i64, cell_y),
                    Direction::Down => (cell_x, cell_y - i as i64),
                };

                if !self.validate(item, x, y, new_direction) {
                    continue;
                }
                let tie = if randomized {
                    rng.rank() as i64
                } else {
                    self.dist_to_center(x, y, item.len() as i64)
                };
                let better = match &best {
                    None => true,
                    Some((best_score, best_tie, ..)) => {
                        lookahead > *best_score || (lookahead == *best_score && tie < *best_tie)
                    }
                };
                if better {
                    best = Some((lookahead, tie, x, y, new_direction));
                }
            }
        }

        match best {
            Some((_, _, x, y, direction)) => {
                self.commit(item, x as usize, y as usize, direction);
                true
            }
            None => false,
        }
    }

    /// Manhattan distance from the word's midpoint to the grid center,
    /// doubled to stay in integers.
    fn dist_to_center(&self, x: i64, y: i64, len: i64) -> i64 {
        (2 * x + len - self.width as i64).abs() + (2 * y + len - self.height as i64).abs()
    }

    /// All placement rules: bounds, start-cell collision, per-cell
    /// occupancy, strict side-adjacency and word-ends clearance.
    fn validate(&self, item: &ClueItem, x: i64, y: i64, direction: Direction) -> bool {
        let len = item.len() as i64;
        let (dx, dy) = direction.delta();
        let end_x = x + dx * (len - 1);
        let end_y = y + dy * (len - 1);

        if x < 0 || y < 0 || end_x >= self.width as i64 || end_y >= self.height as i64 {
            return false;
        }

        // Two words may share a start cell only when they run in
        // perpendicular directions and agree on the first grapheme.
        let first = &item.graphemes[0];
        for record in &self.starts {
            if record.x as i64 == x
                && record.y as i64 == y
                && (record.direction == direction
                    || !grapheme::compare_graphemes(&record.first, first))
            {
                return false;
            }
        }

        for (offset, g) in item.graphemes.iter().enumerate() {
            let cx = x + dx * offset as i64;
            let cy = y + dy * offset as i64;
            let Some(cell) = self.grid.cell(cx as usize, cy as usize) else {
                return false;
            };
            match &cell.grapheme {
                Some(existing) => {
                    if !grapheme::compare_graphemes(existing, g) {
                        return false;
                    }
                }
                None => {
                    // A fresh cell must not touch a parallel word.
                    if !self.grid.is_empty_at(cx - dy, cy - dx)
                        || !self.grid.is_empty_at(cx + dy, cy + dx)
                    {
                        return false;
                    }
                }
            }
        }

        // Nothing directly before or after the word on its own axis.
        self.grid.is_empty_at(x - dx, y - dy) && self.grid.is_empty_at(end_x + dx, end_y + dy)
    }

    /// Bounds and per-cell compatibility only; the caller owns the layout.
    fn validate_manual(&self, item: &ClueItem, x: i64, y: i64, direction: Direction) -> Result<(), String> {
        let len = item.len() as i64;
        let (dx, dy) = direction.delta();
        let end_x = x + dx * (len - 1);
        let end_y = y + dy * (len - 1);

        if x < 0 || y < 0 || end_x >= self.width as i64 || end_y >= self.height as i64 {
            return Err(format!(
                "extends beyond the {}x{} grid",
                self.width, self.height
            ));
        }

        for (offset, g) in item.graphemes.iter().enumerate() {
            let cx = (x + dx * offset as i64) as usize;
            let cy = (y + dy * offset as i64) as usize;
            if let Some(existing) = self.grid.grapheme_at(cx, cy) {
                if !grapheme::compare_graphemes(existing, g) {
                    return Err(format!("grapheme conflict at ({cx}, {cy})"));
                }
            }
        }
        Ok(())
    }

    fn commit(&mut self, item: &ClueItem, x: usize, y: usize, direction: Direction) {
        let word_id = self.next_word_id;
        self.next_word_id += 1;

        let placement = Placement {
            word_id,
            item: item.clone(),
            x,
            y,
            direction,
        };
        for (offset, (cx, cy)) in placement.positions().into_iter().enumerate() {
            self.grid.place(cx, cy, &item.graphemes[offset], word_id);
        }
        self.starts.push(StartRecord {
            x,
            y,
            direction,
            first: item.graphemes[0].clone(),
        });
        debug!(
            "placed word {} \"{}\" at ({}, {}) {:?}",
            word_id, item.answer, x, y, direction
        );
        self.placements.push(placement);
    }
}

struct AttemptOutcome {
    placements: Vec<Placement>,
    unplaced: Vec<ClueItem>,
}

fn run_attempt(
    clues: &[ClueItem],
    config: &GeneratorConfig,
    rng: &mut PuzzleRng,
    randomized: bool,
) -> AttemptOutcome {
    let mut engine = Engine::new(config.width, config.height);
    let mut unplaced = Vec::new();

    for (index, item) in clues.iter().enumerate() {
        let lookahead = clues[index + 1..]
            .iter()
            .filter(|other| other.shares_grapheme(item))
            .count();
        let placed = if engine.placements.is_empty() {
            engine.place_first(item, rng, randomized)
        } else {
            engine.place_connected(item, lookahead, rng, randomized)
        };
        if !placed {
            unplaced.push(item.clone());
        }
    }

    AttemptOutcome {
        placements: engine.placements,
        unplaced,
    }
}

/// Crop to the tight bounding box of the placed cells, shifting placements
/// and re-deriving every cell from them. Zero placements keep the original
/// dimensions and an empty grid.
fn crop(outcome: AttemptOutcome, width: usize, height: usize) -> (Grid, Vec<Placement>, Vec<ClueItem>) {
    let AttemptOutcome {
        mut placements,
        unplaced,
    } = outcome;

    if placements.is_empty() {
        return (Grid::new(width, height), placements, unplaced);
    }

    let mut min_x = usize::MAX;
    let mut min_y = usize::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    for placement in &placements {
        for (x, y) in placement.positions() {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    let mut grid = Grid::new(max_x - min_x + 1, max_y - min_y + 1);
    for placement in &mut placements {
        placement.x -= min_x;
        placement.y -= min_y;
    }
    for placement in &placements {
        for (offset, (x, y)) in placement.positions().into_iter().enumerate() {
            grid.place(x, y, &placement.item.graphemes[offset], placement.word_id);
        }
    }
    (grid, placements, unplaced)
}

fn fill_ratio(placed: usize, requested: usize) -> f64 {
    if requested == 0 {
        0.0
    } else {
        placed as f64 / requested as f64
    }
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

/// Connectivity score per word: how many *other* words share at least one
/// grapheme with it.
fn intersection_scores(clues: &[ClueItem]) -> Vec<usize> {
    clues
        .iter()
        .enumerate()
        .map(|(i, item)| {
            clues
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && other.shares_grapheme(item))
                .count()
        })
        .collect()
}

/// Generate a crossword from `clues` on a `width` x `height` grid.
///
/// Deterministic in `(clues, width, height, seed)`. Words are attempted in
/// connectivity order; attempts whose fill ratio stays below 0.6 are
/// retried with shuffled orderings, keeping the attempt that places the
/// most words.
pub fn generate_puzzle(
    clues: &[ClueItem],
    config: &GeneratorConfig,
) -> Result<CrosswordPuzzle, GeneratorError> {
    if config.width == 0 || config.height == 0 {
        return Err(GeneratorError::InvalidDimensions);
    }
    if clues.is_empty() {
        return Err(GeneratorError::EmptyWordList);
    }

    let seed = config.seed.unwrap_or_else(seed_from_clock);
    let requested = clues.len();

    let scores = intersection_scores(clues);
    let mut order: Vec<usize> = (0..clues.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .cmp(&scores[a])
            .then_with(|| clues[b].len().cmp(&clues[a].len()))
    });
    let sorted: Vec<ClueItem> = order.into_iter().map(|i| clues[i].clone()).collect();

    let mut rng = PuzzleRng::seeded(seed);
    let mut best = run_attempt(&sorted, config, &mut rng, false);

    let mut attempt = 0;
    while fill_ratio(best.placements.len(), requested) < RETRY_FILL_THRESHOLD
        && attempt < config.retry_attempts
    {
        attempt += 1;
        let mut retry_rng = PuzzleRng::seeded(seed.wrapping_add(attempt as u64));
        let mut shuffled = sorted.clone();
        retry_rng.shuffle(&mut shuffled);
        let outcome = run_attempt(&shuffled, config, &mut retry_rng, true);
        if outcome.placements.len() > best.placements.len() {
            best = outcome;
        }
    }

    let placed = best.placements.len();
    let ratio = fill_ratio(placed, requested);
    let warning = if ratio < LOW_FILL_THRESHOLD {
        Some(format!(
            "Grid too constrained: only {placed}/{requested} words placed ({}%).",
            (ratio * 100.0).round() as u32
        ))
    } else {
        None
    };
    info!(
        "placed {placed}/{requested} words after {} attempt(s)",
        attempt + 1
    );

    let (grid, placements, unplaced) = crop(best, config.width, config.height);
    let (out_width, out_height) = (grid.width, grid.height);
    Ok(CrosswordPuzzle {
        grid,
        placements,
        unplaced,
        width: out_width,
        height: out_height,
        warning,
        stats: PuzzleStats {
            requested,
            placed,
            unplaced: requested - placed,
            fill_ratio: ratio,
        },
    })
}

/// Build a puzzle from fully specified placements.
///
/// Only bounds and per-cell grapheme agreement are enforced; side-adjacency
/// and word-ends rules do not apply to caller-authored layouts, and the
/// grid is not cropped. Every invalid placement is reported.
pub fn place_manual(
    words: &[ManualWord],
    width: usize,
    height: usize,
) -> Result<CrosswordPuzzle, GeneratorError> {
    if width == 0 || height == 0 {
        return Err(GeneratorError::InvalidDimensions);
    }
    if words.is_empty() {
        return Err(GeneratorError::EmptyWordList);
    }

    let mut engine = Engine::new(width, height);
    let mut errors = Vec::new();

    for (index, word) in words.iter().enumerate() {
        let item = match ClueItem::new(&word.answer, &word.clue) {
            Ok(item) => item,
            Err(err) => {
                errors.push(ManualPlacementError {
                    index,
                    word: word.answer.clone(),
                    message: err.to_string(),
                });
                continue;
            }
        };
        match engine.validate_manual(&item, word.col as i64, word.row as i64, word.direction) {
            Ok(()) => engine.commit(&item, word.col, word.row, word.direction),
            Err(message) => errors.push(ManualPlacementError {
                index,
                word: item.answer.clone(),
                message,
            }),
        }
    }

    if !errors.is_empty() {
        return Err(GeneratorError::ManualPlacement(errors));
    }

    let placed = engine.placements.len();
    Ok(CrosswordPuzzle {
        grid: engine.grid,
        placements: engine.placements,
        unplaced: Vec::new(),
        width,
        height,
        warning: None,
        stats: PuzzleStats {
            requested: placed,
            placed,
            unplaced: 0,
            fill_ratio: 1.0,
        },
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualPlacementError {
    pub index: usize,
    pub word: String,
    pub message: String,
}

fn format_manual_errors(errors: &[ManualPlacementError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.word, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("grid dimensions must be at least 1x1")]
    InvalidDimensions,
    #[error("no words to place")]
    EmptyWordList,
    #[error("{}", format_manual_errors(.0))]
    ManualPlacement(Vec<ManualPlacementError>),
}
