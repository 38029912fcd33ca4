pub mod clue;
pub mod direction;
pub mod filter;
pub mod generator;
pub mod grapheme;
pub mod grid;
pub mod payload;
pub mod polyomino;
pub mod puzzle;
mod rng;

pub use clue::{ClueItem, InvalidAnswer};
pub use direction::Direction;
pub use filter::{FilterOutcome, RemovedWord, filter_clues};
pub use generator::{GeneratorConfig, GeneratorError, ManualWord, generate_puzzle, place_manual};
pub use grid::{Cell, Grid};
pub use payload::{PlacedWordInfo, PuzzlePayload, UnplacedWordInfo, serialize_puzzle};
pub use polyomino::{Piece, PieceCell, PolyominoConfig, PolyominoPuzzle, generate_polyomino};
pub use puzzle::{CrosswordPuzzle, Placement, PuzzleStats};
