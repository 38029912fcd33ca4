//! Generation response shape.

use serde::Serialize;
use wordweave_core::{PlacedWordInfo, UnplacedWordInfo};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleView {
    pub grid: Vec<Vec<Option<String>>>,
    pub placements: Vec<PlacedWordInfo>,
    pub unplaced_words: Vec<UnplacedWordInfo>,
    pub grid_width: usize,
    pub grid_height: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crossword_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub puzzle: Option<PuzzleView>,
    /// URL-encoded editor payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            crossword_id: None,
            puzzle: None,
            payload: None,
            warning: None,
            error: Some(message.into()),
        }
    }
}
