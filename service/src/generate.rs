//! The generation pipeline, from validated request to artifact bundle.

use crate::clues::{ClueError, ClueProvider, ClueSpec, RawCluePair};
use crate::request::{GenerationRequest, Mode, RequestError};
use crate::response::{GenerationResponse, PuzzleView};
use crate::store::{
    AI_TRACE_FILE, AiTraceArtifact, ArtifactStore, CANDIDATES_FILE, CandidateArtifact,
    CrosswordMeta, FILTERED_FILE, FilteredArtifact, GRID_FILE, GridArtifact, META_FILE,
    PLACEMENTS_FILE, POLYOMINO_FILE, PlacedEntry, PlacementsArtifact, SUMMARY_FILE,
    SummaryArtifact, UnplacedEntry,
};
use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;
use wordweave_core::{
    ClueItem, CrosswordPuzzle, Direction, GeneratorConfig, GeneratorError, ManualWord,
    PolyominoConfig, RemovedWord, filter_clues, generate_polyomino, generate_puzzle,
    place_manual, serialize_puzzle,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("AI clue generation failed: {0}")]
    Clue(#[from] ClueError),
    #[error("No words passed filter.")]
    FilterExhausted,
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Run one generation request end to end.
///
/// Artifact writes are best-effort: a persistence failure is logged and the
/// response stays usable. On a failed generation a summary artifact is
/// still attempted so the run leaves a trace.
pub async fn handle_generate<P: ClueProvider>(
    request: &GenerationRequest,
    provider: &P,
    store: &ArtifactStore,
) -> GenerationResponse {
    let crossword_id = ArtifactStore::new_crossword_id();
    match run(request, provider, store, &crossword_id).await {
        Ok(response) => response,
        Err(err) => {
            let summary = SummaryArtifact {
                mode: request.mode,
                placed_count: 0,
                unplaced_count: 0,
                filtered_count: 0,
                requested_count: 0,
                fill_ratio: 0.0,
                warning: Some(err.to_string()),
            };
            persist(store, &crossword_id, SUMMARY_FILE, &summary);
            GenerationResponse::failure(err.to_string())
        }
    }
}

async fn run<P: ClueProvider>(
    request: &GenerationRequest,
    provider: &P,
    store: &ArtifactStore,
    id: &str,
) -> Result<GenerationResponse, ServiceError> {
    request.validate()?;

    let mut ai_trace = None;
    let pairs: Vec<RawCluePair> = match request.mode {
        Mode::Ai => {
            let input_type = request.input_type.ok_or(RequestError::MissingAiInput)?;
            let input_value = request
                .input_value
                .as_deref()
                .ok_or(RequestError::MissingAiInput)?;
            let spec = ClueSpec {
                input_type,
                input_value,
                num_items: request.num_items,
                language: &request.content_language,
                instructions: request.user_instructions.as_deref(),
            };
            let batch = provider.generate_clues(&spec).await?;
            info!("AI returned {} clue pair(s) for {id}", batch.pairs.len());
            ai_trace = Some(AiTraceArtifact {
                prompt: batch.prompt,
                model: batch.model,
                raw_response: batch.raw_response,
                timestamp: Utc::now().to_rfc3339(),
            });
            batch.pairs
        }
        _ => request
            .words
            .iter()
            .map(|w| RawCluePair {
                answer: w.word.clone(),
                clue: w.clue.clone(),
            })
            .collect(),
    };

    let meta = CrosswordMeta {
        id: id.to_owned(),
        theme: request.theme().to_owned(),
        language: request.content_language.clone(),
        grid_size: format!("{}x{}", request.grid_size_x, request.grid_size_y),
        requested_count: pairs.len(),
        created_at: Utc::now().to_rfc3339(),
        user_id: request.session_id.clone(),
        mode: request.mode,
        metadata: serde_json::json!({
            "inputType": request.input_type,
            "numItems": request.num_items,
            "userInstructions": request.user_instructions,
        }),
    };
    persist(store, id, META_FILE, &meta);
    if let Some(trace) = &ai_trace {
        persist(store, id, AI_TRACE_FILE, trace);
    }

    let (puzzle, filter_warning, filtered_count) = match request.mode {
        Mode::ManualAdvanced => (build_manual_advanced(request, store, id)?, None, 0),
        _ => build_auto(request, store, id, &pairs)?,
    };

    finish(
        request,
        store,
        id,
        puzzle,
        filter_warning,
        filtered_count,
        pairs.len(),
    )
}

/// AI and manual basic modes: tokenize, filter, then search.
fn build_auto(
    request: &GenerationRequest,
    store: &ArtifactStore,
    id: &str,
    pairs: &[RawCluePair],
) -> Result<(CrosswordPuzzle, Option<String>, usize), ServiceError> {
    let mut candidates = Vec::new();
    let mut invalid = Vec::new();
    for pair in pairs {
        match ClueItem::new(&pair.answer, &pair.clue) {
            Ok(item) => candidates.push(item),
            Err(err) => invalid.push(RemovedWord {
                answer: pair.answer.clone(),
                reason: err.to_string(),
            }),
        }
    }
    let candidate_artifacts: Vec<CandidateArtifact> =
        candidates.iter().map(candidate_artifact).collect();
    persist(store, id, CANDIDATES_FILE, &candidate_artifacts);

    let outcome = filter_clues(&candidates, request.grid_size_x, request.grid_size_y);
    let mut removed = invalid;
    removed.extend(outcome.removed.iter().cloned());
    let filtered_count = removed.len();
    persist(
        store,
        id,
        FILTERED_FILE,
        &FilteredArtifact {
            kept: outcome.kept.iter().map(candidate_artifact).collect(),
            removed,
        },
    );

    if outcome.kept.is_empty() {
        return Err(ServiceError::FilterExhausted);
    }

    let puzzle = generate_puzzle(
        &outcome.kept,
        &GeneratorConfig {
            width: request.grid_size_x,
            height: request.grid_size_y,
            seed: request.seed,
            retry_attempts: 20,
        },
    )?;
    Ok((puzzle, outcome.warning, filtered_count))
}

/// Manual advanced mode: the caller authored the layout; only validate it.
fn build_manual_advanced(
    request: &GenerationRequest,
    store: &ArtifactStore,
    id: &str,
) -> Result<CrosswordPuzzle, ServiceError> {
    let words: Vec<ManualWord> = request
        .words
        .iter()
        .map(|w| ManualWord {
            answer: w.word.clone(),
            clue: w.clue.clone(),
            row: w.row.unwrap_or_default(),
            col: w.col.unwrap_or_default(),
            direction: w.direction.unwrap_or(Direction::Across),
        })
        .collect();
    let puzzle = place_manual(&words, request.grid_size_x, request.grid_size_y)?;

    let artifacts: Vec<CandidateArtifact> = puzzle
        .placements
        .iter()
        .map(|p| candidate_artifact(&p.item))
        .collect();
    persist(store, id, CANDIDATES_FILE, &artifacts);
    persist(
        store,
        id,
        FILTERED_FILE,
        &FilteredArtifact {
            kept: artifacts.clone(),
            removed: Vec::new(),
        },
    );
    Ok(puzzle)
}

fn finish(
    request: &GenerationRequest,
    store: &ArtifactStore,
    id: &str,
    puzzle: CrosswordPuzzle,
    filter_warning: Option<String>,
    filtered_count: usize,
    requested_count: usize,
) -> Result<GenerationResponse, ServiceError> {
    persist(
        store,
        id,
        PLACEMENTS_FILE,
        &PlacementsArtifact {
            placed: puzzle
                .placements
                .iter()
                .map(|p| PlacedEntry {
                    answer: p.item.answer.clone(),
                    row: p.y,
                    col: p.x,
                    direction: p.direction,
                })
                .collect(),
            unplaced: puzzle
                .unplaced
                .iter()
                .map(|item| UnplacedEntry {
                    answer: item.answer.clone(),
                    reason: "no valid intersection found".to_owned(),
                })
                .collect(),
        },
    );
    persist(store, id, GRID_FILE, &GridArtifact::from_grid(&puzzle.grid));

    if !puzzle.placements.is_empty() {
        let pieces = generate_polyomino(
            &puzzle.placements,
            puzzle.width,
            puzzle.height,
            request.theme(),
            &PolyominoConfig::default(),
        );
        for note in &pieces.warnings {
            warn!("polyomino for {id}: {note}");
        }
        persist(store, id, POLYOMINO_FILE, &pieces);
    }

    let warning = match (&filter_warning, &puzzle.warning) {
        (Some(f), Some(p)) => Some(format!("{f}; {p}")),
        (Some(f), None) => Some(f.clone()),
        (None, Some(p)) => Some(p.clone()),
        (None, None) => None,
    };

    persist(
        store,
        id,
        SUMMARY_FILE,
        &SummaryArtifact {
            mode: request.mode,
            placed_count: puzzle.stats.placed,
            unplaced_count: puzzle.stats.unplaced,
            filtered_count,
            requested_count,
            fill_ratio: puzzle.stats.fill_ratio,
            warning: warning.clone(),
        },
    );

    let payload = serialize_puzzle(&puzzle, request.remove_unplaced_words);
    Ok(GenerationResponse {
        success: true,
        crossword_id: Some(id.to_owned()),
        puzzle: Some(PuzzleView {
            grid: payload.grid,
            placements: payload.placed,
            unplaced_words: payload.unplaced,
            grid_width: puzzle.width,
            grid_height: puzzle.height,
            warning: puzzle.warning.clone(),
        }),
        payload: Some(payload.query),
        warning,
        error: None,
    })
}

fn candidate_artifact(item: &ClueItem) -> CandidateArtifact {
    CandidateArtifact {
        answer: item.answer.clone(),
        graphemes: item.graphemes.clone(),
        clue: item.clue.clone(),
    }
}

fn persist<T: Serialize>(store: &ArtifactStore, id: &str, name: &str, value: &T) {
    if let Err(err) = store.write_artifact(id, name, value) {
        warn!("failed to write {name} for {id}: {err}");
    }
}
