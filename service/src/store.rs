//! Per-crossword artifact persistence.
//!
//! Every generation run leaves a bundle of JSON artifacts under
//! `DATA_DIR/<crosswordId>/`. Files are written to a temp name first and
//! renamed into place, so readers never observe partial artifacts.

use crate::request::Mode;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use wordweave_core::{Direction, RemovedWord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub const DATA_DIR_ENV: &str = "DATA_DIR";
const DEFAULT_DATA_DIR: &str = "data/crosswords";

pub const META_FILE: &str = "meta.json";
pub const AI_TRACE_FILE: &str = "gemini_raw.json";
pub const CANDIDATES_FILE: &str = "candidates.json";
pub const FILTERED_FILE: &str = "filtered.json";
pub const PLACEMENTS_FILE: &str = "placements.json";
pub const GRID_FILE: &str = "grid.json";
pub const SUMMARY_FILE: &str = "summary.json";
pub const POLYOMINO_FILE: &str = "polyomino.json";

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Resolve the artifact root: `DATA_DIR` override, then the default
    /// `data/crosswords` under the working directory.
    pub fn from_env() -> Self {
        let root = std::env::var(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
        Self { root }
    }

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A fresh `cw_<12 hex>` identifier.
    pub fn new_crossword_id() -> String {
        let bytes: [u8; 6] = rand::random();
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        format!("cw_{hex}")
    }

    pub fn crossword_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// Atomically write one artifact (temp file, then rename).
    pub fn write_artifact<T: Serialize>(
        &self,
        id: &str,
        name: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let dir = self.crossword_dir(id);
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(value)?;
        let tmp = dir.join(format!(".{name}.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, dir.join(name))?;
        Ok(())
    }

    pub fn read_meta(&self, id: &str) -> Result<CrosswordMeta, StoreError> {
        let contents = fs::read_to_string(self.crossword_dir(id).join(META_FILE))?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// All stored crosswords, newest first. Entries whose `meta.json` is
    /// missing or unreadable are skipped with a warning.
    pub fn list(&self) -> Result<Vec<CrosswordMeta>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut metas = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().into_owned();
            match self.read_meta(&id) {
                Ok(meta) => metas.push(meta),
                Err(err) => warn!("skipping crossword {id}: {err}"),
            }
        }
        metas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(metas)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswordMeta {
    pub id: String,
    pub theme: String,
    pub language: String,
    /// `"WxH"`.
    pub grid_size: String,
    pub requested_count: usize,
    /// ISO-8601 creation time.
    pub created_at: String,
    pub user_id: String,
    pub mode: Mode,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// `gemini_raw.json`: the raw AI exchange, kept for debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiTraceArtifact {
    pub prompt: String,
    pub model: String,
    pub raw_response: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateArtifact {
    pub answer: String,
    pub graphemes: Vec<String>,
    pub clue: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredArtifact {
    pub kept: Vec<CandidateArtifact>,
    pub removed: Vec<RemovedWord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedEntry {
    pub answer: String,
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnplacedEntry {
    pub answer: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementsArtifact {
    pub placed: Vec<PlacedEntry>,
    pub unplaced: Vec<UnplacedEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridCellArtifact {
    pub g: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridArtifact {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Vec<GridCellArtifact>>,
}

impl GridArtifact {
    pub fn from_grid(grid: &wordweave_core::Grid) -> Self {
        Self {
            width: grid.width,
            height: grid.height,
            cells: grid
                .display()
                .into_iter()
                .map(|row| row.into_iter().map(|g| GridCellArtifact { g }).collect())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryArtifact {
    pub mode: Mode,
    pub placed_count: usize,
    pub unplaced_count: usize,
    pub filtered_count: usize,
    pub requested_count: usize,
    pub fill_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: &str, created_at: &str) -> CrosswordMeta {
        CrosswordMeta {
            id: id.to_owned(),
            theme: "space".to_owned(),
            language: "en".to_owned(),
            grid_size: "18x18".to_owned(),
            requested_count: 10,
            created_at: created_at.to_owned(),
            user_id: "s1".to_owned(),
            mode: Mode::Ai,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn crossword_ids_are_well_formed() {
        let id = ArtifactStore::new_crossword_id();
        assert!(id.starts_with("cw_"));
        assert_eq!(id.len(), 15);
        assert!(id[3..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn writes_are_atomic_and_readable() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        store
            .write_artifact("cw_0123456789ab", META_FILE, &meta("cw_0123456789ab", "t"))
            .unwrap();

        let loaded = store.read_meta("cw_0123456789ab").unwrap();
        assert_eq!(loaded.theme, "space");

        // No temp files left behind.
        let names: Vec<String> = fs::read_dir(store.crossword_dir("cw_0123456789ab"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![META_FILE.to_owned()]);
    }

    #[test]
    fn list_skips_broken_entries_and_sorts_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        store
            .write_artifact("cw_a", META_FILE, &meta("cw_a", "2026-01-01T00:00:00Z"))
            .unwrap();
        store
            .write_artifact("cw_b", META_FILE, &meta("cw_b", "2026-02-01T00:00:00Z"))
            .unwrap();
        // Directory without a meta.json.
        fs::create_dir_all(dir.path().join("cw_broken")).unwrap();
        // Corrupt meta.json.
        let bad = dir.path().join("cw_bad");
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join(META_FILE), "not json").unwrap();

        let metas = store.list().unwrap();
        let ids: Vec<&str> = metas.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["cw_b", "cw_a"]);
    }

    #[test]
    fn missing_root_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("nope"));
        assert!(store.list().unwrap().is_empty());
    }
}
