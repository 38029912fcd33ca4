//! Generation request shape and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wordweave_core::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Ai,
    ManualBasic,
    ManualAdvanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InputType {
    Topic,
    Url,
    Pdf,
    Text,
}

/// One caller-provided word. `row`/`col`/`direction` are required only in
/// manual advanced mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordInput {
    pub word: String,
    pub clue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

fn default_num_items() -> usize {
    10
}

fn default_grid_size() -> usize {
    18
}

fn default_remove_unplaced() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub session_id: String,
    /// BCP-47 tag, e.g. `"en"` or `"hi-IN"`.
    pub content_language: String,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<InputType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_value: Option<String>,
    #[serde(default = "default_num_items")]
    pub num_items: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub words: Vec<WordInput>,
    #[serde(default = "default_grid_size")]
    pub grid_size_x: usize,
    #[serde(default = "default_grid_size")]
    pub grid_size_y: usize,
    #[serde(default = "default_remove_unplaced")]
    pub remove_unplaced_words: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl GenerationRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.session_id.trim().is_empty() {
            return Err(RequestError::MissingSessionId);
        }
        if self.content_language.chars().count() < 2 {
            return Err(RequestError::InvalidLanguage);
        }
        if !(3..=50).contains(&self.num_items) {
            return Err(RequestError::InvalidNumItems);
        }
        if !(5..=50).contains(&self.grid_size_x) || !(5..=50).contains(&self.grid_size_y) {
            return Err(RequestError::InvalidGridSize);
        }
        match self.mode {
            Mode::Ai => {
                if self.input_type.is_none()
                    || self.input_value.as_deref().is_none_or(str::is_empty)
                {
                    return Err(RequestError::MissingAiInput);
                }
            }
            Mode::ManualBasic => {
                if self.words.is_empty() {
                    return Err(RequestError::MissingWords);
                }
            }
            Mode::ManualAdvanced => {
                if self.words.is_empty() {
                    return Err(RequestError::MissingWords);
                }
                for word in &self.words {
                    if word.row.is_none() || word.col.is_none() || word.direction.is_none() {
                        return Err(RequestError::MissingWordLayout(word.word.clone()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Theme used for artifacts and the jigsaw: the AI input when present.
    pub fn theme(&self) -> &str {
        self.input_value.as_deref().unwrap_or("custom")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("sessionId must not be empty")]
    MissingSessionId,
    #[error("contentLanguage must be a BCP-47 tag of at least 2 characters")]
    InvalidLanguage,
    #[error("numItems must be between 3 and 50")]
    InvalidNumItems,
    #[error("gridSizeX and gridSizeY must be between 5 and 50")]
    InvalidGridSize,
    #[error("inputType and inputValue are required when mode is \"ai\"")]
    MissingAiInput,
    #[error("words are required in manual modes")]
    MissingWords,
    #[error("word \"{0}\" is missing row, col or direction")]
    MissingWordLayout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_ai_request_fills_defaults() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{
                "sessionId": "s1",
                "contentLanguage": "en",
                "inputType": "TOPIC",
                "inputValue": "space"
            }"#,
        )
        .unwrap();

        assert_eq!(request.mode, Mode::Ai);
        assert_eq!(request.num_items, 10);
        assert_eq!((request.grid_size_x, request.grid_size_y), (18, 18));
        assert!(request.remove_unplaced_words);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn ai_mode_requires_input() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{ "sessionId": "s1", "contentLanguage": "en" }"#,
        )
        .unwrap();
        assert_eq!(request.validate(), Err(RequestError::MissingAiInput));
    }

    #[test]
    fn manual_mode_requires_words() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{ "sessionId": "s1", "contentLanguage": "en", "mode": "manual_basic" }"#,
        )
        .unwrap();
        assert_eq!(request.validate(), Err(RequestError::MissingWords));
    }

    #[test]
    fn manual_advanced_requires_full_layout() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{
                "sessionId": "s1",
                "contentLanguage": "en",
                "mode": "manual_advanced",
                "words": [{ "word": "HELLO", "clue": "hi", "row": 0, "col": 0 }]
            }"#,
        )
        .unwrap();
        assert_eq!(
            request.validate(),
            Err(RequestError::MissingWordLayout("HELLO".into()))
        );
    }

    #[test]
    fn bounds_are_enforced() {
        let base = r#"{
            "sessionId": "s1",
            "contentLanguage": "en",
            "inputType": "TOPIC",
            "inputValue": "space"
        }"#;
        let mut request: GenerationRequest = serde_json::from_str(base).unwrap();
        request.num_items = 2;
        assert_eq!(request.validate(), Err(RequestError::InvalidNumItems));

        let mut request: GenerationRequest = serde_json::from_str(base).unwrap();
        request.grid_size_x = 51;
        assert_eq!(request.validate(), Err(RequestError::InvalidGridSize));

        let mut request: GenerationRequest = serde_json::from_str(base).unwrap();
        request.content_language = "e".into();
        assert_eq!(request.validate(), Err(RequestError::InvalidLanguage));
    }

    #[test]
    fn direction_parses_lowercase() {
        let word: WordInput = serde_json::from_str(
            r#"{ "word": "HI", "clue": "greeting", "row": 1, "col": 2, "direction": "down" }"#,
        )
        .unwrap();
        assert_eq!(word.direction, Some(Direction::Down));
    }
}
