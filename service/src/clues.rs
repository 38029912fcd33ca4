//! AI clue generation boundary.
//!
//! The engine only needs `(answer, clue)` pairs; where they come from is
//! behind [`ClueProvider`]. The HTTP implementation talks to a Gemini-style
//! `generateContent` endpoint and tolerates the usual model output quirks
//! (markdown fences, wrapper objects, trailing commas).

use crate::request::InputType;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClueError {
    #[error("AI_API_KEY is not set")]
    MissingApiKey,
    #[error("clue request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("AI response contained no parseable clues")]
    Unparseable,
}

/// What to ask the model for.
#[derive(Debug, Clone)]
pub struct ClueSpec<'a> {
    pub input_type: InputType,
    pub input_value: &'a str,
    pub num_items: usize,
    pub language: &'a str,
    pub instructions: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCluePair {
    #[serde(alias = "word")]
    pub answer: String,
    pub clue: String,
}

/// Parsed pairs plus the exchange trace kept for the artifact bundle.
#[derive(Debug, Clone)]
pub struct ClueBatch {
    pub pairs: Vec<RawCluePair>,
    pub model: String,
    pub prompt: String,
    pub raw_response: String,
}

#[allow(async_fn_in_trait)]
pub trait ClueProvider {
    async fn generate_clues(&self, spec: &ClueSpec<'_>) -> Result<ClueBatch, ClueError>;
}

/// HTTP client for a Gemini-style `generateContent` endpoint, keyed by
/// `AI_API_KEY`.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

pub const API_KEY_ENV: &str = "AI_API_KEY";

impl GeminiClient {
    pub const DEFAULT_MODEL: &'static str = "gemini-2.0-flash";
    pub const DEFAULT_ENDPOINT: &'static str =
        "https://generativelanguage.googleapis.com/v1beta/models";

    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_ENV).ok())
    }

    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("wordweave/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            api_key,
            model: Self::DEFAULT_MODEL.to_owned(),
            endpoint: Self::DEFAULT_ENDPOINT.to_owned(),
            client,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl ClueProvider for GeminiClient {
    async fn generate_clues(&self, spec: &ClueSpec<'_>) -> Result<ClueBatch, ClueError> {
        let api_key = self.api_key.as_deref().ok_or(ClueError::MissingApiKey)?;
        let prompt = build_prompt(spec);
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.endpoint, self.model, api_key
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let reply: GenerateContentResponse = response.json().await?;

        let text = reply
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or(ClueError::Unparseable)?;
        let pairs = parse_clue_pairs(&text).ok_or(ClueError::Unparseable)?;

        Ok(ClueBatch {
            pairs,
            model: self.model.clone(),
            prompt,
            raw_response: text,
        })
    }
}

/// Offline provider returning a fixed batch; used by tests and demos.
#[derive(Debug, Clone, Default)]
pub struct StaticClueProvider {
    pub pairs: Vec<RawCluePair>,
}

impl StaticClueProvider {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            pairs: pairs
                .iter()
                .map(|(answer, clue)| RawCluePair {
                    answer: (*answer).to_owned(),
                    clue: (*clue).to_owned(),
                })
                .collect(),
        }
    }
}

impl ClueProvider for StaticClueProvider {
    async fn generate_clues(&self, spec: &ClueSpec<'_>) -> Result<ClueBatch, ClueError> {
        if self.pairs.is_empty() {
            return Err(ClueError::Unparseable);
        }
        Ok(ClueBatch {
            pairs: self.pairs.clone(),
            model: "static".to_owned(),
            prompt: build_prompt(spec),
            raw_response: serde_json::to_string(&self.pairs).unwrap_or_default(),
        })
    }
}

fn build_prompt(spec: &ClueSpec<'_>) -> String {
    let source = match spec.input_type {
        InputType::Topic => format!("about the topic \"{}\"", spec.input_value),
        InputType::Url => format!("based on the content of the page at {}", spec.input_value),
        InputType::Pdf => format!("based on the document \"{}\"", spec.input_value),
        InputType::Text => format!("based on the following text:\n{}", spec.input_value),
    };
    let mut prompt = format!(
        "Generate {} crossword entries in the language \"{}\" {}. \
         Reply with a JSON array of objects carrying \"answer\" and \"clue\" \
         fields. Answers must be single words without punctuation.",
        spec.num_items, spec.language, source
    );
    if let Some(extra) = spec.instructions {
        let _ = write!(prompt, "\nAdditional instructions: {extra}");
    }
    prompt
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WordsWrapper {
    words: Vec<RawCluePair>,
}

/// Parse model output into clue pairs, repairing common damage.
pub fn parse_clue_pairs(raw: &str) -> Option<Vec<RawCluePair>> {
    let block = extract_json_block(raw);
    for candidate in [block.to_owned(), strip_trailing_commas(block)] {
        if let Ok(pairs) = serde_json::from_str::<Vec<RawCluePair>>(&candidate) {
            if !pairs.is_empty() {
                return Some(pairs);
            }
        }
        if let Ok(wrapper) = serde_json::from_str::<WordsWrapper>(&candidate) {
            if !wrapper.words.is_empty() {
                return Some(wrapper.words);
            }
        }
    }
    None
}

/// Cut the JSON payload out of fences and prose.
fn extract_json_block(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(start) = s.find("```") {
        let after = &s[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            s = after[..end].trim();
        }
    }
    if let (Some(start), Some(end)) = (s.find('['), s.rfind(']')) {
        if start < end {
            return &s[start..=end];
        }
    }
    if let (Some(start), Some(end)) = (s.find('{'), s.rfind('}')) {
        if start < end {
            return &s[start..=end];
        }
    }
    s
}

fn strip_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some(']') | Some('}')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array() {
        let pairs = parse_clue_pairs(
            r#"[{"answer": "HELLO", "clue": "a greeting"}, {"answer": "WORLD", "clue": "the globe"}]"#,
        )
        .unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].answer, "HELLO");
    }

    #[test]
    fn parses_fenced_block_with_prose() {
        let raw = "Here are your words:\n```json\n[{\"answer\": \"SUN\", \"clue\": \"day star\"}]\n```\nEnjoy!";
        let pairs = parse_clue_pairs(raw).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].answer, "SUN");
    }

    #[test]
    fn parses_wrapper_object_and_word_alias() {
        let raw = r#"{"words": [{"word": "MOON", "clue": "night light"}]}"#;
        let pairs = parse_clue_pairs(raw).unwrap();
        assert_eq!(pairs[0].answer, "MOON");
    }

    #[test]
    fn repairs_trailing_commas() {
        let raw = r#"[{"answer": "STAR", "clue": "twinkler"},]"#;
        let pairs = parse_clue_pairs(raw).unwrap();
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_clue_pairs("sorry, I cannot help with that").is_none());
        assert!(parse_clue_pairs("[]").is_none());
    }

    #[tokio::test]
    async fn static_provider_reports_its_exchange() {
        let provider = StaticClueProvider::new(&[("HELLO", "greeting")]);
        let spec = ClueSpec {
            input_type: InputType::Topic,
            input_value: "greetings",
            num_items: 5,
            language: "en",
            instructions: Some("easy ones"),
        };
        let batch = provider.generate_clues(&spec).await.unwrap();
        assert_eq!(batch.pairs.len(), 1);
        assert!(batch.prompt.contains("greetings"));
        assert!(batch.prompt.contains("easy ones"));
        assert!(batch.raw_response.contains("HELLO"));
    }

    #[tokio::test]
    async fn missing_api_key_fails_fast() {
        let client = GeminiClient::new(None);
        let spec = ClueSpec {
            input_type: InputType::Topic,
            input_value: "space",
            num_items: 5,
            language: "en",
            instructions: None,
        };
        assert!(matches!(
            client.generate_clues(&spec).await,
            Err(ClueError::MissingApiKey)
        ));
    }
}
