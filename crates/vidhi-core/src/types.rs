use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Conversation turns ───────────────────────────────────────────────────

/// Originator of a turn, in the completion service's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One message in a conversation. Serializes to `{role, parts: [{text}]}`,
/// which is exactly what the relay forwards upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    /// Concatenated text of all parts.
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

// ── Completion request / response ────────────────────────────────────────

/// A single `generateContent` call as seen by a [`crate::backend::CompletionBackend`].
///
/// `contents` is kept as raw JSON so the relay can forward a client's history
/// without reshaping it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub contents: Value,
    /// When set, the service is asked to emit JSON matching this schema.
    pub response_schema: Option<Value>,
}

impl CompletionRequest {
    pub fn new(contents: Value) -> Self {
        Self {
            contents,
            response_schema: None,
        }
    }

    pub fn from_turns(turns: &[Turn]) -> Result<Self> {
        Ok(Self::new(serde_json::to_value(turns)?))
    }

    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

// ── Relay wire types ─────────────────────────────────────────────────────

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

impl From<&CompletionRequest> for ChatRequest {
    fn from(req: &CompletionRequest) -> Self {
        Self {
            history: Some(req.contents.clone()),
            response_schema: req.response_schema.clone(),
        }
    }
}

/// Error body returned by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Text of the first candidate in a raw `generateContent` response.
///
/// Returns `None` when the response has no candidate, no content, or only
/// empty text parts.
pub fn candidate_text(response: &Value) -> Option<String> {
    let parsed: GenerateContentResponse = serde_json::from_value(response.clone()).ok()?;
    let content = parsed.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

// ── Structured analysis ──────────────────────────────────────────────────

/// The analysis object the model is asked to produce once it has enough
/// detail about an incident. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "summary_of_incident", default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_sections: Option<Vec<SuggestedSection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark_judgements: Option<Vec<LandmarkJudgement>>,
}

impl AnalysisResult {
    /// Top-level keys that identify a JSON object as an analysis.
    pub const KEYS: [&'static str; 3] =
        ["summary_of_incident", "suggested_sections", "landmark_judgements"];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedSection {
    /// Section and act, e.g. "Section 392 of the Indian Penal Code, 1860".
    #[serde(rename = "section_act", default, deserialize_with = "null_as_empty")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub reasoning: String,
    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkJudgement {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub case_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summary: String,
}

/// Models sometimes emit `null` for a string they have nothing to say about.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
