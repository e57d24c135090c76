//! Parse-or-fallback for model output.
//!
//! A model turn is either prose (usually a clarifying question) or an
//! analysis object, possibly wrapped in a code fence or surrounded by
//! chatter. [`parse_model_output`] is the single entry point; it never fails.

use serde_json::Value;
use tracing::debug;

use crate::types::AnalysisResult;

/// Interpretation of one model turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    Analysis(AnalysisResult),
    Text(String),
}

pub fn parse_model_output(text: &str) -> ModelReply {
    for candidate in json_candidates(text) {
        match parse_analysis(candidate) {
            Ok(analysis) => return ModelReply::Analysis(analysis),
            Err(e) => debug!(candidate_len = candidate.len(), "not an analysis object: {e}"),
        }
    }
    ModelReply::Text(text.to_string())
}

/// Parse one JSON fragment as an analysis.
///
/// The fragment must be an object carrying at least one analysis key.
pub fn parse_analysis(fragment: &str) -> anyhow::Result<AnalysisResult> {
    let value: Value = serde_json::from_str(fragment)?;
    let Some(obj) = value.as_object() else {
        anyhow::bail!("top-level JSON is not an object");
    };
    if !AnalysisResult::KEYS.iter().any(|k| obj.contains_key(*k)) {
        anyhow::bail!("object has none of the analysis keys");
    }
    Ok(serde_json::from_value(value)?)
}

/// Fragments worth trying, most specific first: the whole reply, each fenced
/// block, each balanced top-level `{...}` span, then the span from the first
/// `{` to the last `}`.
fn json_candidates(text: &str) -> Vec<&str> {
    let mut out = Vec::new();

    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        out.push(trimmed);
    }

    out.extend(fenced_blocks(text));
    out.extend(balanced_objects(text));

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            out.push(&text[start..=end]);
        }
    }

    let mut seen = Vec::new();
    out.retain(|c| {
        if seen.contains(c) {
            false
        } else {
            seen.push(*c);
            true
        }
    });
    out
}

/// Top-level `{...}` spans whose braces balance, skipping braces inside
/// JSON strings.
fn balanced_objects(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate() {
        if depth == 0 {
            if b == b'{' {
                depth = 1;
                start = i;
            }
            continue;
        }
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    spans
}

/// Bodies of ``` fenced blocks, with an optional language tag stripped.
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let after_open = &rest[open + 3..];
        let Some(close) = after_open.find("```") else {
            break;
        };
        let body = &after_open[..close];
        // Drop the info string ("json", "JSON", ...) on the opening line.
        let body = match body.find('\n') {
            Some(nl) if !body[..nl].trim_start().starts_with('{') => &body[nl + 1..],
            _ => body,
        };
        let body = body.trim();
        if body.starts_with('{') {
            blocks.push(body);
        }
        rest = &after_open[close + 3..];
    }
    blocks
}
