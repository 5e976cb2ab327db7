//! Response Interpreter - turns free-form model text into a bounded score and reasoning.
//!
//! The model is asked for `{"score": .., "reasoning": ..}` but nothing forces it to comply,
//! so parsing is an ordered chain:
//! 1. greedy `{ ... }` block decoded as a JSON object → `Structured`
//! 2. first ASCII `digits[.digits]` in the raw text → `NumericFallback`
//! 3. nothing usable → `Unparsed`
//!
//! Every variant resolves to a score clamped into `[0, 100]`.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

pub const NO_REASONING: &str = "No reasoning provided.";

const MIN_SCORE: f64 = 0.0;
const MAX_SCORE: f64 = 100.0;

/// Score and justification for one document, before filename/kind are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub score: f64,
    pub reasoning: String,
}

/// What could be recovered from the raw model text.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    /// A JSON object was found. `reasoning` is `None` when absent or blank.
    Structured { score: f64, reasoning: Option<String> },
    /// No usable JSON, but the text contains a number.
    NumericFallback(f64),
    Unparsed,
}

fn json_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"))
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("valid regex"))
}

/// Parses raw model text into a clamped score and non-empty reasoning.
pub fn interpret(raw_text: &str) -> ScoreOutcome {
    let parsed = parse_response(raw_text);
    if !matches!(parsed, ParsedResponse::Structured { .. }) {
        warn!("LLM response did not return valid JSON; using fallback parsing.");
    }
    resolve(parsed, raw_text)
}

/// Runs the parser chain without resolving defaults.
pub fn parse_response(raw_text: &str) -> ParsedResponse {
    parse_structured(raw_text)
        .or_else(|| parse_numeric(raw_text))
        .unwrap_or(ParsedResponse::Unparsed)
}

/// Maps a parse result to the final outcome: clamp, then fill empty reasoning.
pub fn resolve(parsed: ParsedResponse, raw_text: &str) -> ScoreOutcome {
    let fallback_reasoning = raw_text.trim();

    let (score, reasoning) = match parsed {
        ParsedResponse::Structured { score, reasoning } => (
            score,
            reasoning.unwrap_or_else(|| fallback_reasoning.to_string()),
        ),
        ParsedResponse::NumericFallback(score) => (score, fallback_reasoning.to_string()),
        ParsedResponse::Unparsed => (0.0, fallback_reasoning.to_string()),
    };

    ScoreOutcome {
        score: clamp_score(score),
        reasoning: if reasoning.trim().is_empty() {
            NO_REASONING.to_string()
        } else {
            reasoning
        },
    }
}

/// Clamps into `[0, 100]`. NaN and infinities carry no information and become 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(MIN_SCORE, MAX_SCORE)
    } else {
        MIN_SCORE
    }
}

fn parse_structured(raw_text: &str) -> Option<ParsedResponse> {
    let block = json_block_regex().find(raw_text)?;
    let payload: Value = serde_json::from_str(block.as_str()).ok()?;
    let object = payload.as_object()?;

    let score = object.get("score").and_then(coerce_score).unwrap_or(0.0);
    let reasoning = object
        .get("reasoning")
        .and_then(coerce_reasoning)
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    Some(ParsedResponse::Structured { score, reasoning })
}

fn parse_numeric(raw_text: &str) -> Option<ParsedResponse> {
    let found = number_regex().find(raw_text)?;
    found
        .as_str()
        .parse::<f64>()
        .ok()
        .map(ParsedResponse::NumericFallback)
}

fn coerce_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_reasoning(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
