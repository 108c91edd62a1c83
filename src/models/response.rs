use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Token counts for one answer.
///
/// The backend reports usage as either `{input_tokens, output_tokens}` or
/// `{input, output}`. Both shapes go through [`TokenUsage::normalize`].
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
}

/// Every spelling the wire may use; all optional.
#[derive(Debug, Default, Deserialize)]
struct RawTokenUsage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
    input: Option<u64>,
    output: Option<u64>,
}

impl TokenUsage {
    pub fn new(input: u64, output: u64) -> Self {
        Self { input, output }
    }

    /// Resolve either wire shape onto the canonical pair.
    ///
    /// `*_tokens` names win when both are present. Missing values, a missing
    /// object and values of the wrong type all count as zero.
    pub fn normalize(value: Option<&Value>) -> Self {
        let raw = value
            .filter(|v| v.is_object())
            .and_then(|v| RawTokenUsage::deserialize(v).ok())
            .unwrap_or_default();

        Self {
            input: raw.input_tokens.or(raw.input).unwrap_or(0),
            output: raw.output_tokens.or(raw.output).unwrap_or(0),
        }
    }
}

impl<'de> Deserialize<'de> for TokenUsage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(TokenUsage::normalize(Some(&value)))
    }
}

impl fmt::Display for TokenUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in / {} out", self.input, self.output)
    }
}

/// Answer metadata attached by the backend.
///
/// Every field defaults, so a partial object still finalizes an exchange.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Metadata {
    #[serde(alias = "modelUsed")]
    pub model_used: String,
    pub classification: String,
    pub tokens: TokenUsage,
    #[serde(alias = "latencyMs")]
    pub latency_ms: u64,
    #[serde(alias = "chunksRetrieved")]
    pub chunks_retrieved: u32,
    #[serde(alias = "evaluatorFlags")]
    pub evaluator_flags: Vec<String>,
    #[serde(alias = "evaluatorMessage")]
    pub evaluator_message: Option<String>,
    #[serde(alias = "cacheHit")]
    pub cache_hit: bool,
}

impl Metadata {
    /// True when the answer evaluator raised any flag.
    pub fn is_flagged(&self) -> bool {
        !self.evaluator_flags.is_empty()
    }
}

/// A retrieved document the answer cites.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    pub document: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, alias = "relevanceScore")]
    pub relevance_score: Option<f64>,
}

impl Source {
    /// `document (p. N), score: 0.00` with absent parts left out.
    pub fn label(&self) -> String {
        let mut label = self.document.clone();
        if let Some(page) = self.page {
            label.push_str(&format!(" (p. {})", page));
        }
        if let Some(score) = self.relevance_score {
            label.push_str(&format!(", score: {:.2}", score));
        }
        label
    }
}

/// A complete answer, either streamed and finalized or fetched from `/query`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    pub answer: String,
    pub metadata: Metadata,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(alias = "conversationId")]
    pub conversation_id: String,
}
