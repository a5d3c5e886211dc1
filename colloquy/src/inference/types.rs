use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw token identifier as produced by the tokenizer.
pub type TokenId = u32;

/// Opaque bag of decoding options (max new tokens, sampling toggle, temperature,
/// repetition penalty, ...). Keys belong to the generation service; the environment
/// forwards the bag untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationConfig(Map<String, Value>);

impl GenerationConfig {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for GenerationConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<GenerationConfig> for Map<String, Value> {
    fn from(config: GenerationConfig) -> Self {
        config.0
    }
}

/// A single-sequence continuation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The whole (possibly truncated) history window.
    pub prompt: Vec<TokenId>,
    pub config: GenerationConfig,
    /// Tokenizer end-of-sequence id, used by the service for padding.
    pub pad_token_id: TokenId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    Stop,          // end-of-sequence emitted
    Length,        // hit max new tokens
    Other(String), // fallback for service-specific reasons
}

/// Continuation tokens with the prompt already stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub tokens: Vec<TokenId>,
    pub stop_reason: StopReason,
}

impl GenerationOutput {
    pub fn new(tokens: Vec<TokenId>, stop_reason: StopReason) -> Self {
        Self {
            tokens,
            stop_reason,
        }
    }
}

impl From<Vec<TokenId>> for GenerationOutput {
    fn from(tokens: Vec<TokenId>) -> Self {
        Self::new(tokens, StopReason::Stop)
    }
}
