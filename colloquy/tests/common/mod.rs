#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use colloquy::inference::FnScorer;
use colloquy::{
    EnvConfig, GenerationOutput, GenerationRequest, Generator, Scorer, ServiceError, StopReason,
    TextEnvironment, TokenId, Tokenizer,
};

pub const EOS: TokenId = 50_256;

/// Looks up whole strings in a table, falling back to one token per byte.
/// Decodes every id as `<id>`.
#[derive(Default)]
pub struct TableTokenizer {
    table: HashMap<String, Vec<TokenId>>,
}

impl TableTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, text: &str, tokens: &[TokenId]) -> Self {
        self.table.insert(text.to_string(), tokens.to_vec());
        self
    }
}

impl Tokenizer for TableTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, ServiceError> {
        Ok(self
            .table
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.bytes().map(TokenId::from).collect()))
    }

    fn decode(&self, tokens: &[TokenId]) -> Result<String, ServiceError> {
        Ok(tokens.iter().map(|t| format!("<{t}>")).collect())
    }

    fn eos_token_id(&self) -> TokenId {
        EOS
    }

    fn vocab_size(&self) -> usize {
        EOS as usize + 1
    }
}

/// Refuses to encode anything.
pub struct FailingTokenizer;

impl Tokenizer for FailingTokenizer {
    fn encode(&self, _text: &str) -> Result<Vec<TokenId>, ServiceError> {
        Err(ServiceError::Unavailable)
    }

    fn decode(&self, _tokens: &[TokenId]) -> Result<String, ServiceError> {
        Err(ServiceError::Unavailable)
    }

    fn eos_token_id(&self) -> TokenId {
        EOS
    }

    fn vocab_size(&self) -> usize {
        EOS as usize + 1
    }
}

/// Encodes one token per byte but decodes everything to the empty string.
pub struct SilentTokenizer;

impl Tokenizer for SilentTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, ServiceError> {
        Ok(text.bytes().map(TokenId::from).collect())
    }

    fn decode(&self, _tokens: &[TokenId]) -> Result<String, ServiceError> {
        Ok(String::new())
    }

    fn eos_token_id(&self) -> TokenId {
        EOS
    }

    fn vocab_size(&self) -> usize {
        EOS as usize + 1
    }
}

/// Always answers with the same continuation and remembers every request.
#[derive(Clone)]
pub struct FixedGenerator {
    response: Vec<TokenId>,
    pub requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl FixedGenerator {
    pub fn new(response: &[TokenId]) -> Self {
        Self {
            response: response.to_vec(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Generator for FixedGenerator {
    fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput, ServiceError> {
        self.requests.lock().unwrap().push(request);
        Ok(GenerationOutput::new(self.response.clone(), StopReason::Length))
    }
}

pub struct FailingGenerator;

impl Generator for FailingGenerator {
    fn generate(&self, _request: GenerationRequest) -> Result<GenerationOutput, ServiceError> {
        Err(ServiceError::Unavailable)
    }
}

/// Scores an exchange as minus the response length.
pub fn length_scorer() -> impl Scorer {
    FnScorer(|_query: &[TokenId], response: &[TokenId]| Ok(-(response.len() as f32)))
}

/// The `"hi" -> [1, 2]`, continuation `[3, 4, 5]` setup.
pub fn hi_env(max_turns: usize) -> (TextEnvironment, FixedGenerator) {
    let generator = FixedGenerator::new(&[3, 4, 5]);
    let env = TextEnvironment::new(
        TableTokenizer::new().with("hi", &[1, 2]),
        generator.clone(),
        length_scorer(),
        EnvConfig::default()
            .with_observation_width(8)
            .with_max_turns(max_turns),
    )
    .unwrap();
    (env, generator)
}
