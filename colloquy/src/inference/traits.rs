use super::errors::ServiceError;
use super::types::{GenerationOutput, GenerationRequest, TokenId};

/// Text <-> token id conversion.
pub trait Tokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, ServiceError>;
    fn decode(&self, tokens: &[TokenId]) -> Result<String, ServiceError>;

    /// End-of-sequence id, also used as the pad id for generation.
    fn eos_token_id(&self) -> TokenId;

    fn vocab_size(&self) -> usize;
}

/// Continues a single token sequence. Decoding strategy lives entirely behind this
/// trait and is steered by the request's [`GenerationConfig`](super::GenerationConfig).
pub trait Generator: Send + Sync {
    fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput, ServiceError>;
}

/// Scores one query/response exchange. The value is passed through as reward.
pub trait Scorer: Send + Sync {
    fn score(&self, query: &[TokenId], response: &[TokenId]) -> Result<f32, ServiceError>;

    /// Closed bounds of the values `score` can produce.
    fn range(&self) -> (f32, f32) {
        (f32::NEG_INFINITY, f32::INFINITY)
    }
}

/// Per-token log-likelihoods from a language model.
pub trait LogProbModel: Send + Sync {
    /// Natural-log probability of each `targets[i]` given `context` followed by
    /// `targets[..i]`. Must return exactly one value per target.
    fn log_probs(&self, context: &[TokenId], targets: &[TokenId]) -> Result<Vec<f32>, ServiceError>;
}

/// Adapts a plain closure into a [`Scorer`].
pub struct FnScorer<F>(pub F)
where
    F: Fn(&[TokenId], &[TokenId]) -> Result<f32, ServiceError> + Send + Sync;

impl<F> Scorer for FnScorer<F>
where
    F: Fn(&[TokenId], &[TokenId]) -> Result<f32, ServiceError> + Send + Sync,
{
    fn score(&self, query: &[TokenId], response: &[TokenId]) -> Result<f32, ServiceError> {
        (self.0)(query, response)
    }
}

/// Adapts a plain closure into a [`Generator`].
pub struct FnGenerator<F>(pub F)
where
    F: Fn(GenerationRequest) -> Result<GenerationOutput, ServiceError> + Send + Sync;

impl<F> Generator for FnGenerator<F>
where
    F: Fn(GenerationRequest) -> Result<GenerationOutput, ServiceError> + Send + Sync,
{
    fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput, ServiceError> {
        (self.0)(request)
    }
}
