pub mod engine;
pub mod errors;
pub mod perplexity;
pub mod traits;
pub mod types;

pub use engine::{AsyncGenerator, BlockingGenerator};
pub use errors::ServiceError;
pub use perplexity::{NegativePerplexity, perplexity};
pub use traits::{FnGenerator, FnScorer, Generator, LogProbModel, Scorer, Tokenizer};
pub use types::{GenerationConfig, GenerationOutput, GenerationRequest, StopReason, TokenId};
