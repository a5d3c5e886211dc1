//! Turn-based reset/step environment around a text generation model.
//!
//! [`TextEnvironment`] owns a [`DialogueHistory`] and three injected services: a
//! [`Tokenizer`], a [`Generator`] and a [`Scorer`]. Every step appends the caller's
//! query and the model's continuation to the history and returns a fixed-width
//! observation with a query/response role mask.

pub mod env;
pub mod history;
pub mod inference;

pub use env::{Env, EnvConfig, EnvError, Phase, StepInfo, TextEnvironment};
pub use history::{DialogueHistory, HistoryError, MaskAlignment, Observation, Role};
pub use inference::{
    GenerationConfig, GenerationOutput, GenerationRequest, Generator, Scorer, ServiceError,
    StopReason, TokenId, Tokenizer,
};
