mod dialogue;
mod errors;
mod types;

pub use dialogue::DialogueHistory;
pub use errors::HistoryError;
pub use types::{MASK_PAD, MaskAlignment, Observation, PAD_TOKEN, Role, Span};
