use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("cannot append empty segment (text: {text_len} bytes, tokens: {token_len})")]
    InvalidSegment { text_len: usize, token_len: usize },

    #[error("history has no segments")]
    EmptyHistory,
}
