use std::fmt;

use thiserror::Error;

use crate::history::HistoryError;
use crate::inference::ServiceError;

/// Which external call a step was making when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Tokenize,
    Generate,
    Decode,
    Score,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Tokenize => "tokenization",
            Stage::Generate => "generation",
            Stage::Decode => "decoding",
            Stage::Score => "scoring",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum EnvError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{stage} failed: {source}")]
    ServiceFailure {
        stage: Stage,
        #[source]
        source: ServiceError,
    },

    #[error("episode finished after {turn} turns; call reset()")]
    Terminated { turn: usize },

    #[error("a previous step failed mid-turn; call reset()")]
    Poisoned,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EnvError {
    pub(crate) fn service(stage: Stage) -> impl FnOnce(ServiceError) -> EnvError {
        move |source| EnvError::ServiceFailure { stage, source }
    }
}
