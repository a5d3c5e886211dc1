use serde::{Deserialize, Serialize};

use crate::env::errors::EnvError;
use crate::history::MaskAlignment;
use crate::inference::GenerationConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Observation length; also the number of tokens the history retains.
    pub observation_width: usize,
    pub max_turns: usize,
    pub mask_alignment: MaskAlignment,
    /// Forwarded verbatim to the generation service.
    pub generation: GenerationConfig,
    /// Keep a [`Trajectory`](crate::env::Trajectory) of the current episode.
    pub record_trajectory: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            observation_width: 8,
            max_turns: 4,
            mask_alignment: MaskAlignment::Windowed,
            generation: GenerationConfig::new(),
            record_trajectory: true,
        }
    }
}

impl EnvConfig {
    pub fn from_json_str(json: &str) -> Result<Self, EnvError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EnvError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EnvError> {
        if self.observation_width == 0 {
            return Err(EnvError::Config(
                "observation_width must be positive".to_string(),
            ));
        }
        if self.max_turns == 0 {
            return Err(EnvError::Config("max_turns must be positive".to_string()));
        }
        Ok(())
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_observation_width(mut self, width: usize) -> Self {
        self.observation_width = width;
        self
    }

    pub fn with_mask_alignment(mut self, alignment: MaskAlignment) -> Self {
        self.mask_alignment = alignment;
        self
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }
}
