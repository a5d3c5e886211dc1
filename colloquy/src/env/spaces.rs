//! Descriptions of what an environment accepts and emits.

use serde::{Deserialize, Serialize};

use crate::history::Observation;

/// Free-form text actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpace {
    pub max_length: usize,
}

impl TextSpace {
    pub fn contains(&self, text: &str) -> bool {
        text.chars().count() <= self.max_length
    }
}

/// `width` token ids in `[0, vocab_size)`, plus a mask in `{0, 1, 2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSpace {
    pub width: usize,
    pub vocab_size: usize,
}

impl ObservationSpace {
    pub fn contains(&self, obs: &Observation) -> bool {
        obs.tokens.len() == self.width
            && obs.mask.len() == self.width
            && obs.tokens.iter().all(|&t| (t as usize) < self.vocab_size)
            && obs.mask.iter().all(|&m| m <= 2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardRange {
    pub low: f32,
    pub high: f32,
}

impl RewardRange {
    pub fn contains(&self, reward: f32) -> bool {
        reward >= self.low && reward <= self.high
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spaces {
    pub action: TextSpace,
    pub observation: ObservationSpace,
    pub reward: RewardRange,
}
