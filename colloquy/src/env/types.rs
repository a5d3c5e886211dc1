use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::history::Observation;
use crate::inference::StopReason;

/// Lifecycle of an episode, derived from the turn counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Ready,  // no turn taken since reset
    Active, // 0 < turn < max_turns
    Done,   // turn >= max_turns
}

impl Phase {
    pub fn from_turn(turn: usize, max_turns: usize) -> Self {
        if turn >= max_turns {
            Phase::Done
        } else if turn == 0 {
            Phase::Ready
        } else {
            Phase::Active
        }
    }
}

/// Extra data returned alongside each step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Role mask matching the returned observation.
    pub mask: Vec<u8>,
    /// Completed turns, including this one.
    pub turn: usize,
    pub episode_id: Uuid,
    /// Decoded model response for this turn.
    pub response: String,
    pub stop_reason: StopReason,
}

/// One completed turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub query: String,
    pub response: String,
    pub obs: Observation,
    pub rew: f32,
    pub done: bool,
}

/// All turns of a single episode, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub id: Uuid,
    pub transitions: Vec<Transition>,
}

impl Trajectory {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            transitions: Vec::new(),
        }
    }

    pub fn total_reward(&self) -> f32 {
        self.transitions.iter().map(|t| t.rew).sum()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_tracks_turn_counter() {
        assert_eq!(Phase::from_turn(0, 3), Phase::Ready);
        assert_eq!(Phase::from_turn(1, 3), Phase::Active);
        assert_eq!(Phase::from_turn(2, 3), Phase::Active);
        assert_eq!(Phase::from_turn(3, 3), Phase::Done);
        assert_eq!(Phase::from_turn(1, 1), Phase::Done);
    }
}
