//! Turn-based environment around a text generation model.
//!
//! Each `step` takes a query string, appends it to the dialogue, asks the
//! generator to continue the whole retained token window, appends the response,
//! scores the exchange and advances the turn counter. The episode is done once
//! `max_turns` steps have completed.

use serde_json::Value;
use uuid::Uuid;

use crate::env::config::EnvConfig;
use crate::env::errors::{EnvError, Stage};
use crate::env::spaces::{ObservationSpace, RewardRange, Spaces, TextSpace};
use crate::env::traits::{Env, StepResult};
use crate::env::types::{Phase, StepInfo, Trajectory, Transition};
use crate::history::{DialogueHistory, Observation};
use crate::inference::{
    GenerationRequest, Generator, Scorer, ServiceError, StopReason, TokenId, Tokenizer,
};

pub struct TextEnvironment {
    tokenizer: Box<dyn Tokenizer>,
    generator: Box<dyn Generator>,
    scorer: Box<dyn Scorer>,
    config: EnvConfig,
    history: DialogueHistory,
    turn: usize,
    poisoned: bool,
    episode_id: Uuid,
    trajectory: Trajectory,
}

impl TextEnvironment {
    pub fn new(
        tokenizer: impl Tokenizer + 'static,
        generator: impl Generator + 'static,
        scorer: impl Scorer + 'static,
        config: EnvConfig,
    ) -> Result<Self, EnvError> {
        config.validate()?;
        let episode_id = Uuid::new_v4();
        tracing::debug!(
            width = config.observation_width,
            max_turns = config.max_turns,
            "text environment created"
        );
        Ok(Self {
            tokenizer: Box::new(tokenizer),
            generator: Box::new(generator),
            scorer: Box::new(scorer),
            history: DialogueHistory::new(config.observation_width),
            config,
            turn: 0,
            poisoned: false,
            episode_id,
            trajectory: Trajectory::new(episode_id),
        })
    }

    /// Starts a new episode and returns the all-padding observation.
    pub fn reset(&mut self) -> Observation {
        self.history = DialogueHistory::new(self.config.observation_width);
        self.turn = 0;
        self.poisoned = false;
        self.episode_id = Uuid::new_v4();
        self.trajectory = Trajectory::new(self.episode_id);
        tracing::debug!(episode = %self.episode_id, "environment reset");
        self.history.to_observation(self.config.mask_alignment)
    }

    /// Runs one query -> response -> score turn.
    ///
    /// On failure nothing is rolled back: if the query was already appended the
    /// environment refuses further steps with [`EnvError::Poisoned`] until
    /// [`reset`](TextEnvironment::reset).
    pub fn step(&mut self, query: &str) -> Result<StepResult<Observation, StepInfo>, EnvError> {
        let _span =
            tracing::debug_span!("step", episode = %self.episode_id, turn = self.turn).entered();

        if self.poisoned {
            return Err(EnvError::Poisoned);
        }
        if self.phase() == Phase::Done {
            return Err(EnvError::Terminated { turn: self.turn });
        }

        let query_tokens = self
            .tokenizer
            .encode(query)
            .map_err(EnvError::service(Stage::Tokenize))?;
        self.history.append_segment(query, &query_tokens)?;

        self.complete_turn(query, &query_tokens).inspect_err(|err| {
            self.poisoned = true;
            tracing::warn!(error = %err, "step failed after query was recorded");
        })
    }

    /// Like [`step`](TextEnvironment::step) for loosely typed callers: strings,
    /// numbers and booleans are turned into query text; anything else is
    /// [`EnvError::InvalidInput`].
    pub fn step_value(
        &mut self,
        query: &Value,
    ) -> Result<StepResult<Observation, StepInfo>, EnvError> {
        let text = coerce_query(query)?;
        self.step(&text)
    }

    fn complete_turn(
        &mut self,
        query: &str,
        query_tokens: &[TokenId],
    ) -> Result<StepResult<Observation, StepInfo>, EnvError> {
        let (response_tokens, response, stop_reason) = self.generate()?;

        let reward = self
            .scorer
            .score(query_tokens, &response_tokens)
            .map_err(EnvError::service(Stage::Score))?;
        if !reward.is_finite() {
            return Err(EnvError::ServiceFailure {
                stage: Stage::Score,
                source: ServiceError::MalformedOutput(format!("non-finite score {reward}")),
            });
        }

        self.turn += 1;
        let done = self.turn >= self.config.max_turns;
        self.history.set_complete(done);

        let obs = self.history.to_observation(self.config.mask_alignment);
        let info = StepInfo {
            mask: obs.mask.clone(),
            turn: self.turn,
            episode_id: self.episode_id,
            response: response.clone(),
            stop_reason,
        };
        if self.config.record_trajectory {
            self.trajectory.transitions.push(Transition {
                query: query.to_string(),
                response,
                obs: obs.clone(),
                rew: reward,
                done,
            });
        }

        tracing::debug!(reward, done, "turn complete");
        Ok((obs, reward, done, info))
    }

    /// Continues the retained token window and records the response segment.
    fn generate(&mut self) -> Result<(Vec<TokenId>, String, StopReason), EnvError> {
        let request = GenerationRequest {
            prompt: self.history.token_ids().to_vec(),
            config: self.config.generation.clone(),
            pad_token_id: self.tokenizer.eos_token_id(),
        };
        let output = self
            .generator
            .generate(request)
            .map_err(EnvError::service(Stage::Generate))?;
        if output.tokens.is_empty() {
            return Err(EnvError::ServiceFailure {
                stage: Stage::Generate,
                source: ServiceError::MalformedOutput("empty continuation".to_string()),
            });
        }

        let text = self
            .tokenizer
            .decode(&output.tokens)
            .map_err(EnvError::service(Stage::Decode))?;
        if text.is_empty() {
            return Err(EnvError::ServiceFailure {
                stage: Stage::Decode,
                source: ServiceError::MalformedOutput(format!(
                    "{} tokens decoded to empty text",
                    output.tokens.len()
                )),
            });
        }

        self.history.append_segment(&text, &output.tokens)?;
        tracing::trace!(tokens = output.tokens.len(), stop = ?output.stop_reason, "response appended");
        Ok((output.tokens, text, output.stop_reason))
    }

    pub fn observation(&self) -> Observation {
        self.history.to_observation(self.config.mask_alignment)
    }

    pub fn phase(&self) -> Phase {
        Phase::from_turn(self.turn, self.config.max_turns)
    }

    pub fn is_done(&self) -> bool {
        self.phase() == Phase::Done
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn max_turns(&self) -> usize {
        self.config.max_turns
    }

    pub fn history(&self) -> &DialogueHistory {
        &self.history
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn episode_id(&self) -> Uuid {
        self.episode_id
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn spaces(&self) -> Spaces {
        let (low, high) = self.scorer.range();
        Spaces {
            action: TextSpace {
                max_length: self.config.observation_width,
            },
            observation: ObservationSpace {
                width: self.config.observation_width,
                vocab_size: self.tokenizer.vocab_size(),
            },
            reward: RewardRange { low, high },
        }
    }
}

impl Env for TextEnvironment {
    type Obs = Observation;
    type Act = String;
    type Info = StepInfo;

    fn reset(&mut self) -> Result<Self::Obs, EnvError> {
        Ok(TextEnvironment::reset(self))
    }

    fn step(&mut self, act: Self::Act) -> Result<StepResult<Self::Obs, Self::Info>, EnvError> {
        TextEnvironment::step(self, &act)
    }

    fn close(&mut self) -> Result<(), EnvError> {
        TextEnvironment::reset(self);
        tracing::debug!("environment closed");
        Ok(())
    }
}

/// Turns a loosely typed query into text.
pub fn coerce_query(query: &Value) -> Result<String, EnvError> {
    match query {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err(EnvError::InvalidInput("query is null".to_string())),
        Value::Array(_) | Value::Object(_) => Err(EnvError::InvalidInput(
            "query must be a string, number or boolean".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_coerce_to_text() {
        assert_eq!(coerce_query(&json!("hi")).unwrap(), "hi");
        assert_eq!(coerce_query(&json!(42)).unwrap(), "42");
        assert_eq!(coerce_query(&json!(true)).unwrap(), "true");
    }

    #[test]
    fn null_and_containers_are_invalid_input() {
        assert!(matches!(
            coerce_query(&Value::Null),
            Err(EnvError::InvalidInput(_))
        ));
        assert!(matches!(
            coerce_query(&json!(["a"])),
            Err(EnvError::InvalidInput(_))
        ));
        assert!(matches!(
            coerce_query(&json!({"q": "a"})),
            Err(EnvError::InvalidInput(_))
        ));
    }
}
