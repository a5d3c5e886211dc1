use super::errors::ServiceError;
use super::traits::{LogProbModel, Scorer};
use super::types::TokenId;

/// Perplexity from per-token natural-log probabilities: `exp(-mean(log_probs))`.
///
/// Returns `None` for an empty slice. Perplexities beyond `f32::MAX` saturate
/// to `f32::MAX`.
pub fn perplexity(log_probs: &[f32]) -> Option<f32> {
    if log_probs.is_empty() {
        return None;
    }
    let nll: f64 = log_probs.iter().map(|&lp| -(lp as f64)).sum::<f64>() / log_probs.len() as f64;
    Some(nll.exp().min(f32::MAX as f64) as f32)
}

/// Rewards a response by the negative perplexity of its tokens under `model`,
/// conditioned on the query. Higher (closer to zero) is better.
pub struct NegativePerplexity<M> {
    model: M,
}

impl<M: LogProbModel> NegativePerplexity<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

impl<M: LogProbModel> Scorer for NegativePerplexity<M> {
    fn score(&self, query: &[TokenId], response: &[TokenId]) -> Result<f32, ServiceError> {
        if response.is_empty() {
            return Err(ServiceError::InvalidInput(
                "cannot score an empty response".to_string(),
            ));
        }

        let log_probs = self.model.log_probs(query, response)?;
        if log_probs.len() != response.len() {
            return Err(ServiceError::MalformedOutput(format!(
                "expected {} log-probs, got {}",
                response.len(),
                log_probs.len()
            )));
        }
        if log_probs.iter().any(|lp| !lp.is_finite() || *lp > 0.0) {
            return Err(ServiceError::MalformedOutput(
                "log-probs must be finite and <= 0".to_string(),
            ));
        }

        let ppl = perplexity(&log_probs).unwrap_or(f32::MAX);
        tracing::trace!(ppl, tokens = response.len(), "scored response");
        Ok(-ppl)
    }

    /// Perplexity is at least 1 and saturates at `f32::MAX`.
    fn range(&self) -> (f32, f32) {
        (-f32::MAX, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every token gets the same probability.
    struct Uniform {
        vocab: usize,
    }

    impl LogProbModel for Uniform {
        fn log_probs(
            &self,
            _context: &[TokenId],
            targets: &[TokenId],
        ) -> Result<Vec<f32>, ServiceError> {
            Ok(vec![-(self.vocab as f32).ln(); targets.len()])
        }
    }

    struct Truncating;

    impl LogProbModel for Truncating {
        fn log_probs(
            &self,
            _context: &[TokenId],
            targets: &[TokenId],
        ) -> Result<Vec<f32>, ServiceError> {
            Ok(vec![-0.5; targets.len().saturating_sub(1)])
        }
    }

    /// Assigns the same log-prob to every target.
    struct Constant(f32);

    impl LogProbModel for Constant {
        fn log_probs(
            &self,
            _context: &[TokenId],
            targets: &[TokenId],
        ) -> Result<Vec<f32>, ServiceError> {
            Ok(vec![self.0; targets.len()])
        }
    }

    #[test]
    fn uniform_model_perplexity_is_vocab_size() {
        let scorer = NegativePerplexity::new(Uniform { vocab: 50 });
        let reward = scorer.score(&[1, 2], &[3, 4, 5]).unwrap();
        assert!((reward + 50.0).abs() < 1e-3, "reward was {reward}");
    }

    #[test]
    fn certain_model_scores_minus_one() {
        assert_eq!(perplexity(&[0.0, 0.0]), Some(1.0));
        assert_eq!(perplexity(&[]), None);
    }

    #[test]
    fn empty_response_is_rejected() {
        let scorer = NegativePerplexity::new(Uniform { vocab: 2 });
        assert!(matches!(
            scorer.score(&[1], &[]),
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[test]
    fn short_log_prob_vector_is_malformed() {
        let scorer = NegativePerplexity::new(Truncating);
        assert!(matches!(
            scorer.score(&[1], &[2, 3]),
            Err(ServiceError::MalformedOutput(_))
        ));
    }

    #[test]
    fn huge_perplexity_saturates_instead_of_overflowing() {
        // exp(95) does not fit in an f32
        let scorer = NegativePerplexity::new(Constant(-95.0));
        let reward = scorer.score(&[1], &[2, 3]).unwrap();
        assert!(reward.is_finite());
        assert_eq!(reward, -f32::MAX);

        let (low, high) = scorer.range();
        assert!(reward >= low && reward <= high);
    }

    #[test]
    fn infinite_log_probs_are_malformed() {
        let scorer = NegativePerplexity::new(Constant(f32::NEG_INFINITY));
        assert!(matches!(
            scorer.score(&[1], &[2, 3]),
            Err(ServiceError::MalformedOutput(_))
        ));

        let scorer = NegativePerplexity::new(Constant(f32::NAN));
        assert!(matches!(
            scorer.score(&[1], &[2]),
            Err(ServiceError::MalformedOutput(_))
        ));
    }

    #[test]
    fn reward_range_is_finite_and_at_most_minus_one() {
        let scorer = NegativePerplexity::new(Uniform { vocab: 2 });
        assert_eq!(scorer.range(), (-f32::MAX, -1.0));
        assert_eq!(perplexity(&[f32::MIN; 3]), Some(f32::MAX));
    }
}
