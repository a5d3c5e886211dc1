//! Python-facing build of `colloquy`.
//!
//! Without the `python` feature this crate only re-exports the core library and the
//! small configuration helpers the bindings rely on.

pub use colloquy;

use colloquy::inference::GenerationConfig;
use colloquy::{EnvConfig, EnvError};

#[cfg(feature = "python")]
mod python;

/// Builds an [`EnvConfig`] from the constructor arguments exposed to Python.
/// `generation_kwargs_json` is the JSON encoding of the generation kwargs dict.
pub fn config_from_kwargs(
    max_turns: usize,
    observation_width: usize,
    generation_kwargs_json: Option<&str>,
) -> Result<EnvConfig, EnvError> {
    let generation = match generation_kwargs_json {
        Some(json) => serde_json::from_str::<GenerationConfig>(json)
            .map_err(|e| EnvError::Config(format!("generation_kwargs: {e}")))?,
        None => GenerationConfig::new(),
    };
    let config = EnvConfig::default()
        .with_max_turns(max_turns)
        .with_observation_width(observation_width)
        .with_generation(generation);
    config.validate()?;
    tracing::debug!(?config, "config built from python kwargs");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kwargs_become_generation_config() {
        let config =
            config_from_kwargs(3, 8, Some(r#"{"max_new_tokens": 20, "temperature": 0.7}"#))
                .unwrap();
        assert_eq!(config.max_turns, 3);
        assert_eq!(config.observation_width, 8);
        assert_eq!(
            config.generation.get("max_new_tokens"),
            Some(&serde_json::json!(20))
        );
    }

    #[test]
    fn missing_kwargs_mean_empty_config() {
        let config = config_from_kwargs(4, 8, None).unwrap();
        assert!(config.generation.is_empty());
    }

    #[test]
    fn non_object_kwargs_are_rejected() {
        assert!(matches!(
            config_from_kwargs(4, 8, Some("[1, 2]")),
            Err(EnvError::Config(_))
        ));
        assert!(matches!(
            config_from_kwargs(0, 8, None),
            Err(EnvError::Config(_))
        ));
    }

    #[test]
    fn python_json_extensions_are_rejected() {
        // what json.dumps writes for float("nan") and float("inf")
        for kwargs in [r#"{"temperature": NaN}"#, r#"{"top_p": Infinity}"#] {
            assert!(matches!(
                config_from_kwargs(4, 8, Some(kwargs)),
                Err(EnvError::Config(_))
            ));
        }
    }

    #[test]
    fn sequences_come_back_as_lists() {
        // json.dumps writes tuples as arrays
        let config =
            config_from_kwargs(4, 8, Some(r#"{"bad_words_ids": [[1, 2]]}"#)).unwrap();
        assert_eq!(
            config.generation.get("bad_words_ids"),
            Some(&serde_json::json!([[1, 2]]))
        );
    }
}
