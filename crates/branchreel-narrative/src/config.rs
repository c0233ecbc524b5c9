//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

use branchreel_core::error::StoryError;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`EngineConfig::interaction_delay`].
pub const INTERACTION_DELAY_VAR: &str = "BRANCHREEL_INTERACTION_DELAY_SECS";
/// Environment variable overriding [`EngineConfig::restart_delay`].
pub const RESTART_DELAY_VAR: &str = "BRANCHREEL_RESTART_DELAY_SECS";
/// Environment variable overriding [`EngineConfig::local_media_dir`].
pub const MEDIA_DIR_VAR: &str = "BRANCHREEL_MEDIA_DIR";

/// Tunables for a [`StoryEngine`](crate::application::engine::StoryEngine).
///
/// Delays are written as seconds when (de)serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pause between a node's media finishing and its interaction appearing.
    #[serde(with = "seconds")]
    pub interaction_delay: Duration,
    /// Pause between a run finishing and the restart choice appearing.
    #[serde(with = "seconds")]
    pub restart_delay: Duration,
    /// Directory media references resolve against when the story has no
    /// remote media base.
    pub local_media_dir: PathBuf,
    /// Label of the synthetic restart choice.
    pub restart_label: String,
    /// Prompt shown above the restart choice.
    pub finished_prompt: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interaction_delay: Duration::from_secs(1),
            restart_delay: Duration::from_secs(2),
            local_media_dir: PathBuf::from("StreamingAssets/Videos"),
            restart_label: "Restart".to_owned(),
            finished_prompt: "The End".to_owned(),
        }
    }
}

impl EngineConfig {
    /// Builds a configuration from the defaults overlaid with the
    /// `BRANCHREEL_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Configuration` if a delay variable is not a
    /// non-negative number of seconds.
    pub fn from_env() -> Result<Self, StoryError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from the defaults overlaid with values from
    /// `lookup`, keyed by the same variable names as [`from_env`](Self::from_env).
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Configuration` if a delay value is not a
    /// non-negative number of seconds.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoryError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(INTERACTION_DELAY_VAR) {
            config.interaction_delay = parse_seconds(INTERACTION_DELAY_VAR, &raw)?;
        }
        if let Some(raw) = lookup(RESTART_DELAY_VAR) {
            config.restart_delay = parse_seconds(RESTART_DELAY_VAR, &raw)?;
        }
        if let Some(dir) = lookup(MEDIA_DIR_VAR) {
            config.local_media_dir = PathBuf::from(dir);
        }
        Ok(config)
    }
}

fn parse_seconds(key: &str, raw: &str) -> Result<Duration, StoryError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| e.to_string())
        .and_then(|secs| Duration::try_from_secs_f64(secs).map_err(|e| e.to_string()))
        .map_err(|e| {
            StoryError::Configuration(format!("{key} must be a non-negative number of seconds: {e}"))
        })
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}
