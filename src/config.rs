//! Game rules configuration

use crate::game::PrizeLadder;
use serde::{Deserialize, Serialize};

const DEFAULT_TIME_LIMIT_MINUTES: i64 = 45;
const DEFAULT_AUDIENCE_ACCURACY: f64 = 0.8;
const DEFAULT_FRIEND_CALL_ACCURACY: f64 = 0.8;

/// Rules a game is played under. Stored with each game so a reloaded game
/// keeps the rules it started with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seconds a game may run before it counts as timed out
    pub time_limit_secs: i64,
    /// Probability that the audience favours the correct answer
    pub audience_accuracy: f64,
    /// Probability that the friend names the correct answer
    pub friend_call_accuracy: f64,
    #[serde(default)]
    pub ladder: PrizeLadder,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_MINUTES * 60,
            audience_accuracy: DEFAULT_AUDIENCE_ACCURACY,
            friend_call_accuracy: DEFAULT_FRIEND_CALL_ACCURACY,
            ladder: PrizeLadder::default(),
        }
    }
}

impl GameConfig {
    /// Load config from environment variables, falling back to defaults
    /// for anything unset or unparsable
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let time_limit_secs = time_limit_from_env("GAME_TIME_LIMIT_MINUTES")
            .unwrap_or(defaults.time_limit_secs);

        let audience_accuracy = probability_from_env("GAME_AUDIENCE_ACCURACY")
            .unwrap_or(defaults.audience_accuracy);

        let friend_call_accuracy = probability_from_env("GAME_FRIEND_CALL_ACCURACY")
            .unwrap_or(defaults.friend_call_accuracy);

        tracing::info!(
            "Game config: time limit {}s, audience accuracy {}, friend call accuracy {}",
            time_limit_secs,
            audience_accuracy,
            friend_call_accuracy
        );

        Self {
            time_limit_secs,
            audience_accuracy,
            friend_call_accuracy,
            ladder: defaults.ladder,
        }
    }

    pub fn time_limit(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.time_limit_secs).unwrap_or(chrono::Duration::MAX)
    }

    /// Check a config that did not come from `default` or `from_env`
    pub fn validate(&self) -> Result<(), String> {
        if self.time_limit_secs <= 0
            || chrono::Duration::try_seconds(self.time_limit_secs).is_none()
        {
            return Err(format!(
                "time limit of {}s is out of range",
                self.time_limit_secs
            ));
        }
        for (name, p) in [
            ("audience accuracy", self.audience_accuracy),
            ("friend call accuracy", self.friend_call_accuracy),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{} {} is not a probability", name, p));
            }
        }
        self.ladder.validate()
    }
}

/// Minutes from `key`, converted to seconds
fn time_limit_from_env(key: &str) -> Option<i64> {
    let raw = std::env::var(key).ok()?;
    let secs = raw
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|minutes| *minutes > 0)
        .and_then(|minutes| minutes.checked_mul(60))
        .filter(|secs| chrono::Duration::try_seconds(*secs).is_some());
    if secs.is_none() {
        tracing::warn!("Ignoring {}={:?}: expected a positive number of minutes", key, raw);
    }
    secs
}

fn probability_from_env(key: &str) -> Option<f64> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<f64>() {
        Ok(p) if (0.0..=1.0).contains(&p) => Some(p),
        _ => {
            tracing::warn!("Ignoring {}={:?}: expected a probability in 0..=1", key, raw);
            None
        }
    }
}
