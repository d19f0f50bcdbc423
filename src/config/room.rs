/// Room configuration constants.
///
/// This module defines the round parameters (quorum, round count, phase
/// delays) and the spawn area for new players. `RoomConfig` carries the
/// runtime values, optionally overridden from the environment.
use std::time::Duration;

/// Minimum number of joined players required to start the first round.
pub const MIN_PLAYERS_TO_START: usize = 2;

/// Number of rounds in a full game cycle before the round index wraps.
pub const MAX_ROUNDS: u32 = 5;

/// Delay (in milliseconds) between a quorum-making join and the WAITING exit check.
pub const JOIN_GRACE_MS: u64 = 1_000;

/// Duration (in milliseconds) of the PREPARING phase.
pub const PREPARE_DELAY_MS: u64 = 10_000;

/// Duration (in milliseconds) of the PLAYING phase.
pub const ROUND_DURATION_MS: u64 = 30_000;

/// Pause (in milliseconds) after a round ends before the WAITING exit is re-evaluated.
pub const ROUND_COOLDOWN_MS: u64 = 3_000;

/// Spawn area for players joining without a position (x and y, half-open range).
pub const SPAWN_MIN: f64 = 100.0;
pub const SPAWN_MAX: f64 = 400.0;

/// Question ids are drawn from `0..QUESTION_POOL`.
pub const QUESTION_POOL: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct RoomConfig {
    pub min_players_to_start: usize,
    pub max_rounds: u32,
    pub join_grace: Duration,
    pub prepare_delay: Duration,
    pub round_duration: Duration,
    pub round_cooldown: Duration,
}

impl RoomConfig {
    /// Load the room configuration, overriding defaults with `ROOM_*` variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source. Missing or
    /// unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let millis = |key: &str| parse(key).map(Duration::from_millis);
        RoomConfig {
            min_players_to_start: parse("ROOM_MIN_PLAYERS")
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(defaults.min_players_to_start),
            // Zero rounds would make the wrap arithmetic meaningless.
            max_rounds: parse("ROOM_MAX_ROUNDS")
                .and_then(|n| u32::try_from(n).ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_rounds),
            join_grace: millis("ROOM_JOIN_GRACE_MS").unwrap_or(defaults.join_grace),
            prepare_delay: millis("ROOM_PREPARE_DELAY_MS").unwrap_or(defaults.prepare_delay),
            round_duration: millis("ROOM_ROUND_DURATION_MS").unwrap_or(defaults.round_duration),
            round_cooldown: millis("ROOM_ROUND_COOLDOWN_MS").unwrap_or(defaults.round_cooldown),
        }
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        RoomConfig {
            min_players_to_start: MIN_PLAYERS_TO_START,
            max_rounds: MAX_ROUNDS,
            join_grace: Duration::from_millis(JOIN_GRACE_MS),
            prepare_delay: Duration::from_millis(PREPARE_DELAY_MS),
            round_duration: Duration::from_millis(ROUND_DURATION_MS),
            round_cooldown: Duration::from_millis(ROUND_COOLDOWN_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_constants() {
        let config = RoomConfig::default();
        assert_eq!(config.min_players_to_start, 2);
        assert_eq!(config.max_rounds, 5);
        assert_eq!(config.join_grace, Duration::from_secs(1));
        assert_eq!(config.prepare_delay, Duration::from_secs(10));
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn empty_source_yields_defaults() {
        assert_eq!(RoomConfig::from_lookup(|_| None), RoomConfig::default());
    }

    #[test]
    fn overrides_apply_per_key() {
        let config = RoomConfig::from_lookup(lookup(&[
            ("ROOM_MAX_ROUNDS", "3"),
            ("ROOM_PREPARE_DELAY_MS", " 250 "),
        ]));
        assert_eq!(config.max_rounds, 3);
        assert_eq!(config.prepare_delay, Duration::from_millis(250));
        assert_eq!(config.round_duration, Duration::from_millis(ROUND_DURATION_MS));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = RoomConfig::from_lookup(lookup(&[
            ("ROOM_MAX_ROUNDS", "0"),
            ("ROOM_MIN_PLAYERS", "many"),
            ("ROOM_JOIN_GRACE_MS", "-5"),
        ]));
        assert_eq!(config, RoomConfig::default());
    }
}
