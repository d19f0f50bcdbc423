use crate::config::room::RoomConfig;
use crate::game::types::Phase;

/// Shared round state of the room.
///
/// Only the round state machine changes `phase` and `round_index`; the
/// connection handler only moves `num_users`.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: Phase,
    pub num_users: usize,
    pub round_index: u32,
    pub max_rounds: u32,
    pub min_players_to_start: usize,
    // Bumped on every phase change; scheduled transitions compare against it.
    epoch: u64,
}

impl SessionState {
    pub fn new(config: &RoomConfig) -> Self {
        SessionState {
            phase: Phase::Waiting,
            num_users: 0,
            round_index: 0,
            max_rounds: config.max_rounds.max(1),
            min_players_to_start: config.min_players_to_start,
            epoch: 0,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn increment_users(&mut self) {
        self.num_users += 1;
    }

    pub fn decrement_users(&mut self) {
        self.num_users = self.num_users.saturating_sub(1);
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.epoch += 1;
    }

    /// Move to the next round. Returns true when the index wrapped back to 0.
    pub fn advance_round(&mut self) -> bool {
        self.round_index += 1;
        if self.round_index >= self.max_rounds {
            self.round_index = 0;
            return true;
        }
        false
    }

    /// Hard reset used when the room empties.
    pub fn reset(&mut self) {
        self.set_phase(Phase::Waiting);
        self.round_index = 0;
    }

    /// First round needs a quorum; once a game is under way any population keeps it cycling.
    pub fn enough_players(&self) -> bool {
        self.phase == Phase::Waiting
            && ((self.round_index == 0 && self.num_users >= self.min_players_to_start)
                || self.round_index > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(min_players: usize, max_rounds: u32) -> SessionState {
        SessionState::new(&RoomConfig {
            min_players_to_start: min_players,
            max_rounds,
            ..RoomConfig::default()
        })
    }

    #[test]
    fn advance_round_wraps_at_max_rounds() {
        let mut s = state(2, 3);
        assert!(!s.advance_round());
        assert!(!s.advance_round());
        assert_eq!(s.round_index, 2);
        assert!(s.advance_round());
        assert_eq!(s.round_index, 0);
    }

    #[test]
    fn first_round_needs_quorum_later_rounds_do_not() {
        let mut s = state(2, 5);
        s.increment_users();
        assert!(!s.enough_players());
        s.increment_users();
        assert!(s.enough_players());

        s.decrement_users();
        s.advance_round();
        assert!(s.enough_players());

        s.set_phase(Phase::Preparing);
        assert!(!s.enough_players());
    }

    #[test]
    fn decrement_never_underflows() {
        let mut s = state(2, 5);
        s.decrement_users();
        assert_eq!(s.num_users, 0);
    }

    #[test]
    fn phase_changes_bump_epoch() {
        let mut s = state(2, 5);
        let before = s.epoch();
        s.set_phase(Phase::Preparing);
        s.reset();
        assert_eq!(s.epoch(), before + 2);
        assert_eq!(s.phase, Phase::Waiting);
    }
}
