//! Round state machine: WAITING -> PREPARING -> PLAYING -> WAITING.
//!
//! Transitions are driven by delayed timers that are never cancelled. Each
//! `Transition` records the phase, round and epoch current when it was
//! scheduled and only acts if all three still hold when it fires; anything
//! else is a stale proposal and is dropped.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::game::broadcast::Outbound;
use crate::game::events::ServerEvent;
use crate::game::room::Room;
use crate::game::types::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// WAITING -> PREPARING, if enough players.
    BeginPrepare,
    /// PREPARING -> PLAYING.
    BeginRound,
    /// PLAYING -> WAITING.
    EndRound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub expected_phase: Phase,
    pub round_index: u32,
    pub epoch: u64,
}

/// A transition to fire after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub delay: Duration,
    pub transition: Transition,
}

pub const GAME_END_ROUND_OVER: &str = "roundOver";
pub const GAME_END_GAME_OVER: &str = "gameOver";

impl<S: Outbound> Room<S> {
    /// Capture the current phase/round/epoch as the precondition of `kind`.
    pub(crate) fn propose(&self, kind: TransitionKind, delay: Duration) -> Scheduled {
        Scheduled {
            delay,
            transition: Transition {
                kind,
                expected_phase: self.state.phase,
                round_index: self.state.round_index,
                epoch: self.state.epoch(),
            },
        }
    }

    fn is_current(&self, t: &Transition) -> bool {
        self.state.phase == t.expected_phase
            && self.state.round_index == t.round_index
            && self.state.epoch() == t.epoch
    }

    /// Run a scheduled transition. Returns the follow-ups to schedule.
    pub fn fire(&mut self, transition: Transition, now: DateTime<Utc>) -> Vec<Scheduled> {
        if !self.is_current(&transition) {
            debug!(
                "[Room] Stale {:?} dropped (expected {:?}/round {}, now {:?}/round {})",
                transition.kind,
                transition.expected_phase,
                transition.round_index,
                self.state.phase,
                self.state.round_index
            );
            return Vec::new();
        }
        match transition.kind {
            TransitionKind::BeginPrepare => self.begin_prepare(now),
            TransitionKind::BeginRound => self.begin_round(now),
            TransitionKind::EndRound => self.end_round(),
        }
    }

    fn begin_prepare(&mut self, now: DateTime<Utc>) -> Vec<Scheduled> {
        if !self.state.enough_players() {
            debug!(
                "[Room] Not enough players to prepare (users={}, round={})",
                self.state.num_users, self.state.round_index
            );
            return Vec::new();
        }
        self.state.set_phase(Phase::Preparing);
        let start_at = millis_after(now, self.config.prepare_delay);
        info!("[Room] Game prepare, round {} starts at {}", self.state.round_index, start_at);
        self.hub().broadcast_all(ServerEvent::GamePrepare { start_at });
        vec![self.propose(TransitionKind::BeginRound, self.config.prepare_delay)]
    }

    fn begin_round(&mut self, now: DateTime<Utc>) -> Vec<Scheduled> {
        self.state.set_phase(Phase::Playing);
        let end_at = millis_after(now, self.config.round_duration);
        let question_id = self.next_question_id();
        info!(
            "[Room] Round {}/{} ready, question {}",
            self.state.round_index + 1,
            self.state.max_rounds,
            question_id
        );
        self.hub().broadcast_all(ServerEvent::GameReady {
            end_at,
            question_id,
            round_index: self.state.round_index,
            max_rounds: self.state.max_rounds,
        });
        vec![self.propose(TransitionKind::EndRound, self.config.round_duration)]
    }

    fn end_round(&mut self) -> Vec<Scheduled> {
        let wrapped = self.state.advance_round();
        self.state.set_phase(Phase::Waiting);
        let result = if wrapped {
            GAME_END_GAME_OVER
        } else {
            GAME_END_ROUND_OVER
        };
        info!("[Room] Round over ({}), next round index {}", result, self.state.round_index);
        self.hub().broadcast_all(ServerEvent::GameEnd {
            result: result.to_string(),
        });
        vec![self.propose(TransitionKind::BeginPrepare, self.config.round_cooldown)]
    }

    /// Empty room: back to WAITING / round 0 immediately, invalidating every pending timer.
    pub(crate) fn force_reset(&mut self) {
        if self.state.phase != Phase::Waiting || self.state.round_index != 0 {
            info!(
                "[Room] Room empty, resetting from {:?}/round {}",
                self.state.phase, self.state.round_index
            );
        }
        self.state.reset();
    }
}

fn millis_after(now: DateTime<Utc>, delay: Duration) -> i64 {
    let delay_ms = i64::try_from(delay.as_millis()).unwrap_or(i64::MAX);
    now.timestamp_millis().saturating_add(delay_ms)
}
