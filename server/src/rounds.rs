//! Round and match progression.
//!
//! A match is a fixed run of rounds. The counter increments at every round
//! end except the final one: once `rounds_played` has reached
//! [`ROUND_LIMIT`] the next round end closes the match instead, resets the
//! counter, and nothing is rescheduled until the operator starts again.

use shared::ROUND_LIMIT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No round active, admission open.
    Lobby,
    /// Ticking, admission closed.
    RoundActive,
    /// Round ended, waiting for the restart delay.
    RoundOver,
    /// Match finished; restart requires an explicit start.
    MatchOver,
}

/// What a round end leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Award a win and schedule the next round.
    NextRound,
    /// Match complete; surface the summary.
    MatchOver,
}

#[derive(Debug)]
pub struct Rounds {
    phase: Phase,
    rounds_played: u32,
    paused: bool,
}

impl Default for Rounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Rounds {
    pub fn new() -> Self {
        Self {
            phase: Phase::Lobby,
            rounds_played: 0,
            paused: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    /// True while a round is in progress, paused or not. Admission and
    /// immediate removal are closed for the whole stretch.
    pub fn round_active(&self) -> bool {
        self.phase == Phase::RoundActive
    }

    /// True when the scheduler should actually fire ticks.
    pub fn ticking(&self) -> bool {
        self.round_active() && !self.paused
    }

    /// A round may start from the lobby, between rounds, or after a match.
    pub fn can_start_round(&self) -> bool {
        self.phase != Phase::RoundActive
    }

    pub fn begin_round(&mut self) {
        self.phase = Phase::RoundActive;
        self.paused = false;
    }

    /// Closes the current round and decides what follows.
    pub fn finish_round(&mut self) -> RoundOutcome {
        self.paused = false;
        if self.rounds_played < ROUND_LIMIT {
            self.rounds_played += 1;
            self.phase = Phase::RoundOver;
            RoundOutcome::NextRound
        } else {
            self.rounds_played = 0;
            self.phase = Phase::MatchOver;
            RoundOutcome::MatchOver
        }
    }

    /// Explicit abort: back to the lobby with a clean counter, regardless of
    /// match progress.
    pub fn abort(&mut self) {
        self.phase = Phase::Lobby;
        self.rounds_played = 0;
        self.paused = false;
    }

    /// Suspends or resumes ticking without touching counters or player
    /// state. Returns the new paused flag.
    pub fn toggle_pause(&mut self) -> bool {
        if self.round_active() {
            self.paused = !self.paused;
        }
        self.paused
    }
}
