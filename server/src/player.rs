//! Player and session entities.
//!
//! A `Player` is the game-facing actor owned by the roster. A `Session` is
//! the record of one remote connection; it lives inline in its player and
//! is identified by the peer's socket address. The local (console-driven)
//! player has no session at all. Sends always check `connected` first, so
//! a vanished peer never produces a dangling delivery.

use shared::{Command, PlayerState, Point};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Display name given to the session-less local player.
pub const LOCAL_PLAYER_NAME: &str = "Local player";

/// One remote connection's identity and liveness state.
#[derive(Debug, Clone)]
pub struct Session {
    /// Peer address, used both for routing replies and as the session key.
    pub addr: SocketAddr,
    /// Cleared when the peer leaves or times out during a round; the player
    /// entry itself is reaped at round end.
    pub connected: bool,
    /// Last time any packet arrived from this peer.
    pub last_seen: Instant,
    /// Set while a match is running; `SetName` packets are ignored then.
    pub name_frozen: bool,
}

impl Session {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connected: true,
            last_seen: Instant::now(),
            name_frozen: false,
        }
    }

    /// Marks the session as recently active.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.connected && self.last_seen.elapsed() > timeout
    }
}

/// A participant in the game, networked or local.
#[derive(Debug, Clone)]
pub struct Player {
    /// Dense id, always a permutation of `0..roster_len`; recomputed on
    /// every membership change.
    pub id: u32,
    pub name: String,
    pub position: Point,
    pub alive: bool,
    pub wins: u32,
    /// `None` for the local player.
    pub session: Option<Session>,
    /// Latest submitted command, consumed at most once per tick.
    pub command: Option<Command>,
}

impl Player {
    pub fn new(id: u32, name: String, position: Point, session: Option<Session>) -> Self {
        Self {
            id,
            name,
            position,
            alive: true,
            wins: 0,
            session,
            command: None,
        }
    }

    /// Takes the pending command, leaving the slot empty. Each submitted
    /// command fires exactly once.
    pub fn take_command(&mut self) -> Option<Command> {
        self.command.take()
    }

    pub fn is_networked(&self) -> bool {
        self.session.is_some()
    }

    /// The peer address if this player is networked and still connected.
    pub fn live_addr(&self) -> Option<SocketAddr> {
        match &self.session {
            Some(session) if session.connected => Some(session.addr),
            _ => None,
        }
    }

    pub fn add_win(&mut self) {
        self.wins += 1;
    }

    /// The client-visible view of this player.
    pub fn state(&self) -> PlayerState {
        PlayerState {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            alive: self.alive,
            wins: self.wins,
        }
    }
}
