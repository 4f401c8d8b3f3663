use serde::{Deserialize, Serialize};

/// Default simulation rate: one tick every 250 ms (4 Hz).
pub const TICK_INTERVAL_MS: u64 = 250;
/// Rounds per match. `rounds_played` increments at every round end except
/// the final one, so a full match plays `ROUND_LIMIT + 1` rounds.
pub const ROUND_LIMIT: u32 = 5;
/// Delay between a round ending and the next one starting.
pub const ROUND_RESTART_DELAY_MS: u64 = 1000;

/// A tile coordinate on the arena grid.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent tile one step in the given direction, or None for a
    /// command that does not move the player.
    pub fn step(&self, command: Command) -> Option<Point> {
        match command {
            Command::Up => Some(Point::new(self.x, self.y - 1)),
            Command::Down => Some(Point::new(self.x, self.y + 1)),
            Command::Left => Some(Point::new(self.x - 1, self.y)),
            Command::Right => Some(Point::new(self.x + 1, self.y)),
            Command::Bomb => None,
        }
    }
}

/// A single player action for one tick. Submitting a command overwrites any
/// earlier unconsumed one; the server clears it after applying it once.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    Bomb,
}

impl std::str::FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UP" | "U" => Ok(Command::Up),
            "DOWN" | "D" => Ok(Command::Down),
            "LEFT" | "L" => Ok(Command::Left),
            "RIGHT" | "R" => Ok(Command::Right),
            "BOMB" | "B" => Ok(Command::Bomb),
            _ => Err(()),
        }
    }
}

/// One player's public state as seen by clients.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub id: u32,
    pub name: String,
    pub position: Point,
    pub alive: bool,
    pub wins: u32,
}

/// Snapshot of the arena sent with every state update.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ArenaState {
    /// Map identifier the arena was loaded from.
    pub name: String,
    pub width: i32,
    pub height: i32,
    /// One string per row; `#` wall, everything else floor.
    pub rows: Vec<String>,
    pub bombs: Vec<Point>,
}

/// Wire packets exchanged between clients and the server, bincode-encoded
/// over UDP.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    // Client -> server
    Join { name: String },
    SetName { name: String },
    Command { command: Command },
    /// Keepalive. A client with nothing to submit sends this periodically;
    /// idleness alone never costs a client its seat.
    Heartbeat,
    Leave,

    // Server -> client
    Welcome { id: u32 },
    Rejected { reason: String },
    State {
        you: PlayerState,
        others: Vec<PlayerState>,
        arena: ArenaState,
    },
    EndOfRound,
}
