//! # Bomber Arena Server
//!
//! Authoritative simulation core for a tile-grid arena combat game. The
//! server advances the world on a fixed tick, resolves simultaneously
//! submitted player commands into a single consistent state, runs the
//! round/match lifecycle, and pushes per-recipient snapshots to every
//! networked session.
//!
//! ## Architecture
//!
//! One game task owns all mutable state (roster, arena, round machine) and
//! serves three sources in a `tokio::select!` loop: the event queue fed by
//! the network receiver and the operator console, the fixed-rate tick
//! interval, and a slow session-timeout scan. Nothing else touches game
//! state, so no tick ever overlaps another and membership never changes
//! mid-resolution. The invariants hold without locks.
//!
//! Clients talk bincode-encoded packets over UDP. The transport tasks in
//! [`network`] only decode, forward, and send; every decision is made on
//! the game task.
//!
//! ## Modules
//!
//! - [`arena`]: the map, its tile grid, starting slots, bombs, explosions,
//!   and the loadable map catalog.
//! - [`player`]: player and session entities.
//! - [`roster`]: the session registry, covering admission, removal, dense
//!   renumbering, deferred disconnects, and capacity eviction.
//! - [`tick`]: the per-tick action resolver with its randomized,
//!   contention-fair turn order.
//! - [`rounds`]: round and match progression.
//! - [`sync`]: per-recipient state snapshot construction.
//! - [`game`]: the game manager event loop tying it all together.
//! - [`network`]: UDP receiver/sender tasks and channel message types.
//! - [`error`]: the recoverable error taxonomy.
//!
//! ## Rules of the game
//!
//! Players move one tile per tick or drop a bomb on their own tile. Bombs
//! detonate on a fixed fuse; blasts kill players and chain into other
//! bombs. A round ends when a death leaves fewer than two players alive;
//! the survivor is awarded a win. After the configured number of rounds
//! the match closes with a summary and waits for an explicit restart.

pub mod arena;
pub mod error;
pub mod game;
pub mod network;
pub mod player;
pub mod roster;
pub mod rounds;
pub mod sync;
pub mod tick;
