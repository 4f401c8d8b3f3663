//! Error taxonomy for the game core. Every variant is recovered locally;
//! none of these terminate the game task.

use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// A map failed capacity/shape validation. The load is rejected and the
    /// previous arena stays in place.
    #[error("map {0:?} failed validation: {1}")]
    MapInvalid(String, String),

    /// Admission was denied. The connection gets a rejection packet and no
    /// player is created.
    #[error("session rejected: {0}")]
    SessionRejected(&'static str),

    /// A packet or disconnect could not be mapped to a known player.
    #[error("no player matches sender {0}")]
    SenderUnresolvable(SocketAddr),

    /// A membership change arrived while a round was active. The change is
    /// deferred to round end, never applied immediately.
    #[error("membership change during an active round, deferred to round end")]
    StaleMutation,
}
