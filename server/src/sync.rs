//! The sync broadcaster: per-recipient state snapshots after each tick.
//!
//! Every living, connected, networked player gets a directed state packet
//! carrying all *other* living players, the arena snapshot, and its own
//! entry for self-identification. The recipient's entry never appears in
//! the others list. Delivery is fire-and-forget.

use crate::arena::Arena;
use crate::player::Player;
use shared::Packet;
use std::net::SocketAddr;

/// Builds the per-recipient state packets for one resolved tick.
pub fn state_snapshots(players: &[Player], arena: &Arena) -> Vec<(SocketAddr, Packet)> {
    let living: Vec<&Player> = players.iter().filter(|p| p.alive).collect();
    let arena_state = arena.state();

    let mut out = Vec::new();
    for recipient in &living {
        let Some(addr) = recipient.live_addr() else {
            continue;
        };
        let others = living
            .iter()
            .filter(|other| other.id != recipient.id)
            .map(|other| other.state())
            .collect();
        out.push((
            addr,
            Packet::State {
                you: recipient.state(),
                others,
                arena: arena_state.clone(),
            },
        ));
    }
    out
}

/// Builds the end-of-round notifications: every networked player still
/// connected gets one, living or dead.
pub fn end_of_round_notices(players: &[Player]) -> Vec<(SocketAddr, Packet)> {
    players
        .iter()
        .filter_map(|p| p.live_addr())
        .map(|addr| (addr, Packet::EndOfRound))
        .collect()
}
