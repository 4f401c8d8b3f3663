//! The tick engine: turns every player's pending command into the next
//! consistent world state.
//!
//! Each tick first resolves bomb fuses and kills anyone standing in a
//! blast, then applies commands in a uniformly random order so that
//! contention for the same tile is fair across ticks instead of always
//! favoring low player ids. Movement is validated against the in-progress
//! state: a player resolved earlier in the same tick already blocks the
//! tile it moved onto.

use crate::arena::Arena;
use crate::player::Player;
use log::debug;
use rand::Rng;
use shared::Command;

/// Outcome of one resolved tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Players killed by explosions this tick.
    pub deaths: usize,
    /// Players alive after resolution.
    pub living: usize,
    /// True when the round termination condition fired: at least one death
    /// this tick and fewer than two players left alive. The death guard
    /// keeps a round that starts understaffed from ending itself instantly.
    pub round_over: bool,
}

/// Resolves one tick. Deterministic for a fixed RNG seed.
pub fn resolve(players: &mut [Player], arena: &mut Arena, rng: &mut impl Rng) -> TickReport {
    let explosions = arena.advance_bombs();
    let mut deaths = 0;
    if !explosions.is_empty() {
        for player in players.iter_mut() {
            if player.alive && explosions.contains(&player.position) {
                debug!("Player {} ({}) died at {:?}", player.id, player.name, player.position);
                player.alive = false;
                deaths += 1;
            }
        }
    }

    // Fisher-Yates over an index snapshot; never a list of live references
    let mut order: Vec<usize> = (0..players.len()).collect();
    for i in (1..order.len()).rev() {
        let j = rng.gen_range(0..=i);
        order.swap(i, j);
    }

    for index in order {
        let Some(command) = players[index].take_command() else {
            continue;
        };
        // A dead player's command is consumed but has no effect
        if !players[index].alive {
            continue;
        }

        let position = players[index].position;
        let candidate = match command {
            Command::Bomb => {
                arena.add_bomb(position, players[index].id);
                continue;
            }
            direction => match position.step(direction) {
                Some(candidate) => candidate,
                None => continue,
            },
        };

        let mut can_walk = arena.is_valid_position(candidate);
        if can_walk
            && players
                .iter()
                .any(|other| other.alive && other.position == candidate)
        {
            can_walk = false;
        }
        if can_walk && arena.has_bomb_at(candidate) {
            can_walk = false;
        }

        if can_walk {
            players[index].position = candidate;
        }
    }

    let living = players.iter().filter(|p| p.alive).count();
    TickReport {
        deaths,
        living,
        round_over: deaths > 0 && living < 2,
    }
}
