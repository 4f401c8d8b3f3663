//! The session registry: admission, removal, renumbering, and eviction.
//!
//! The roster owns the authoritative player list. Ids are always dense and
//! in list order; every membership change renumbers. Disconnects during an
//! active round are two-phase: the session is marked disconnected right
//! away and the player entry is reaped at round end, so indices never shift
//! while a tick is being resolved.

use crate::arena::Arena;
use crate::error::GameError;
use crate::player::{Player, Session, LOCAL_PLAYER_NAME};
use log::info;
use shared::Command;
use std::net::SocketAddr;
use std::time::Duration;

/// How long a connected session may go without any packet (heartbeat,
/// command, or otherwise) before it counts as unresponsive. An idle client
/// that keeps heartbeating is never touched by this.
const SESSION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Admits a new networked player, or the local one when `addr` is None.
    /// Refused independently when the roster is at the arena's capacity and
    /// when a round is active.
    pub fn admit(
        &mut self,
        addr: Option<SocketAddr>,
        name: String,
        arena: &Arena,
        round_active: bool,
    ) -> Result<&Player, GameError> {
        if round_active {
            return Err(GameError::SessionRejected("round in progress"));
        }
        if self.players.len() >= arena.starting_positions().len() {
            return Err(GameError::SessionRejected("server full"));
        }
        if addr.is_none() && self.players.iter().any(|p| !p.is_networked()) {
            return Err(GameError::SessionRejected("local player already present"));
        }

        let id = self.players.len() as u32;
        let position = arena.starting_positions()[id as usize];
        let (name, session) = match addr {
            Some(addr) => (name, Some(Session::new(addr))),
            None => (LOCAL_PLAYER_NAME.to_string(), None),
        };

        info!("Player {} ({}) joined at {:?}", id, name, position);
        self.players.push(Player::new(id, name, position, session));
        Ok(self.players.last().unwrap())
    }

    pub fn player_by_addr_mut(&mut self, addr: SocketAddr) -> Option<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.session.as_ref().is_some_and(|s| s.addr == addr))
    }

    pub fn player_by_addr(&self, addr: SocketAddr) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.session.as_ref().is_some_and(|s| s.addr == addr))
    }

    pub fn local_player_mut(&mut self) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| !p.is_networked())
    }

    /// Routes a received command to the player owning the session.
    pub fn submit_command(
        &mut self,
        addr: SocketAddr,
        command: Command,
    ) -> Result<(), GameError> {
        let player = self
            .player_by_addr_mut(addr)
            .ok_or(GameError::SenderUnresolvable(addr))?;
        if let Some(session) = player.session.as_mut() {
            session.touch();
        }
        player.command = Some(command);
        Ok(())
    }

    /// Marks the session behind `addr` as recently active.
    pub fn touch(&mut self, addr: SocketAddr) -> Result<(), GameError> {
        let player = self
            .player_by_addr_mut(addr)
            .ok_or(GameError::SenderUnresolvable(addr))?;
        if let Some(session) = player.session.as_mut() {
            session.touch();
        }
        Ok(())
    }

    /// Handles a peer disconnect. Outside a round the entry is removed at
    /// once; during a round the session is only marked and the error tells
    /// the caller the removal was deferred.
    pub fn disconnect(
        &mut self,
        addr: SocketAddr,
        round_active: bool,
    ) -> Result<(), GameError> {
        let index = self
            .players
            .iter()
            .position(|p| p.session.as_ref().is_some_and(|s| s.addr == addr))
            .ok_or(GameError::SenderUnresolvable(addr))?;

        if round_active {
            if let Some(session) = self.players[index].session.as_mut() {
                session.connected = false;
            }
            return Err(GameError::StaleMutation);
        }

        let player = self.players.remove(index);
        info!("Player {} ({}) left", player.id, player.name);
        self.renumber();
        Ok(())
    }

    /// Removes players whose session dropped during the round. Returns how
    /// many entries were reaped.
    pub fn reap_disconnected(&mut self) -> usize {
        let before = self.players.len();
        self.players
            .retain(|p| p.session.as_ref().map_or(true, |s| s.connected));
        let reaped = before - self.players.len();
        if reaped > 0 {
            info!("Reaped {} disconnected player(s)", reaped);
            self.renumber();
        }
        reaped
    }

    /// Removes the session-less local player, if present.
    pub fn remove_local(&mut self) -> bool {
        let Some(index) = self.players.iter().position(|p| !p.is_networked()) else {
            return false;
        };
        self.players.remove(index);
        self.renumber();
        true
    }

    /// Fits the roster to a freshly loaded arena: evicts excess networked
    /// players from the end of the list (the local player is never evicted),
    /// then seats everyone on the new starting slots.
    pub fn apply_arena(&mut self, arena: &Arena) -> usize {
        let capacity = arena.starting_positions().len();
        let mut evicted = 0;

        let mut i = self.players.len();
        while i > 0 && self.players.len() > capacity {
            i -= 1;
            if !self.players[i].is_networked() {
                continue;
            }
            let player = self.players.remove(i);
            info!("Evicted player {} ({}): map too small", player.id, player.name);
            evicted += 1;
        }

        self.renumber();
        for (i, player) in self.players.iter_mut().enumerate() {
            player.position = arena.starting_positions()[i];
        }
        evicted
    }

    /// Seats every player on its starting slot and revives it for a new round.
    pub fn reset_for_round(&mut self, arena: &Arena) {
        for (i, player) in self.players.iter_mut().enumerate() {
            player.alive = true;
            player.position = arena.starting_positions()[i];
        }
    }

    /// Addresses of connected sessions whose packets stopped arriving.
    pub fn timed_out_addrs(&self) -> Vec<SocketAddr> {
        self.players
            .iter()
            .filter_map(|p| p.session.as_ref())
            .filter(|s| s.is_timed_out(SESSION_TIMEOUT))
            .map(|s| s.addr)
            .collect()
    }

    fn renumber(&mut self) {
        for (i, player) in self.players.iter_mut().enumerate() {
            player.id = i as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use shared::Point;

    fn test_arena() -> Arena {
        // Four slots in one open room
        Arena::parse("t", "#######\n#0...1#\n#.....#\n#2...3#\n#######").unwrap()
    }

    fn addr(port: u16) -> SocketAddr {
        format!("127.0.0.1:{}", port).parse().unwrap()
    }

    fn ids(roster: &Roster) -> Vec<u32> {
        roster.players().iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_admission_assigns_dense_ids_and_slots() {
        let arena = test_arena();
        let mut roster = Roster::new();

        let p0 = roster
            .admit(Some(addr(1000)), "a".to_string(), &arena, false)
            .unwrap();
        assert_eq!(p0.id, 0);
        assert_eq!(p0.position, arena.starting_positions()[0]);

        let p1 = roster
            .admit(Some(addr(1001)), "b".to_string(), &arena, false)
            .unwrap();
        assert_eq!(p1.id, 1);
        assert_eq!(p1.position, arena.starting_positions()[1]);
    }

    #[test]
    fn test_admission_refused_when_full() {
        let arena = test_arena();
        let mut roster = Roster::new();
        for i in 0..4 {
            roster
                .admit(Some(addr(1000 + i)), format!("p{}", i), &arena, false)
                .unwrap();
        }

        let err = roster
            .admit(Some(addr(2000)), "late".to_string(), &arena, false)
            .unwrap_err();
        assert!(matches!(err, GameError::SessionRejected("server full")));
    }

    #[test]
    fn test_admission_refused_during_round() {
        let arena = test_arena();
        let mut roster = Roster::new();

        let err = roster
            .admit(Some(addr(1000)), "late".to_string(), &arena, true)
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::SessionRejected("round in progress")
        ));
    }

    #[test]
    fn test_single_local_player() {
        let arena = test_arena();
        let mut roster = Roster::new();

        let local = roster.admit(None, String::new(), &arena, false).unwrap();
        assert_eq!(local.name, LOCAL_PLAYER_NAME);
        assert!(!local.is_networked());

        assert!(roster.admit(None, String::new(), &arena, false).is_err());

        assert!(roster.remove_local());
        assert!(!roster.remove_local());
    }

    #[test]
    fn test_removal_renumbers_densely() {
        let arena = test_arena();
        let mut roster = Roster::new();
        for i in 0..3 {
            roster
                .admit(Some(addr(1000 + i)), format!("p{}", i), &arena, false)
                .unwrap();
        }

        roster.disconnect(addr(1001), false).unwrap();
        assert_eq!(ids(&roster), vec![0, 1]);
        assert_eq!(roster.players()[1].name, "p2");
    }

    #[test]
    fn test_disconnect_during_round_is_deferred() {
        let arena = test_arena();
        let mut roster = Roster::new();
        roster
            .admit(Some(addr(1000)), "a".to_string(), &arena, false)
            .unwrap();
        roster
            .admit(Some(addr(1001)), "b".to_string(), &arena, false)
            .unwrap();

        let err = roster.disconnect(addr(1000), true).unwrap_err();
        assert!(matches!(err, GameError::StaleMutation));
        // Entry still present, session marked
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.players()[0].live_addr(), None);

        assert_eq!(roster.reap_disconnected(), 1);
        assert_eq!(ids(&roster), vec![0]);
        assert_eq!(roster.players()[0].name, "b");
    }

    #[test]
    fn test_disconnect_unknown_addr() {
        let mut roster = Roster::new();
        let err = roster.disconnect(addr(4000), false).unwrap_err();
        assert!(matches!(err, GameError::SenderUnresolvable(_)));
    }

    #[test]
    fn test_command_routing() {
        let arena = test_arena();
        let mut roster = Roster::new();
        roster
            .admit(Some(addr(1000)), "a".to_string(), &arena, false)
            .unwrap();

        roster.submit_command(addr(1000), Command::Up).unwrap();
        assert_eq!(roster.players()[0].command, Some(Command::Up));

        // Overwrites the unconsumed command
        roster.submit_command(addr(1000), Command::Bomb).unwrap();
        assert_eq!(roster.players()[0].command, Some(Command::Bomb));

        assert!(matches!(
            roster.submit_command(addr(4000), Command::Up),
            Err(GameError::SenderUnresolvable(_))
        ));
    }

    #[test]
    fn test_touch_clears_pending_timeout() {
        let arena = test_arena();
        let mut roster = Roster::new();
        roster
            .admit(Some(addr(1000)), "a".to_string(), &arena, false)
            .unwrap();

        let session = roster.players_mut()[0].session.as_mut().unwrap();
        session.last_seen = std::time::Instant::now() - SESSION_TIMEOUT - Duration::from_secs(1);
        assert_eq!(roster.timed_out_addrs(), vec![addr(1000)]);

        roster.touch(addr(1000)).unwrap();
        assert!(roster.timed_out_addrs().is_empty());

        assert!(matches!(
            roster.touch(addr(4000)),
            Err(GameError::SenderUnresolvable(_))
        ));
    }

    #[test]
    fn test_eviction_spares_local_player() {
        let arena = test_arena();
        let mut roster = Roster::new();
        roster
            .admit(Some(addr(1000)), "a".to_string(), &arena, false)
            .unwrap();
        roster.admit(None, String::new(), &arena, false).unwrap();
        roster
            .admit(Some(addr(1001)), "b".to_string(), &arena, false)
            .unwrap();
        roster
            .admit(Some(addr(1002)), "c".to_string(), &arena, false)
            .unwrap();

        // Two slots only: the two most recently joined networked players go
        let small = Arena::parse("s", "####\n#01#\n####").unwrap();
        assert_eq!(roster.apply_arena(&small), 2);

        let names: Vec<&str> = roster.players().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", LOCAL_PLAYER_NAME]);
        assert_eq!(ids(&roster), vec![0, 1]);
        assert_eq!(roster.players()[0].position, small.starting_positions()[0]);
        assert_eq!(roster.players()[1].position, small.starting_positions()[1]);
    }

    #[test]
    fn test_reset_for_round_revives_and_seats() {
        let arena = test_arena();
        let mut roster = Roster::new();
        roster
            .admit(Some(addr(1000)), "a".to_string(), &arena, false)
            .unwrap();
        roster.players_mut()[0].alive = false;
        roster.players_mut()[0].position = Point::new(3, 2);

        roster.reset_for_round(&arena);
        assert!(roster.players()[0].alive);
        assert_eq!(roster.players()[0].position, arena.starting_positions()[0]);
    }
}
