//! The game manager: composes the roster, arena, round machine, tick engine,
//! and sync broadcaster, and drives them all from a single event loop.
//!
//! One task owns every piece of mutable game state. It selects over the
//! event queue (network packets and operator commands), the tick interval,
//! and a slow session-timeout scan. Because all of these are served one at
//! a time on the same task, a membership change can never interleave with a
//! tick resolution and a command received after a tick's snapshot is only
//! visible to the next tick.

use crate::arena::{self, Arena};
use crate::error::GameError;
use crate::network::{GameEvent, NetMessage};
use crate::roster::Roster;
use crate::rounds::{Phase, RoundOutcome, Rounds};
use crate::sync;
use crate::tick;
use log::{debug, error, info, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{Command, Packet, PlayerState, ROUND_RESTART_DELAY_MS};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

/// Notifications surfaced to the presentation/operator layer.
#[derive(Debug, Clone)]
pub enum Notice {
    /// One tick was resolved.
    Tick,
    /// Membership, names, or win counts changed; carries the full roster.
    RosterChanged(Vec<PlayerState>),
    /// The map catalog was re-scanned.
    MapsChanged(Vec<String>),
    SoundEnabledChanged(bool),
    /// Match finished; final standings sorted by wins, best first.
    GameOver(Vec<PlayerState>),
}

pub struct Game {
    roster: Roster,
    arena: Arena,
    rounds: Rounds,
    rng: StdRng,
    tick_interval: Duration,
    sound_enabled: bool,
    /// Kept for self-scheduled events such as the delayed round restart.
    events_tx: mpsc::UnboundedSender<GameEvent>,
    events_rx: mpsc::UnboundedReceiver<GameEvent>,
    net_tx: mpsc::UnboundedSender<NetMessage>,
    notices_tx: mpsc::UnboundedSender<Notice>,
}

impl Game {
    pub fn new(
        map: &str,
        tick_interval: Duration,
        events_tx: mpsc::UnboundedSender<GameEvent>,
        events_rx: mpsc::UnboundedReceiver<GameEvent>,
        net_tx: mpsc::UnboundedSender<NetMessage>,
        notices_tx: mpsc::UnboundedSender<Notice>,
    ) -> Result<Self, GameError> {
        let arena = Arena::load(map)?;
        info!(
            "Loaded map {:?} with capacity {}",
            map,
            arena.starting_positions().len()
        );
        Ok(Self {
            roster: Roster::new(),
            arena,
            rounds: Rounds::new(),
            rng: StdRng::from_entropy(),
            tick_interval,
            sound_enabled: false,
            events_tx,
            events_rx,
            net_tx,
            notices_tx,
        })
    }

    /// Runs the game loop until shutdown.
    pub async fn run(mut self) {
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut timeout_scan = interval(Duration::from_secs(1));
        timeout_scan.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                event = self.events_rx.recv() => {
                    match event {
                        Some(GameEvent::Shutdown) | None => {
                            info!("Game loop shutting down");
                            break;
                        }
                        Some(event) => self.handle_event(event),
                    }
                },
                _ = ticker.tick(), if self.rounds.ticking() => {
                    self.game_tick();
                },
                _ = timeout_scan.tick() => {
                    self.check_timeouts();
                },
            }
        }
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::PacketReceived { packet, addr } => self.handle_packet(packet, addr),
            GameEvent::LocalCommand(command) => self.local_command(command),
            GameEvent::AddLocalPlayer => self.add_local_player(),
            GameEvent::RemoveHumanPlayers => self.remove_human_players(),
            GameEvent::LoadMap(identifier) => {
                if self.rounds.round_active() {
                    warn!("Map load refused: {}", GameError::StaleMutation);
                } else if let Err(e) = self.load_map(&identifier) {
                    warn!("Keeping current map: {}", e);
                }
            }
            GameEvent::RefreshMaps => {
                let _ = self.notices_tx.send(Notice::MapsChanged(arena::list_maps()));
            }
            GameEvent::StartRound => self.start_round(),
            GameEvent::ScheduledRestart => {
                // A stop or an operator restart during the breather makes
                // the queued restart stale
                if self.rounds.phase() == Phase::RoundOver {
                    self.start_round();
                } else {
                    debug!("Dropping stale scheduled restart");
                }
            }
            GameEvent::TogglePause => {
                let paused = self.rounds.toggle_pause();
                info!("Pause toggled: now {}", if paused { "paused" } else { "running" });
            }
            GameEvent::StopGame => self.stop_game(),
            GameEvent::SetSoundEnabled(enabled) => self.set_sound_enabled(enabled),
            // Handled by the run loop before dispatch
            GameEvent::Shutdown => {}
        }
    }

    fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Join { name } => self.admit(addr, name),
            Packet::Command { command } => {
                if let Err(e) = self.roster.submit_command(addr, command) {
                    warn!("Dropped command: {}", e);
                }
            }
            Packet::SetName { name } => self.set_name(addr, name),
            Packet::Heartbeat => {
                if let Err(e) = self.roster.touch(addr) {
                    debug!("Dropped heartbeat: {}", e);
                }
            }
            Packet::Leave => self.handle_disconnect(addr),
            other => warn!("Unexpected packet from {}: {:?}", addr, other),
        }
    }

    fn admit(&mut self, addr: SocketAddr, name: String) {
        // Duplicate Join from a known peer counts as activity and just gets
        // re-acknowledged
        if let Some(existing) = self.roster.player_by_addr_mut(addr) {
            let id = existing.id;
            if let Some(session) = existing.session.as_mut() {
                session.touch();
            }
            self.send(addr, Packet::Welcome { id });
            return;
        }

        let name = if name.trim().is_empty() {
            format!("Player {}", self.roster.len())
        } else {
            name
        };

        match self
            .roster
            .admit(Some(addr), name, &self.arena, self.rounds.round_active())
            .map(|p| p.id)
        {
            Ok(id) => {
                self.send(addr, Packet::Welcome { id });
                self.export_roster();
            }
            Err(e) => {
                warn!("Rejected connection from {}: {}", addr, e);
                self.send(
                    addr,
                    Packet::Rejected {
                        reason: e.to_string(),
                    },
                );
            }
        }
    }

    fn set_name(&mut self, addr: SocketAddr, name: String) {
        let Some(player) = self.roster.player_by_addr_mut(addr) else {
            warn!("Dropped name change: {}", GameError::SenderUnresolvable(addr));
            return;
        };
        if let Some(session) = player.session.as_mut() {
            session.touch();
            if session.name_frozen {
                debug!("Ignoring name change from {} while a match is running", addr);
                return;
            }
        }
        player.name = name;
        self.export_roster();
    }

    fn handle_disconnect(&mut self, addr: SocketAddr) {
        match self.roster.disconnect(addr, self.rounds.round_active()) {
            Ok(()) => self.export_roster(),
            Err(GameError::StaleMutation) => {
                debug!("Disconnect of {} deferred to round end", addr)
            }
            Err(e) => warn!("Ignored disconnect: {}", e),
        }
    }

    fn check_timeouts(&mut self) {
        for addr in self.roster.timed_out_addrs() {
            info!("Session {} timed out", addr);
            self.handle_disconnect(addr);
        }
    }

    fn local_command(&mut self, command: Command) {
        match self.roster.local_player_mut() {
            Some(player) => player.command = Some(command),
            None => debug!("Local command {:?} with no local player", command),
        }
    }

    fn add_local_player(&mut self) {
        match self
            .roster
            .admit(None, String::new(), &self.arena, self.rounds.round_active())
            .map(|p| p.id)
        {
            Ok(id) => {
                info!("Local player joined with id {}", id);
                self.export_roster();
            }
            Err(e) => warn!("Local player not admitted: {}", e),
        }
    }

    fn remove_human_players(&mut self) {
        if self.roster.remove_local() {
            info!("Local player removed");
            self.export_roster();
        }
    }

    /// Swaps in a new arena. On failure the previous arena is retained
    /// untouched. Excess networked players are evicted before the swap and
    /// everyone is reseated on the new starting slots.
    fn load_map(&mut self, identifier: &str) -> Result<(), GameError> {
        let arena = Arena::load(identifier)?;
        self.roster.apply_arena(&arena);
        self.arena = arena;
        info!(
            "Loaded map {:?} with capacity {}",
            identifier,
            self.arena.starting_positions().len()
        );
        self.export_roster();
        Ok(())
    }

    fn start_round(&mut self) {
        if self.roster.is_empty() {
            debug!("Not starting a round without players");
            return;
        }
        if !self.rounds.can_start_round() {
            return;
        }

        // Reload the arena from its current identity to clear bombs left
        // over from the previous round
        match Arena::load(self.arena.name()) {
            Ok(arena) => {
                self.roster.apply_arena(&arena);
                self.arena = arena;
            }
            Err(e) => {
                warn!("Reload of current map failed ({}), clearing bombs only", e);
                self.arena.clear_bombs();
            }
        }

        self.roster.reset_for_round(&self.arena);
        // Names are locked for the duration of the match
        for player in self.roster.players_mut() {
            if let Some(session) = player.session.as_mut() {
                session.name_frozen = true;
            }
        }

        self.rounds.begin_round();
        info!("Round started with {} player(s)", self.roster.len());
        self.export_roster();
    }

    fn game_tick(&mut self) {
        let report = tick::resolve(self.roster.players_mut(), &mut self.arena, &mut self.rng);
        trace!("Tick resolved: {:?}", report);
        let _ = self.notices_tx.send(Notice::Tick);

        if report.round_over {
            self.end_round(true);
        } else {
            for (addr, packet) in sync::state_snapshots(self.roster.players(), &self.arena) {
                self.send(addr, packet);
            }
        }
    }

    fn end_round(&mut self, schedule_next: bool) {
        for (addr, packet) in sync::end_of_round_notices(self.roster.players()) {
            self.send(addr, packet);
        }

        let outcome = self.rounds.finish_round();
        if outcome == RoundOutcome::NextRound {
            // Win goes to the first living player in list order, while
            // deferred disconnects are still in the list
            if let Some(winner) = self.roster.players_mut().iter_mut().find(|p| p.alive) {
                winner.add_win();
                info!("Round won by {}", winner.name);
            }
        }
        self.roster.reap_disconnected();
        self.export_roster();

        match outcome {
            RoundOutcome::NextRound => {
                if schedule_next {
                    let events_tx = self.events_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(ROUND_RESTART_DELAY_MS)).await;
                        let _ = events_tx.send(GameEvent::ScheduledRestart);
                    });
                }
            }
            RoundOutcome::MatchOver => {
                let mut standings: Vec<PlayerState> =
                    self.roster.players().iter().map(|p| p.state()).collect();
                standings.sort_by(|a, b| b.wins.cmp(&a.wins));
                info!("Match over, winner: {}",
                    standings.first().map(|s| s.name.as_str()).unwrap_or("nobody"));
                let _ = self.notices_tx.send(Notice::GameOver(standings));
                self.unfreeze_names();
            }
        }
    }

    /// Explicit abort: closes any active round without scheduling a restart,
    /// then clears all match progress.
    fn stop_game(&mut self) {
        if self.rounds.round_active() {
            self.end_round(false);
        }
        self.rounds.abort();
        self.unfreeze_names();
        info!("Game stopped");
    }

    fn set_sound_enabled(&mut self, enabled: bool) {
        if enabled == self.sound_enabled {
            return;
        }
        self.sound_enabled = enabled;
        let _ = self.notices_tx.send(Notice::SoundEnabledChanged(enabled));
    }

    fn unfreeze_names(&mut self) {
        for player in self.roster.players_mut() {
            if let Some(session) = player.session.as_mut() {
                session.name_frozen = false;
            }
        }
    }

    fn export_roster(&self) {
        let entries = self.roster.players().iter().map(|p| p.state()).collect();
        let _ = self.notices_tx.send(Notice::RosterChanged(entries));
    }

    fn send(&self, addr: SocketAddr, packet: Packet) {
        if let Err(e) = self.net_tx.send(NetMessage::Send { packet, addr }) {
            error!("Failed to queue packet for {}: {}", addr, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::BOMB_FUSE_TICKS;
    use crate::rounds::Phase;
    use shared::ROUND_LIMIT;

    struct Harness {
        game: Game,
        net_rx: mpsc::UnboundedReceiver<NetMessage>,
        notices_rx: mpsc::UnboundedReceiver<Notice>,
    }

    fn harness() -> Harness {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (net_tx, net_rx) = mpsc::unbounded_channel();
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        let mut game = Game::new(
            "default",
            Duration::from_millis(250),
            events_tx,
            events_rx,
            net_tx,
            notices_tx,
        )
        .unwrap();
        game.rng = StdRng::seed_from_u64(1);
        Harness {
            game,
            net_rx,
            notices_rx,
        }
    }

    fn addr(port: u16) -> SocketAddr {
        format!("127.0.0.1:{}", port).parse().unwrap()
    }

    fn join(h: &mut Harness, port: u16, name: &str) {
        h.game.handle_event(GameEvent::PacketReceived {
            packet: Packet::Join {
                name: name.to_string(),
            },
            addr: addr(port),
        });
    }

    fn sent_packets(h: &mut Harness) -> Vec<(SocketAddr, Packet)> {
        let mut out = Vec::new();
        while let Ok(NetMessage::Send { packet, addr }) = h.net_rx.try_recv() {
            out.push((addr, packet));
        }
        out
    }

    fn drain_notices(h: &mut Harness) -> Vec<Notice> {
        let mut out = Vec::new();
        while let Ok(notice) = h.notices_rx.try_recv() {
            out.push(notice);
        }
        out
    }

    #[test]
    fn test_join_gets_welcome_and_roster_export() {
        let mut h = harness();
        join(&mut h, 1000, "alice");

        let packets = sent_packets(&mut h);
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].0, addr(1000));
        assert!(matches!(packets[0].1, Packet::Welcome { id: 0 }));

        let notices = drain_notices(&mut h);
        assert!(notices
            .iter()
            .any(|n| matches!(n, Notice::RosterChanged(entries) if entries.len() == 1)));
    }

    #[test]
    fn test_duplicate_join_reacknowledged() {
        let mut h = harness();
        join(&mut h, 1000, "alice");
        sent_packets(&mut h);

        join(&mut h, 1000, "alice");
        let packets = sent_packets(&mut h);
        assert_eq!(packets.len(), 1);
        assert!(matches!(packets[0].1, Packet::Welcome { id: 0 }));
        assert_eq!(h.game.roster.len(), 1);
    }

    #[test]
    fn test_join_rejected_during_round() {
        let mut h = harness();
        join(&mut h, 1000, "alice");
        h.game.handle_event(GameEvent::StartRound);
        sent_packets(&mut h);

        join(&mut h, 1001, "late");
        let packets = sent_packets(&mut h);
        assert_eq!(packets.len(), 1);
        assert!(matches!(packets[0].1, Packet::Rejected { .. }));
        assert_eq!(h.game.roster.len(), 1);
    }

    #[test]
    fn test_command_from_unknown_addr_ignored() {
        let mut h = harness();
        h.game.handle_event(GameEvent::PacketReceived {
            packet: Packet::Command {
                command: Command::Up,
            },
            addr: addr(4000),
        });
        assert!(sent_packets(&mut h).is_empty());
    }

    #[test]
    fn test_tick_broadcasts_excluding_recipient() {
        let mut h = harness();
        join(&mut h, 1000, "alice");
        join(&mut h, 1001, "bob");
        h.game.handle_event(GameEvent::StartRound);
        sent_packets(&mut h);

        h.game.game_tick();
        let packets = sent_packets(&mut h);
        assert_eq!(packets.len(), 2);
        for (to, packet) in packets {
            let Packet::State { you, others, .. } = packet else {
                panic!("expected state packet");
            };
            assert_eq!(others.len(), 1);
            assert_ne!(others[0].id, you.id);
            let expected = if to == addr(1000) { "alice" } else { "bob" };
            assert_eq!(you.name, expected);
        }
    }

    // Needs a runtime: the natural round end schedules the delayed restart
    #[tokio::test]
    async fn test_bomb_round_ends_with_win_award() {
        let mut h = harness();
        join(&mut h, 1000, "alice");
        join(&mut h, 1001, "bob");
        h.game.handle_event(GameEvent::StartRound);
        sent_packets(&mut h);

        // Alice drops a bomb and stays; bob keeps clear on the far side
        h.game.handle_event(GameEvent::PacketReceived {
            packet: Packet::Command {
                command: Command::Bomb,
            },
            addr: addr(1000),
        });
        for _ in 0..=BOMB_FUSE_TICKS {
            h.game.game_tick();
            if h.game.rounds.phase() == Phase::RoundOver {
                break;
            }
        }

        assert_eq!(h.game.rounds.phase(), Phase::RoundOver);
        assert_eq!(h.game.rounds.rounds_played(), 1);
        let players = h.game.roster.players();
        assert!(!players[0].alive);
        assert_eq!(players[0].wins, 0);
        assert!(players[1].alive);
        assert_eq!(players[1].wins, 1);

        let packets = sent_packets(&mut h);
        let end_notices: Vec<_> = packets
            .iter()
            .filter(|(_, p)| matches!(p, Packet::EndOfRound))
            .collect();
        assert_eq!(end_notices.len(), 2);
    }

    #[test]
    fn test_match_over_after_round_limit() {
        let mut h = harness();
        join(&mut h, 1000, "alice");
        join(&mut h, 1001, "bob");

        for _ in 0..ROUND_LIMIT {
            h.game.handle_event(GameEvent::StartRound);
            h.game.roster.players_mut()[0].alive = false;
            h.game.end_round(false);
        }
        assert_eq!(h.game.rounds.rounds_played(), ROUND_LIMIT);

        h.game.handle_event(GameEvent::StartRound);
        h.game.roster.players_mut()[0].alive = false;
        h.game.end_round(false);

        assert_eq!(h.game.rounds.phase(), Phase::MatchOver);
        assert_eq!(h.game.rounds.rounds_played(), 0);

        let notices = drain_notices(&mut h);
        let game_over = notices.iter().find_map(|n| match n {
            Notice::GameOver(standings) => Some(standings.clone()),
            _ => None,
        });
        let standings = game_over.expect("match summary notice");
        assert_eq!(standings[0].name, "bob");
        assert_eq!(standings[0].wins, ROUND_LIMIT);
    }

    #[test]
    fn test_deferred_disconnect_reaped_at_round_end() {
        let mut h = harness();
        join(&mut h, 1000, "alice");
        join(&mut h, 1001, "bob");
        h.game.handle_event(GameEvent::StartRound);

        h.game.handle_event(GameEvent::PacketReceived {
            packet: Packet::Leave,
            addr: addr(1001),
        });
        assert_eq!(h.game.roster.len(), 2);

        h.game.roster.players_mut()[1].alive = false;
        h.game.end_round(false);
        assert_eq!(h.game.roster.len(), 1);
        assert_eq!(h.game.roster.players()[0].name, "alice");
        assert_eq!(h.game.roster.players()[0].id, 0);
    }

    #[test]
    fn test_heartbeat_keeps_idle_session_admitted() {
        let mut h = harness();
        join(&mut h, 1000, "alice");

        let session = h.game.roster.players_mut()[0].session.as_mut().unwrap();
        session.last_seen = std::time::Instant::now() - Duration::from_secs(6);

        h.game.handle_event(GameEvent::PacketReceived {
            packet: Packet::Heartbeat,
            addr: addr(1000),
        });
        h.game.check_timeouts();
        assert_eq!(h.game.roster.len(), 1);
    }

    #[test]
    fn test_unresponsive_session_handled_as_disconnect() {
        let mut h = harness();
        join(&mut h, 1000, "alice");

        let session = h.game.roster.players_mut()[0].session.as_mut().unwrap();
        session.last_seen = std::time::Instant::now() - Duration::from_secs(6);

        h.game.check_timeouts();
        assert!(h.game.roster.is_empty());
    }

    #[test]
    fn test_duplicate_join_counts_as_activity() {
        let mut h = harness();
        join(&mut h, 1000, "alice");

        let session = h.game.roster.players_mut()[0].session.as_mut().unwrap();
        session.last_seen = std::time::Instant::now() - Duration::from_secs(6);

        join(&mut h, 1000, "alice");
        h.game.check_timeouts();
        assert_eq!(h.game.roster.len(), 1);
    }

    #[test]
    fn test_scheduled_restart_fires_between_rounds() {
        let mut h = harness();
        join(&mut h, 1000, "alice");
        join(&mut h, 1001, "bob");
        h.game.handle_event(GameEvent::StartRound);
        h.game.roster.players_mut()[0].alive = false;
        h.game.end_round(false);
        assert_eq!(h.game.rounds.phase(), Phase::RoundOver);

        h.game.handle_event(GameEvent::ScheduledRestart);
        assert_eq!(h.game.rounds.phase(), Phase::RoundActive);
    }

    #[test]
    fn test_stop_discards_scheduled_restart() {
        let mut h = harness();
        join(&mut h, 1000, "alice");
        join(&mut h, 1001, "bob");
        h.game.handle_event(GameEvent::StartRound);
        h.game.roster.players_mut()[0].alive = false;
        h.game.end_round(false);

        h.game.handle_event(GameEvent::StopGame);
        assert_eq!(h.game.rounds.phase(), Phase::Lobby);

        // The restart queued during the breather arrives after the stop
        h.game.handle_event(GameEvent::ScheduledRestart);
        assert_eq!(h.game.rounds.phase(), Phase::Lobby);
        assert!(!h.game.rounds.ticking());
    }

    #[test]
    fn test_dropped_survivor_still_takes_the_round() {
        let mut h = harness();
        join(&mut h, 1000, "alice");
        join(&mut h, 1001, "bob");
        join(&mut h, 1002, "carol");
        h.game.handle_event(GameEvent::StartRound);

        // Bob leaves mid-round but outlives alice
        h.game.handle_event(GameEvent::PacketReceived {
            packet: Packet::Leave,
            addr: addr(1001),
        });
        h.game.roster.players_mut()[0].alive = false;
        h.game.end_round(false);

        // The win went to bob before he was reaped, not to carol
        assert_eq!(h.game.roster.len(), 2);
        assert!(h.game.roster.players().iter().all(|p| p.wins == 0));
        assert_eq!(h.game.rounds.rounds_played(), 1);
    }

    #[test]
    fn test_stop_game_resets_progress() {
        let mut h = harness();
        join(&mut h, 1000, "alice");
        h.game.handle_event(GameEvent::StartRound);
        h.game.handle_event(GameEvent::StopGame);

        assert_eq!(h.game.rounds.phase(), Phase::Lobby);
        assert_eq!(h.game.rounds.rounds_played(), 0);
        assert!(!h.game.rounds.ticking());
    }

    #[test]
    fn test_local_player_lifecycle() {
        let mut h = harness();
        h.game.handle_event(GameEvent::AddLocalPlayer);
        assert_eq!(h.game.roster.len(), 1);

        h.game.handle_event(GameEvent::LocalCommand(Command::Right));
        assert_eq!(h.game.roster.players()[0].command, Some(Command::Right));

        h.game.handle_event(GameEvent::RemoveHumanPlayers);
        assert!(h.game.roster.is_empty());
    }

    #[test]
    fn test_map_load_refused_during_round() {
        let mut h = harness();
        join(&mut h, 1000, "alice");
        h.game.handle_event(GameEvent::StartRound);
        h.game
            .handle_event(GameEvent::LoadMap("crossfire".to_string()));
        assert_eq!(h.game.arena.name(), "default");

        h.game.handle_event(GameEvent::StopGame);
        h.game
            .handle_event(GameEvent::LoadMap("crossfire".to_string()));
        assert_eq!(h.game.arena.name(), "crossfire");
    }

    #[test]
    fn test_invalid_map_keeps_previous_arena() {
        let mut h = harness();
        h.game
            .handle_event(GameEvent::LoadMap("maps/missing.map".to_string()));
        assert_eq!(h.game.arena.name(), "default");
    }

    #[test]
    fn test_name_change_frozen_during_match() {
        let mut h = harness();
        join(&mut h, 1000, "alice");
        h.game.handle_event(GameEvent::StartRound);

        h.game.handle_event(GameEvent::PacketReceived {
            packet: Packet::SetName {
                name: "renamed".to_string(),
            },
            addr: addr(1000),
        });
        assert_eq!(h.game.roster.players()[0].name, "alice");

        h.game.handle_event(GameEvent::StopGame);
        h.game.handle_event(GameEvent::PacketReceived {
            packet: Packet::SetName {
                name: "renamed".to_string(),
            },
            addr: addr(1000),
        });
        assert_eq!(h.game.roster.players()[0].name, "renamed");
    }

    #[test]
    fn test_sound_toggle_notice() {
        let mut h = harness();
        drain_notices(&mut h);

        h.game.handle_event(GameEvent::SetSoundEnabled(true));
        h.game.handle_event(GameEvent::SetSoundEnabled(true));
        let notices = drain_notices(&mut h);
        let changes = notices
            .iter()
            .filter(|n| matches!(n, Notice::SoundEnabledChanged(true)))
            .count();
        assert_eq!(changes, 1);
    }
}
