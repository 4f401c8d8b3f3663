use clap::Parser;
use log::{error, info, trace, warn};
use server::arena;
use server::game::{Game, Notice};
use server::network::{self, GameEvent};
use shared::{Command, TICK_INTERVAL_MS};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Authoritative bomber-arena game server.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server IP address to bind to
    #[clap(short = 'H', long, default_value = "0.0.0.0")]
    host: String,
    /// Server port to listen on
    #[clap(short, long, default_value = "54321")]
    port: u16,
    /// Milliseconds between simulation ticks
    #[clap(short, long, default_value_t = TICK_INTERVAL_MS)]
    tick_ms: u64,
    /// Map to load at startup (builtin name or file path)
    #[clap(short, long, default_value = "default")]
    map: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let socket = network::bind(&format!("{}:{}", args.host, args.port)).await?;
    let server_addr = socket.local_addr()?;

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (net_tx, net_rx) = mpsc::unbounded_channel();
    let (notices_tx, notices_rx) = mpsc::unbounded_channel();

    network::spawn_receiver(std::sync::Arc::clone(&socket), events_tx.clone());
    network::spawn_sender(socket, net_rx);
    spawn_notice_logger(notices_rx);
    spawn_console(events_tx.clone(), server_addr.to_string());

    let game = Game::new(
        &args.map,
        Duration::from_millis(args.tick_ms),
        events_tx.clone(),
        events_rx,
        net_tx,
        notices_tx,
    )?;
    let game_handle = tokio::spawn(game.run());

    tokio::select! {
        result = game_handle => {
            if let Err(e) = result {
                error!("Game task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
            let _ = events_tx.send(GameEvent::Shutdown);
        }
    }

    Ok(())
}

/// Forwards presentation notices to the log.
fn spawn_notice_logger(mut notices_rx: mpsc::UnboundedReceiver<Notice>) {
    tokio::spawn(async move {
        while let Some(notice) = notices_rx.recv().await {
            match notice {
                Notice::Tick => trace!("tick"),
                Notice::RosterChanged(entries) => {
                    let names: Vec<String> = entries
                        .iter()
                        .map(|p| format!("{}:{} ({} wins)", p.id, p.name, p.wins))
                        .collect();
                    info!("Roster: [{}]", names.join(", "));
                }
                Notice::MapsChanged(maps) => info!("Available maps: {:?}", maps),
                Notice::SoundEnabledChanged(enabled) => info!("Sound enabled: {}", enabled),
                Notice::GameOver(standings) => {
                    info!("=== MATCH OVER ===");
                    for entry in standings {
                        info!("  {} - {} wins", entry.name, entry.wins);
                    }
                }
            }
        }
    });
}

/// The operator console: reads admin commands from stdin and forwards them
/// to the game task. Single letters and direction words drive the local
/// player.
fn spawn_console(events_tx: mpsc::UnboundedSender<GameEvent>, server_addr: String) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            let event = match line.as_str() {
                "start" => GameEvent::StartRound,
                "pause" => GameEvent::TogglePause,
                "stop" => GameEvent::StopGame,
                "local" => GameEvent::AddLocalPlayer,
                "kick-humans" => GameEvent::RemoveHumanPlayers,
                "sound on" => GameEvent::SetSoundEnabled(true),
                "sound off" => GameEvent::SetSoundEnabled(false),
                "maps" => {
                    println!("{}", arena::list_maps().join("\n"));
                    GameEvent::RefreshMaps
                }
                "addr" => {
                    println!("{}", server_addr);
                    continue;
                }
                other => {
                    if let Some(identifier) = other.strip_prefix("map ") {
                        GameEvent::LoadMap(identifier.trim().to_string())
                    } else if let Ok(command) = other.parse::<Command>() {
                        GameEvent::LocalCommand(command)
                    } else {
                        warn!("Unknown console command: {:?}", other);
                        continue;
                    }
                }
            };

            if events_tx.send(event).is_err() {
                break;
            }
        }
    });
}
