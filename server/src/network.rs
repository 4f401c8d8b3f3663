//! UDP transport tasks bridging the socket and the single game task.
//!
//! The receiver task decodes datagrams and forwards them to the game task's
//! event queue; the sender task drains the outgoing queue onto the socket.
//! All game state stays confined to the game task, so packet handling never
//! races a tick resolution.

use bincode::{deserialize, serialize};
use log::{error, info, warn};
use shared::{Command, Packet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

/// Events delivered to the game task. Network traffic and operator commands
/// share one queue, drained between ticks on the same task, which is what
/// keeps membership changes out of in-progress resolutions without locks.
#[derive(Debug)]
pub enum GameEvent {
    PacketReceived { packet: Packet, addr: SocketAddr },
    LocalCommand(Command),
    AddLocalPlayer,
    RemoveHumanPlayers,
    LoadMap(String),
    RefreshMaps,
    StartRound,
    /// Queued by a finished round for the breather delay. Only honored while
    /// the game is still waiting between rounds; stale ones are dropped.
    ScheduledRestart,
    TogglePause,
    StopGame,
    SetSoundEnabled(bool),
    Shutdown,
}

/// Outgoing deliveries queued by the game task.
#[derive(Debug)]
pub enum NetMessage {
    Send { packet: Packet, addr: SocketAddr },
}

/// Binds the server socket.
pub async fn bind(addr: &str) -> std::io::Result<Arc<UdpSocket>> {
    let socket = UdpSocket::bind(addr).await?;
    info!("Server listening on {}", socket.local_addr()?);
    Ok(Arc::new(socket))
}

/// Spawns the task that continuously decodes incoming datagrams.
pub fn spawn_receiver(socket: Arc<UdpSocket>, events_tx: mpsc::UnboundedSender<GameEvent>) {
    tokio::spawn(async move {
        let mut buffer = [0u8; 2048];

        loop {
            match socket.recv_from(&mut buffer).await {
                Ok((len, addr)) => {
                    if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                        if events_tx
                            .send(GameEvent::PacketReceived { packet, addr })
                            .is_err()
                        {
                            // Game task is gone, nothing left to do
                            break;
                        }
                    } else {
                        warn!("Failed to deserialize packet from {}", addr);
                    }
                }
                Err(e) => {
                    error!("Error receiving packet: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    });
}

/// Spawns the task that drains the outgoing packet queue.
pub fn spawn_sender(socket: Arc<UdpSocket>, mut net_rx: mpsc::UnboundedReceiver<NetMessage>) {
    tokio::spawn(async move {
        while let Some(message) = net_rx.recv().await {
            match message {
                NetMessage::Send { packet, addr } => match serialize(&packet) {
                    Ok(data) => {
                        if let Err(e) = socket.send_to(&data, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    Err(e) => error!("Failed to serialize packet for {}: {}", addr, e),
                },
            }
        }
    });
}
