//! Headless exerciser client: joins a server, submits a scripted command
//! sequence, and prints every state update it receives.

use bincode::{deserialize, serialize};
use shared::{Command, Packet};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server_addr: SocketAddr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:54321".to_string())
        .parse()?;

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    println!("Client socket bound to {}", socket.local_addr()?);

    let join = Packet::Join {
        name: "test-client".to_string(),
    };
    println!("Joining server at {}", server_addr);
    socket.send_to(&serialize(&join)?, server_addr).await?;

    let mut buf = [0u8; 65536];
    let (len, _) = socket.recv_from(&mut buf).await?;
    match deserialize::<Packet>(&buf[0..len])? {
        Packet::Welcome { id } => println!("Joined with id {}", id),
        Packet::Rejected { reason } => {
            println!("Rejected: {}", reason);
            return Ok(());
        }
        other => println!("Unexpected packet: {:?}", other),
    }

    let script = [
        Command::Right,
        Command::Right,
        Command::Bomb,
        Command::Down,
        Command::Down,
        Command::Left,
    ];

    for command in script {
        println!("Sending command {:?}", command);
        socket
            .send_to(&serialize(&Packet::Command { command })?, server_addr)
            .await?;

        // Drain whatever state updates arrive before the next command
        while let Ok(Ok((len, _))) =
            timeout(Duration::from_millis(300), socket.recv_from(&mut buf)).await
        {
            match deserialize::<Packet>(&buf[0..len]) {
                Ok(Packet::State { you, others, arena }) => {
                    println!(
                        "State: you at {:?} on {:?}, {} other player(s), {} bomb(s)",
                        you.position,
                        arena.name,
                        others.len(),
                        arena.bombs.len()
                    );
                }
                Ok(Packet::EndOfRound) => println!("Round over"),
                Ok(other) => println!("Unexpected packet: {:?}", other),
                Err(e) => println!("Failed to deserialize packet: {}", e),
            }
        }

        // Keepalive between commands
        socket
            .send_to(&serialize(&Packet::Heartbeat)?, server_addr)
            .await?;
        sleep(Duration::from_millis(500)).await;
    }

    println!("Leaving");
    socket.send_to(&serialize(&Packet::Leave)?, server_addr).await?;

    Ok(())
}
