//! Client network loop: periodic position sends plus snapshot receive
//!
//! Mirrors the server's two-loop split inside a single task. A
//! `tokio::select!` multiplexes awaiting an inbound datagram with a fixed
//! send interval, so neither activity blocks on the other and both share
//! the one connected socket. The local position is owned by the (external)
//! input layer through [`SharedPosition`]; this loop only reads and
//! transmits it.

use crate::world::{SharedWorldView, WorldView};
use log::{debug, error, info, warn};
use shared::{decode, encode, Packet, Position};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::RwLock;
use tokio::time::{interval, MissedTickBehavior};

const RECV_BUFFER_SIZE: usize = 2048;

/// Handle the input layer writes the local player position through.
pub type SharedPosition = Arc<RwLock<Position>>;

/// Client endpoint connected to one server
pub struct Client {
    socket: UdpSocket,
    server_addr: SocketAddr,
    username: String,
    position: SharedPosition,
    world: SharedWorldView,
    send_interval: Duration,
}

impl Client {
    /// Binds an ephemeral local socket for talking to `server_addr`.
    pub async fn new(
        server_addr: &str,
        username: &str,
        send_interval: Duration,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        let server_addr = server_addr.parse()?;

        Ok(Client {
            socket,
            server_addr,
            username: username.to_string(),
            position: Arc::new(RwLock::new(Position::ORIGIN)),
            world: Arc::new(RwLock::new(WorldView::new())),
            send_interval,
        })
    }

    /// Handle for the input layer to move the local player.
    pub fn position_handle(&self) -> SharedPosition {
        Arc::clone(&self.position)
    }

    /// Handle for the presentation layer to read the latest snapshot.
    pub fn world_handle(&self) -> SharedWorldView {
        Arc::clone(&self.world)
    }

    async fn send_packet(&self, packet: &Packet) -> Result<(), Box<dyn std::error::Error>> {
        let data = encode(packet)?;
        self.socket.send_to(&data, self.server_addr).await?;
        Ok(())
    }

    /// Announces this player to the server. Sent once per run; with no
    /// handshake beyond this, a lost join simply means the server ignores
    /// our moves until a future (re)connect.
    async fn join(&self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Joining {} as \"{}\"", self.server_addr, self.username);
        self.send_packet(&Packet::Join {
            username: self.username.clone(),
        })
        .await
    }

    /// Applies one inbound datagram to the world view.
    async fn process_datagram(world: &RwLock<WorldView>, bytes: &[u8]) {
        match decode(bytes) {
            Ok(Packet::Snapshot { entries }) => {
                // Wholesale replacement; there is no sequencing to tell a
                // late snapshot from a fresh one.
                world.write().await.replace(entries);
            }
            Ok(other) => {
                debug!("Ignoring server-bound packet: {:?}", other);
            }
            Err(e) => {
                warn!("Dropping malformed datagram: {}", e);
            }
        }
    }

    /// Runs the send and receive activities until the socket fails.
    ///
    /// Send failures are logged and non-fatal (the next interval retries
    /// with a fresher position anyway); a receive-path failure tears the
    /// whole loop down.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.join().await?;

        let mut send_interval = interval(self.send_interval);
        send_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut buffer = [0u8; RECV_BUFFER_SIZE];

        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buffer) => {
                    match result {
                        Ok((len, _)) => {
                            Self::process_datagram(&self.world, &buffer[..len]).await;
                        }
                        Err(e) => {
                            error!("Error receiving packet: {}", e);
                            return Err(e.into());
                        }
                    }
                },

                _ = send_interval.tick() => {
                    let position = *self.position.read().await;
                    let packet = Packet::Move { position };
                    if let Err(e) = self.send_packet(&packet).await {
                        warn!("Failed to send position update: {}", e);
                    }
                },
            }
        }
    }
}
