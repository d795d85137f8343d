//! Server network layer running the receive and tick/broadcast loops
//!
//! One UDP socket is shared by two tokio tasks: the receive loop, which
//! decodes inbound datagrams and mutates the session registry, and the
//! broadcast loop, which on a fixed tick reads the registry and fans a
//! world snapshot out to every known client. The registry is the only
//! state the two loops share, behind an `Arc<RwLock>`; the receive loop is
//! the sole writer.
//!
//! Per-packet failures (malformed bytes, moves from unknown addresses) are
//! dropped and logged, never propagated. Only socket-level failures on the
//! receive path are fatal, in which case the sibling loop is cancelled and
//! the socket released.

use crate::registry::SessionRegistry;
use log::{debug, error, info, warn};
use shared::{decode, encode, Packet};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::RwLock;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval, MissedTickBehavior};

/// Datagrams larger than this cannot be a packet we produce.
const RECV_BUFFER_SIZE: usize = 2048;

/// Main server owning the socket, the session registry, and the two loops
pub struct Server {
    socket: Arc<UdpSocket>,
    registry: Arc<RwLock<SessionRegistry>>,
    tick_duration: Duration,
}

impl Server {
    /// Binds the server socket. A bind failure is surfaced to the operator;
    /// there is no point running either loop without the socket.
    pub async fn new(
        addr: &str,
        tick_duration: Duration,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        Ok(Server {
            socket,
            registry: Arc::new(RwLock::new(SessionRegistry::new())),
            tick_duration,
        })
    }

    /// The address the socket actually bound to (useful when binding port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Handle to the session registry, shared with the spawned loops.
    pub fn registry(&self) -> Arc<RwLock<SessionRegistry>> {
        Arc::clone(&self.registry)
    }

    /// Runs both loops until one of them fails or Ctrl+C arrives.
    ///
    /// The loops are supervised together: whichever exits first causes the
    /// sibling to be aborted, so a dead receive loop never leaves an
    /// orphaned broadcast loop running against a stale registry.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut receive_task = self.spawn_receive_loop();
        let mut broadcast_task = self.spawn_broadcast_loop();

        info!(
            "Server started ({}ms tick)",
            self.tick_duration.as_millis()
        );

        tokio::select! {
            res = &mut receive_task => {
                broadcast_task.abort();
                Self::loop_outcome("receive loop", res)
            }
            res = &mut broadcast_task => {
                receive_task.abort();
                Self::loop_outcome("broadcast loop", res)
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Server shutting down");
                receive_task.abort();
                broadcast_task.abort();
                Ok(())
            }
        }
    }

    fn loop_outcome(
        name: &str,
        res: Result<io::Result<()>, JoinError>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match res {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("{} failed: {}", name, e).into()),
            Err(e) => Err(format!("{} panicked: {}", name, e).into()),
        }
    }

    fn spawn_receive_loop(&self) -> JoinHandle<io::Result<()>> {
        let socket = Arc::clone(&self.socket);
        let registry = Arc::clone(&self.registry);
        tokio::spawn(Self::receive_loop(socket, registry))
    }

    fn spawn_broadcast_loop(&self) -> JoinHandle<io::Result<()>> {
        let socket = Arc::clone(&self.socket);
        let registry = Arc::clone(&self.registry);
        tokio::spawn(Self::broadcast_loop(socket, registry, self.tick_duration))
    }

    /// Consumes inbound datagrams for the lifetime of the server.
    ///
    /// A socket-level receive failure is fatal; everything below that is
    /// handled by dropping the offending datagram and carrying on.
    async fn receive_loop(
        socket: Arc<UdpSocket>,
        registry: Arc<RwLock<SessionRegistry>>,
    ) -> io::Result<()> {
        let mut buffer = [0u8; RECV_BUFFER_SIZE];

        loop {
            let (len, addr) = socket.recv_from(&mut buffer).await.map_err(|e| {
                error!("Error receiving packet: {}", e);
                e
            })?;

            Self::process_datagram(&registry, &buffer[..len], addr).await;
        }
    }

    /// Decodes one datagram and applies it to the registry.
    async fn process_datagram(
        registry: &RwLock<SessionRegistry>,
        bytes: &[u8],
        addr: SocketAddr,
    ) {
        match decode(bytes) {
            Ok(Packet::Join { username }) => {
                registry.write().await.upsert(addr, username);
            }
            Ok(Packet::Move { position }) => {
                // No implicit join: movement from an unknown address is dropped.
                if !registry.write().await.update_position(addr, position) {
                    warn!("Dropping move from {} with no session", addr);
                }
            }
            Ok(Packet::Snapshot { .. }) => {
                // Client-bound variant; a well-behaved client never sends this.
                debug!("Ignoring snapshot packet from {}", addr);
            }
            Err(e) => {
                warn!("Dropping malformed datagram from {}: {}", addr, e);
            }
        }
    }

    /// Broadcasts the world snapshot to every known client on a fixed tick.
    ///
    /// Sends are independent per recipient: one refused delivery neither
    /// aborts the rest of the broadcast nor removes the session.
    async fn broadcast_loop(
        socket: Arc<UdpSocket>,
        registry: Arc<RwLock<SessionRegistry>>,
        tick_duration: Duration,
    ) -> io::Result<()> {
        let mut ticker = interval(tick_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let (entries, addrs) = {
                let registry = registry.read().await;
                (registry.snapshot(), registry.addrs())
            };

            if addrs.is_empty() {
                continue;
            }

            let packet = Packet::Snapshot { entries };
            let data = match encode(&packet) {
                Ok(data) => data,
                Err(e) => {
                    // Internally built packets should always encode; treat
                    // this as a bug signal and skip the tick.
                    error!("Failed to encode snapshot: {}", e);
                    continue;
                }
            };

            for addr in addrs {
                if let Err(e) = socket.send_to(&data, addr).await {
                    warn!("Failed to send snapshot to {}: {}", addr, e);
                }
            }
        }
    }
}
