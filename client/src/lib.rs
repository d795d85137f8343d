//! # Position-Synchronization Client Library
//!
//! Client side of the real-time multiplayer position-synchronization
//! service. The client announces itself to the server with a join packet,
//! then runs two cooperating activities over one UDP socket:
//!
//! - **Send loop** — on a fixed interval, reads the locally tracked player
//!   position and transmits it as a move packet.
//! - **Receive loop** — consumes world snapshots from the server and
//!   replaces the local world-view cache wholesale with each one.
//!
//! Both activities live in a single task multiplexed with `tokio::select!`,
//! so they never block each other and suspend only at I/O boundaries.
//!
//! ## Interface boundaries
//!
//! Input capture and rendering are deliberately outside this crate. They
//! attach through two shared handles:
//!
//! - [`network::SharedPosition`] — the input layer writes the local
//!   player's position here; the send loop only reads it.
//! - [`world::SharedWorldView`] — the receive loop writes the latest
//!   snapshot here; the renderer only reads it.
//!
//! Because the transport offers no ordering or delivery guarantees, the
//! world view is last-writer-wins by arrival order: a late or duplicated
//! snapshot shows up as momentary jitter, not an error.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::new("127.0.0.1:12345", "alice", Duration::from_millis(50)).await?;
//!     let position = client.position_handle(); // written by the input layer
//!     let world = client.world_handle();       // read by the renderer
//!     client.run().await?;
//!     Ok(())
//! }
//! ```

pub mod network;
pub mod world;
