//! # Position-Synchronization Server Library
//!
//! This library implements the server side of the real-time multiplayer
//! position-synchronization service. It accepts datagrams from any number
//! of clients over UDP, tracks each client's identity and last reported
//! position, and periodically broadcasts the combined world state back to
//! every known client.
//!
//! ## Architecture
//!
//! ### Two cooperating loops
//! The server's work is split across two independently scheduled tokio
//! tasks sharing one bound socket:
//!
//! - **Receive loop** — awaits inbound datagrams, decodes them, and applies
//!   join and move packets to the session registry. This is the only code
//!   path that mutates the registry.
//! - **Tick/broadcast loop** — on a fixed configurable tick, takes a
//!   point-in-time snapshot of the registry, encodes it once, and sends it
//!   to every session's address, including the originator of each position.
//!
//! Neither loop ever blocks waiting on the other; they coordinate solely
//! through the shared registry. Both run under one supervising scope in
//! [`network::Server::run`], so a fatal failure in either cancels its
//! sibling and releases the socket.
//!
//! ### Tolerating an unreliable transport
//! UDP gives no delivery, ordering, or de-duplication guarantees, and the
//! server does not try to add any. Lost moves mean stale positions until
//! the next one arrives; duplicated or reordered packets are applied as
//! they come. Malformed or unexpected datagrams are dropped with a log
//! line and never terminate the process.
//!
//! ## Module Organization
//!
//! - [`registry`] — [`registry::SessionRegistry`], the authoritative map of
//!   transport addresses to sessions, plus snapshotting for broadcasts.
//! - [`network`] — [`network::Server`], socket ownership and both loops.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Bind to the default address and broadcast 20 times per second.
//!     let mut server = Server::new("127.0.0.1:12345", Duration::from_millis(50)).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod network;
pub mod registry;
