//! Wire protocol and shared types for the position-synchronization service.
//!
//! Both the server and the client depend on this crate for the packet
//! definitions and the encode/decode contract. Each UDP datagram carries
//! exactly one [`Packet`] encoded as a self-describing JSON object with a
//! `type` discriminator field:
//!
//! - `{"type": "join", "username": "alice"}`
//! - `{"type": "move", "position": {"x": 3.0, "y": 4.0}}`
//! - `{"type": "snapshot", "entries": [{"username": ..., "position": ...}]}`
//!
//! The field names and the `type` tag are the stable contract; the byte
//! encoding behind [`encode`]/[`decode`] is an implementation detail and can
//! be swapped without touching the server or client loops.
//!
//! Decoding arbitrary or hostile bytes must never panic: malformed payloads
//! and unrecognized tags surface as [`DecodeError`], which callers recover
//! from by dropping the datagram.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default server bind/connect address.
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 12345;

pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 600.0;
pub const PLAYER_RADIUS: f32 = 20.0;

/// A 2D coordinate in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite (not NaN or infinite).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Wrap the position into the world bounds, toroidally.
    pub fn wrapped(&self) -> Position {
        Position {
            x: self.x.rem_euclid(WORLD_WIDTH),
            y: self.y.rem_euclid(WORLD_HEIGHT),
        }
    }
}

/// One player's entry in a world snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub username: String,
    pub position: Position,
}

/// The messages exchanged between client and server.
///
/// `Join` and `Move` are client-to-server; `Snapshot` is server-to-client.
/// A peer receiving a variant bound for the other direction drops it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Packet {
    Join { username: String },
    Move { position: Position },
    Snapshot { entries: Vec<SnapshotEntry> },
}

/// Failure to serialize an in-memory packet.
///
/// Should not occur for internally constructed packets; callers treat it as
/// a programming-error signal rather than a recoverable network condition.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("non-finite coordinate ({x}, {y}) cannot be encoded")]
    NonFiniteCoordinate { x: f32, y: f32 },
    #[error("failed to serialize packet: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure to parse an inbound datagram as a known packet.
///
/// Covers both structurally invalid bytes and unrecognized `type` tags.
/// Always recoverable: the datagram is dropped and the loop continues.
#[derive(Debug, Error)]
#[error("malformed or unrecognized datagram: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Encodes a packet into the bytes of one datagram.
pub fn encode(packet: &Packet) -> Result<Vec<u8>, EncodeError> {
    for position in packet_positions(packet) {
        if !position.is_finite() {
            return Err(EncodeError::NonFiniteCoordinate {
                x: position.x,
                y: position.y,
            });
        }
    }
    Ok(serde_json::to_vec(packet)?)
}

/// Decodes the bytes of one datagram into a packet.
pub fn decode(bytes: &[u8]) -> Result<Packet, DecodeError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn packet_positions(packet: &Packet) -> Vec<&Position> {
    match packet {
        Packet::Join { .. } => Vec::new(),
        Packet::Move { position } => vec![position],
        Packet::Snapshot { entries } => entries.iter().map(|e| &e.position).collect(),
    }
}
