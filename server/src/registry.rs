//! Session registry tracking every client the server currently knows about
//!
//! This module holds the authoritative server-side view of connected clients:
//! - Session creation on first join and in-place updates on re-join
//! - Position updates from movement packets
//! - Point-in-time snapshots for the broadcast loop
//!
//! Sessions are keyed by the client's transport address, which is the only
//! identity the connectionless transport gives us. Usernames are display
//! strings and are not required to be unique. There is no session eviction:
//! a session persists until the server process shuts down.

use log::info;
use shared::{Position, SnapshotEntry};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

/// Server-side record of one connected client
#[derive(Debug, Clone)]
pub struct ClientSession {
    /// Transport address the client sends from; unique session key
    pub addr: SocketAddr,
    /// Display name announced in the join packet
    pub username: String,
    /// Last position accepted from a movement packet
    pub position: Position,
    /// Last time any packet was accepted from this client.
    /// Advisory only; nothing evicts stale sessions.
    pub last_seen: Instant,
}

impl ClientSession {
    pub fn new(addr: SocketAddr, username: String) -> Self {
        Self {
            addr,
            username,
            position: Position::ORIGIN,
            last_seen: Instant::now(),
        }
    }
}

/// Authoritative mapping of transport addresses to client sessions
///
/// The registry is mutated only by the server's receive loop and read by the
/// broadcast loop, so its operations never need to suspend mid-mutation.
/// [`SessionRegistry::snapshot`] hands out owned copies rather than views
/// into the live map, since the broadcast loop runs concurrently with
/// registry mutation.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SocketAddr, ClientSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Inserts a session for a new address or updates the username of an
    /// existing one. Always succeeds; a second join from the same address
    /// never creates a duplicate entry.
    pub fn upsert(&mut self, addr: SocketAddr, username: String) {
        match self.sessions.get_mut(&addr) {
            Some(session) => {
                info!("Client at {} re-joined as \"{}\"", addr, username);
                session.username = username;
                session.last_seen = Instant::now();
            }
            None => {
                info!("Client \"{}\" joined from {}", username, addr);
                self.sessions.insert(addr, ClientSession::new(addr, username));
            }
        }
    }

    /// Sets the position of an existing session.
    ///
    /// Returns false if the address has no session, leaving the registry
    /// unchanged; movement never creates a session implicitly. The caller
    /// decides whether the drop is worth logging.
    pub fn update_position(&mut self, addr: SocketAddr, position: Position) -> bool {
        if let Some(session) = self.sessions.get_mut(&addr) {
            session.position = position;
            session.last_seen = Instant::now();
            true
        } else {
            false
        }
    }

    /// Returns a point-in-time copy of every session as snapshot entries.
    ///
    /// One entry per session currently in the registry; iteration order is
    /// unspecified. The copy is owned, so the caller can encode and send it
    /// while the receive loop keeps mutating the registry.
    pub fn snapshot(&self) -> Vec<SnapshotEntry> {
        self.sessions
            .values()
            .map(|session| SnapshotEntry {
                username: session.username.clone(),
                position: session.position,
            })
            .collect()
    }

    /// Returns the transport addresses of all current sessions, for
    /// broadcast fan-out.
    pub fn addrs(&self) -> Vec<SocketAddr> {
        self.sessions.keys().copied().collect()
    }

    /// Looks up a single session by address.
    pub fn get(&self, addr: &SocketAddr) -> Option<&ClientSession> {
        self.sessions.get(addr)
    }

    /// Returns the number of currently known sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if no client has joined yet
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:9100".parse().unwrap()
    }

    fn test_addr2() -> SocketAddr {
        "127.0.0.1:9101".parse().unwrap()
    }

    #[test]
    fn test_session_creation() {
        let session = ClientSession::new(test_addr(), "alice".to_string());
        assert_eq!(session.addr, test_addr());
        assert_eq!(session.username, "alice");
        assert_eq!(session.position, Position::ORIGIN);
    }

    #[test]
    fn test_registry_starts_empty() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_upsert_creates_session() {
        let mut registry = SessionRegistry::new();
        registry.upsert(test_addr(), "alice".to_string());

        assert_eq!(registry.len(), 1);
        let session = registry.get(&test_addr()).unwrap();
        assert_eq!(session.username, "alice");
        assert_eq!(session.position, Position::ORIGIN);
    }

    #[test]
    fn test_upsert_same_addr_updates_username_in_place() {
        let mut registry = SessionRegistry::new();
        registry.upsert(test_addr(), "alice".to_string());
        registry.update_position(test_addr(), Position::new(3.0, 4.0));

        registry.upsert(test_addr(), "alice2".to_string());

        assert_eq!(registry.len(), 1);
        let session = registry.get(&test_addr()).unwrap();
        assert_eq!(session.username, "alice2");
        // Re-join keeps the last known position.
        assert_eq!(session.position, Position::new(3.0, 4.0));
    }

    #[test]
    fn test_update_position_on_existing_session() {
        let mut registry = SessionRegistry::new();
        registry.upsert(test_addr(), "alice".to_string());

        let accepted = registry.update_position(test_addr(), Position::new(3.0, 4.0));
        assert!(accepted);

        let entries = registry.snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].username, "alice");
        assert_eq!(entries[0].position, Position::new(3.0, 4.0));
    }

    #[test]
    fn test_update_position_unknown_addr_is_noop() {
        let mut registry = SessionRegistry::new();

        let accepted = registry.update_position(test_addr(), Position::new(1.0, 1.0));
        assert!(!accepted);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_contains_every_session_once() {
        let mut registry = SessionRegistry::new();
        registry.upsert(test_addr(), "alice".to_string());
        registry.upsert(test_addr2(), "bob".to_string());
        registry.update_position(test_addr2(), Position::new(5.0, 5.0));

        let entries = registry.snapshot();
        assert_eq!(entries.len(), 2);

        let alice: Vec<_> = entries.iter().filter(|e| e.username == "alice").collect();
        let bob: Vec<_> = entries.iter().filter(|e| e.username == "bob").collect();
        assert_eq!(alice.len(), 1);
        assert_eq!(bob.len(), 1);
        assert_eq!(alice[0].position, Position::ORIGIN);
        assert_eq!(bob[0].position, Position::new(5.0, 5.0));
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let mut registry = SessionRegistry::new();
        registry.upsert(test_addr(), "alice".to_string());

        let entries = registry.snapshot();
        registry.update_position(test_addr(), Position::new(9.0, 9.0));

        // The earlier snapshot still shows the position at the time it was taken.
        assert_eq!(entries[0].position, Position::ORIGIN);
    }

    #[test]
    fn test_addrs_lists_all_sessions() {
        let mut registry = SessionRegistry::new();
        registry.upsert(test_addr(), "alice".to_string());
        registry.upsert(test_addr2(), "bob".to_string());

        let mut addrs = registry.addrs();
        addrs.sort();
        let mut expected = vec![test_addr(), test_addr2()];
        expected.sort();
        assert_eq!(addrs, expected);
    }

    #[test]
    fn test_last_seen_refreshed_on_update() {
        let mut registry = SessionRegistry::new();
        registry.upsert(test_addr(), "alice".to_string());

        let before = registry.get(&test_addr()).unwrap().last_seen;
        std::thread::sleep(std::time::Duration::from_millis(2));
        registry.update_position(test_addr(), Position::new(1.0, 1.0));
        let after = registry.get(&test_addr()).unwrap().last_seen;

        assert!(after > before);
    }
}
