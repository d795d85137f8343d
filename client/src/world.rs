//! Client-side cache of the most recently received world snapshot
//!
//! The receive loop writes here and the (external) presentation layer reads
//! from here; the two meet only through [`SharedWorldView`]. Snapshots are
//! replaced wholesale, never merged: with no sequence numbering on the wire,
//! last-writer-wins by arrival order is the strongest guarantee available.

use shared::SnapshotEntry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Handle shared between the network loop and the presentation layer.
pub type SharedWorldView = Arc<RwLock<WorldView>>;

/// The latest server-authoritative view of every player in the world
#[derive(Debug, Default)]
pub struct WorldView {
    entries: Vec<SnapshotEntry>,
}

impl WorldView {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Replaces the cached snapshot with a newly received one.
    ///
    /// Older entries are discarded entirely, including players absent from
    /// the new snapshot.
    pub fn replace(&mut self, entries: Vec<SnapshotEntry>) {
        self.entries = entries;
    }

    /// All players in the last received snapshot, in wire order.
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    /// Looks up a player by display name. Usernames are not required to be
    /// unique; this returns the first match.
    pub fn find(&self, username: &str) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|e| e.username == username)
    }

    /// Returns the number of players in the cached snapshot
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no snapshot has arrived yet (or the world is empty)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Position;

    fn entry(username: &str, x: f32, y: f32) -> SnapshotEntry {
        SnapshotEntry {
            username: username.to_string(),
            position: Position::new(x, y),
        }
    }

    #[test]
    fn test_world_view_starts_empty() {
        let view = WorldView::new();
        assert!(view.is_empty());
        assert_eq!(view.len(), 0);
        assert!(view.find("alice").is_none());
    }

    #[test]
    fn test_replace_installs_snapshot() {
        let mut view = WorldView::new();
        view.replace(vec![entry("alice", 0.0, 0.0), entry("bob", 5.0, 5.0)]);

        assert_eq!(view.len(), 2);
        assert_eq!(view.find("bob").unwrap().position, Position::new(5.0, 5.0));
    }

    #[test]
    fn test_replace_is_wholesale_not_a_merge() {
        let mut view = WorldView::new();
        view.replace(vec![entry("alice", 0.0, 0.0), entry("bob", 5.0, 5.0)]);

        // The next snapshot no longer contains bob; he must disappear
        // rather than linger from the previous snapshot.
        view.replace(vec![entry("alice", 1.0, 1.0)]);

        assert_eq!(view.len(), 1);
        assert!(view.find("bob").is_none());
        assert_eq!(
            view.find("alice").unwrap().position,
            Position::new(1.0, 1.0)
        );
    }

    #[test]
    fn test_replace_with_empty_snapshot_clears_world() {
        let mut view = WorldView::new();
        view.replace(vec![entry("alice", 0.0, 0.0)]);
        view.replace(Vec::new());
        assert!(view.is_empty());
    }
}
