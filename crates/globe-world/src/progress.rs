//! Per-chunk resumable scrub state

use std::collections::{HashMap, HashSet};

use globe_core::{ChunkKey, CHUNK_COLUMNS};

/// Column cursors for chunks mid-scrub plus the set of finished chunks.
///
/// A key lives in at most one of the two collections. Cursors only move
/// forward and completion is permanent for the tracker's lifetime.
#[derive(Debug, Default, Clone)]
pub struct ChunkProgressTracker {
    cursors: HashMap<ChunkKey, u16>,
    completed: HashSet<ChunkKey>,
}

impl ChunkProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next column to process. 0 for a chunk never seen, 256 once completed.
    pub fn cursor_for(&self, key: ChunkKey) -> u16 {
        if self.completed.contains(&key) {
            return CHUNK_COLUMNS;
        }
        self.cursors.get(&key).copied().unwrap_or(0)
    }

    /// Record progress. Reaching 256 retires the chunk into the completed
    /// set; a cursor behind the stored one is ignored.
    pub fn advance(&mut self, key: ChunkKey, new_cursor: u16) {
        if self.completed.contains(&key) {
            return;
        }

        if new_cursor >= CHUNK_COLUMNS {
            self.cursors.remove(&key);
            self.completed.insert(key);
            return;
        }

        let cursor = self.cursors.entry(key).or_insert(0);
        *cursor = (*cursor).max(new_cursor);
    }

    pub fn is_completed(&self, key: ChunkKey) -> bool {
        self.completed.contains(&key)
    }

    pub fn in_progress(&self, key: ChunkKey) -> bool {
        self.cursors.contains_key(&key)
    }

    pub fn in_progress_count(&self) -> usize {
        self.cursors.len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }
}
