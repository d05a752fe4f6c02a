//! Two-tier queue
//!
//! ```text
//! Priority queue (play next, consumed as it plays):
//!   - Song B
//!   - Song C
//! ─────────────────────────────
//! Primary queue (from the active scope, navigated by index):
//!   - Song D
//!   - Song E   <- index
//!   - Song F
//! ```

use crate::error::{PlaybackError, Result};
use cadence_core::SongId;
use serde::{Deserialize, Serialize};

/// Which tier of the queue an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueKind {
    Primary,
    Priority,
}

/// Primary and priority queues plus the primary index
///
/// The index always lies inside the primary queue, or is 0 when the
/// primary queue is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayQueue {
    primary: Vec<SongId>,
    priority: Vec<SongId>,
    index: usize,
}

fn out_of_bounds(index: usize, len: usize) -> PlaybackError {
    PlaybackError::IndexOutOfBounds { index, len }
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored parts, clamping the index into bounds
    pub fn from_parts(primary: Vec<SongId>, priority: Vec<SongId>, index: usize) -> Self {
        let mut queue = Self {
            primary,
            priority,
            index,
        };
        queue.clamp_index();
        queue
    }

    pub fn primary(&self) -> &[SongId] {
        &self.primary
    }

    pub fn priority(&self) -> &[SongId] {
        &self.priority
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self, kind: QueueKind) -> usize {
        self.tier(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.priority.is_empty()
    }

    /// Song at the primary index
    pub fn current(&self) -> Option<SongId> {
        self.primary.get(self.index).copied()
    }

    pub fn position_of(&self, id: SongId) -> Option<usize> {
        self.primary.iter().position(|&song| song == id)
    }

    /// Replace the primary queue
    pub fn set_primary(&mut self, songs: Vec<SongId>, index: usize) {
        self.primary = songs;
        self.index = index;
        self.clamp_index();
    }

    /// Move the index, rejecting positions outside the primary queue
    pub fn set_index(&mut self, index: usize) -> Result<()> {
        if index >= self.primary.len() {
            return Err(out_of_bounds(index, self.primary.len()));
        }
        self.index = index;
        Ok(())
    }

    /// Step the index forward
    ///
    /// Returns `true` when the step ran past the end and wrapped to 0.
    pub fn step_forward(&mut self) -> bool {
        if self.index + 1 >= self.primary.len() {
            self.index = 0;
            true
        } else {
            self.index += 1;
            false
        }
    }

    /// Step the index back, stopping at 0
    pub fn step_back(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    // ===== Priority queue =====

    pub fn push_priority(&mut self, id: SongId) {
        self.priority.push(id);
    }

    pub fn extend_priority(&mut self, ids: impl IntoIterator<Item = SongId>) {
        self.priority.extend(ids);
    }

    /// Take the head of the priority queue
    pub fn pop_priority(&mut self) -> Option<SongId> {
        if self.priority.is_empty() {
            None
        } else {
            Some(self.priority.remove(0))
        }
    }

    pub fn clear_priority(&mut self) {
        self.priority.clear();
    }

    // ===== Editing =====

    /// Insert `id` so that it ends up at position `at` (`at <= len`)
    pub fn insert(&mut self, kind: QueueKind, at: usize, id: SongId) -> Result<()> {
        let len = self.len(kind);
        if at > len {
            return Err(out_of_bounds(at, len));
        }
        self.tier_mut(kind).insert(at, id);

        if kind == QueueKind::Primary && len > 0 && at <= self.index {
            self.index += 1;
        }
        Ok(())
    }

    /// Remove the item at `at`
    ///
    /// Removing before the index shifts it back onto the same song; removing
    /// the indexed song leaves the index on the same slot.
    pub fn remove(&mut self, kind: QueueKind, at: usize) -> Result<SongId> {
        let len = self.len(kind);
        if at >= len {
            return Err(out_of_bounds(at, len));
        }
        let removed = self.tier_mut(kind).remove(at);

        if kind == QueueKind::Primary {
            if at < self.index {
                self.index -= 1;
            }
            self.clamp_index();
        }
        Ok(removed)
    }

    /// Move the item at `from` so it ends up at `to`
    ///
    /// The index follows the song it pointed at.
    pub fn move_item(&mut self, kind: QueueKind, from: usize, to: usize) -> Result<()> {
        let len = self.len(kind);
        if from >= len {
            return Err(out_of_bounds(from, len));
        }
        if to >= len {
            return Err(out_of_bounds(to, len));
        }
        if from == to {
            return Ok(());
        }

        let tier = self.tier_mut(kind);
        let id = tier.remove(from);
        tier.insert(to, id);

        if kind == QueueKind::Primary {
            let index = self.index;
            if from == index {
                self.index = to;
            } else if from < index && to >= index {
                self.index -= 1;
            } else if from > index && to <= index {
                self.index += 1;
            }
        }
        Ok(())
    }

    /// Drop every song not accepted by `keep`, in both tiers
    ///
    /// The index stays on its song when that song survives.
    pub fn retain(&mut self, mut keep: impl FnMut(SongId) -> bool) {
        let current = self.current();
        self.primary.retain(|&id| keep(id));
        self.priority.retain(|&id| keep(id));
        if let Some(pos) = current.and_then(|id| self.position_of(id)) {
            self.index = pos;
        }
        self.clamp_index();
    }

    fn clamp_index(&mut self) {
        if self.index >= self.primary.len() {
            self.index = self.primary.len().saturating_sub(1);
        }
    }

    fn tier(&self, kind: QueueKind) -> &Vec<SongId> {
        match kind {
            QueueKind::Primary => &self.primary,
            QueueKind::Priority => &self.priority,
        }
    }

    fn tier_mut(&mut self, kind: QueueKind) -> &mut Vec<SongId> {
        match kind {
            QueueKind::Primary => &mut self.primary,
            QueueKind::Priority => &mut self.priority,
        }
    }
}
