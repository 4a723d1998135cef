use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::Patch;

use super::HistoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HistoryStatus {
    Applied,
    NotApplied,
}

/// Whether the recorded change created or resolved a signal detection
/// associated to more than one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictStatus {
    CreatedConflict,
    ResolvedConflict,
    None,
}

/// One undoable change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: Uuid,
    /// Action name that produced the change.
    pub action: String,
    /// Epoch seconds when the change was recorded.
    pub time: f64,
    pub label: String,
    pub description: String,
    pub patches: Vec<Patch>,
    pub inverse_patches: Vec<Patch>,
    pub status: HistoryStatus,
    pub conflict_status: ConflictStatus,
    pub is_deletion: bool,
    pub is_rejection: bool,
}

/// An ordered log of changes with a cursor.
///
/// Items `0..=position` are applied and the rest are not. `position` is
/// `-1` when nothing is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStack {
    items: Vec<HistoryItem>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self) -> isize {
        self.items
            .iter()
            .rposition(|i| i.status == HistoryStatus::Applied)
            .map_or(-1, |p| p as isize)
    }

    pub fn can_undo(&self) -> bool {
        self.position() > -1
    }

    pub fn can_redo(&self) -> bool {
        self.position() < self.len() as isize - 1
    }

    /// Append an applied item. Anything past the cursor can no longer be
    /// redone and is dropped first.
    pub fn push(&mut self, mut item: HistoryItem) {
        let keep = (self.position() + 1) as usize;
        if keep < self.items.len() {
            tracing::debug!(dropped = self.items.len() - keep, "dropping redo tail");
            self.items.truncate(keep);
        }
        item.status = HistoryStatus::Applied;
        self.items.push(item);
    }

    /// Step back `count` items (stopping at `-1`) and return the inverse
    /// patches to replay, newest first.
    pub fn undo(&mut self, count: usize) -> Vec<Patch> {
        let from = self.position();
        let to = from.saturating_sub_unsigned(count).max(-1);
        let mut patches = Vec::new();
        let mut i = from;
        while i > to {
            let item = &mut self.items[i as usize];
            item.status = HistoryStatus::NotApplied;
            patches.extend(item.inverse_patches.iter().cloned());
            i -= 1;
        }
        tracing::debug!(from, to, "undo");
        patches
    }

    /// Step forward `count` items (stopping at the newest) and return the
    /// patches to replay, oldest first.
    pub fn redo(&mut self, count: usize) -> Vec<Patch> {
        let from = self.position();
        let to = from
            .saturating_add_unsigned(count)
            .min(self.len() as isize - 1);
        let mut patches = Vec::new();
        for i in (from + 1)..=to {
            let item = &mut self.items[i as usize];
            item.status = HistoryStatus::Applied;
            patches.extend(item.patches.iter().cloned());
        }
        tracing::debug!(from, to, "redo");
        patches
    }

    /// Undo back to just before item `id`. Already-undone items are left
    /// alone.
    pub fn undo_by_id(&mut self, id: Uuid) -> Result<Vec<Patch>, HistoryError> {
        let index = self.index_of(id)? as isize;
        let position = self.position();
        if index > position {
            return Ok(Vec::new());
        }
        Ok(self.undo((position - index + 1) as usize))
    }

    /// Redo forward through item `id`. Already-applied items are left alone.
    pub fn redo_by_id(&mut self, id: Uuid) -> Result<Vec<Patch>, HistoryError> {
        let index = self.index_of(id)? as isize;
        let position = self.position();
        if index <= position {
            return Ok(Vec::new());
        }
        Ok(self.redo((index - position) as usize))
    }

    fn index_of(&self, id: Uuid) -> Result<usize, HistoryError> {
        self.items
            .iter()
            .position(|i| i.id == id)
            .ok_or(HistoryError::EntryNotFound(id))
    }
}
