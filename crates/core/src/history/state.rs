use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::Patch;

use super::{HistoryError, HistoryItem, HistoryStack};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryMode {
    #[default]
    Global,
    Event,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryState {
    pub mode: HistoryMode,
    pub stack: HistoryStack,
    pub events: HashMap<String, HistoryStack>,
}

impl HistoryState {
    /// Switch to `mode`, or flip between the two when `None`.
    pub fn set_mode(&mut self, mode: Option<HistoryMode>) {
        self.mode = mode.unwrap_or(match self.mode {
            HistoryMode::Global => HistoryMode::Event,
            HistoryMode::Event => HistoryMode::Global,
        });
        tracing::debug!(mode = ?self.mode, "history mode");
    }

    /// Drop every stack and return to global mode.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn event_stack(&self, event_id: &str) -> Option<&HistoryStack> {
        self.events.get(event_id)
    }

    /// Record a committed change. In event mode with an event open the item
    /// goes on that event's stack; otherwise on the global stack.
    pub fn record(&mut self, item: HistoryItem, open_event_id: Option<&str>) {
        let target = match (self.mode, open_event_id) {
            (HistoryMode::Event, Some(event_id)) => {
                self.events.entry(event_id.to_string()).or_default()
            }
            _ => &mut self.stack,
        };
        tracing::debug!(
            id = %item.id,
            action = %item.action,
            label = %item.label,
            event = open_event_id,
            "history entry recorded"
        );
        target.push(item);
    }

    pub fn event_undo(&mut self, event_id: &str, count: usize) -> Result<Vec<Patch>, HistoryError> {
        Ok(self.event_stack_mut(event_id)?.undo(count))
    }

    pub fn event_redo(&mut self, event_id: &str, count: usize) -> Result<Vec<Patch>, HistoryError> {
        Ok(self.event_stack_mut(event_id)?.redo(count))
    }

    fn event_stack_mut(&mut self, event_id: &str) -> Result<&mut HistoryStack, HistoryError> {
        self.events
            .get_mut(event_id)
            .ok_or_else(|| HistoryError::UnknownEvent(event_id.to_string()))
    }
}
