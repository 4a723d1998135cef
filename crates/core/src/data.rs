//! Normalized event and signal detection records, and the actions that
//! edit them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalDetectionRecord {
    pub id: String,
    pub station: String,
    pub phase: String,
    pub arrival_time: f64,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub time: f64,
    #[serde(default)]
    pub associated_signal_detection_ids: BTreeSet<String>,
    #[serde(default)]
    pub rejected: bool,
    #[serde(default)]
    pub deleted: bool,
}

impl EventRecord {
    pub fn new(id: impl Into<String>, time: f64) -> Self {
        Self {
            id: id.into(),
            time,
            associated_signal_detection_ids: BTreeSet::new(),
            rejected: false,
            deleted: false,
        }
    }

    /// Rejected and deleted events no longer take part in associations.
    pub fn is_live(&self) -> bool {
        !self.rejected && !self.deleted
    }
}

/// One key-level replacement in the data store. `None` removes the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Patch {
    Event {
        id: String,
        value: Option<EventRecord>,
    },
    SignalDetection {
        id: String,
        value: Option<SignalDetectionRecord>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataState {
    pub events: BTreeMap<String, EventRecord>,
    pub signal_detections: BTreeMap<String, SignalDetectionRecord>,
}

impl DataState {
    pub fn apply_patches(&mut self, patches: &[Patch]) {
        for patch in patches {
            match patch {
                Patch::Event { id, value: Some(v) } => {
                    self.events.insert(id.clone(), v.clone());
                }
                Patch::Event { id, value: None } => {
                    self.events.remove(id);
                }
                Patch::SignalDetection { id, value: Some(v) } => {
                    self.signal_detections.insert(id.clone(), v.clone());
                }
                Patch::SignalDetection { id, value: None } => {
                    self.signal_detections.remove(id);
                }
            }
        }
    }

    /// Patches that turn `before` into `after`, and the inverse patches that
    /// turn it back. Unchanged records produce nothing.
    pub fn diff(before: &DataState, after: &DataState) -> (Vec<Patch>, Vec<Patch>) {
        let mut patches = Vec::new();
        let mut inverse = Vec::new();
        for id in union_keys(&before.events, &after.events) {
            let (old, new) = (before.events.get(id), after.events.get(id));
            if old != new {
                patches.push(Patch::Event {
                    id: id.clone(),
                    value: new.cloned(),
                });
                inverse.push(Patch::Event {
                    id: id.clone(),
                    value: old.cloned(),
                });
            }
        }
        for id in union_keys(&before.signal_detections, &after.signal_detections) {
            let (old, new) = (before.signal_detections.get(id), after.signal_detections.get(id));
            if old != new {
                patches.push(Patch::SignalDetection {
                    id: id.clone(),
                    value: new.cloned(),
                });
                inverse.push(Patch::SignalDetection {
                    id: id.clone(),
                    value: old.cloned(),
                });
            }
        }
        (patches, inverse)
    }

    /// Live events associated to `signal_detection_id`, sorted by id.
    pub fn events_associated_to(&self, signal_detection_id: &str) -> Vec<&EventRecord> {
        self.events
            .values()
            .filter(|e| e.is_live() && e.associated_signal_detection_ids.contains(signal_detection_id))
            .collect()
    }

    /// Signal detections associated to more than one live event.
    pub fn association_conflicts(&self) -> BTreeSet<&str> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for event in self.events.values().filter(|e| e.is_live()) {
            for sd in &event.associated_signal_detection_ids {
                *counts.entry(sd.as_str()).or_default() += 1;
            }
        }
        counts.into_iter().filter(|&(_, n)| n > 1).map(|(id, _)| id).collect()
    }
}

fn union_keys<'a, V>(a: &'a BTreeMap<String, V>, b: &'a BTreeMap<String, V>) -> BTreeSet<&'a String> {
    a.keys().chain(b.keys()).collect()
}

/// Edits to the data store. Every variant except the `Load*` ones is
/// undoable and gets recorded in the history.
///
/// Hosts send these as `{"type": "rejectEvents", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum DataAction {
    UpdateArrivalTime {
        signal_detection_ids: Vec<String>,
        arrival_time: f64,
    },
    UpdatePhase {
        signal_detection_ids: Vec<String>,
        phase: String,
    },
    CreateSignalDetection(SignalDetectionRecord),
    DeleteSignalDetections {
        signal_detection_ids: Vec<String>,
    },
    AssociateSignalDetections {
        event_id: String,
        signal_detection_ids: Vec<String>,
    },
    UnassociateSignalDetections {
        event_id: String,
        signal_detection_ids: Vec<String>,
    },
    /// Create an event at `time` from the given (possibly empty) detections.
    CreateEvent {
        event_id: String,
        time: f64,
        signal_detection_ids: Vec<String>,
    },
    DuplicateEvents {
        event_ids: Vec<String>,
    },
    RejectEvents {
        event_ids: Vec<String>,
    },
    DeleteEvents {
        event_ids: Vec<String>,
    },
    /// Query results; replace records without touching history.
    LoadEvents(Vec<EventRecord>),
    LoadSignalDetections(Vec<SignalDetectionRecord>),
}

impl DataAction {
    pub fn name(&self) -> &'static str {
        match self {
            DataAction::UpdateArrivalTime { .. } => "data/updateArrivalTimeSignalDetection",
            DataAction::UpdatePhase { .. } => "data/updatePhaseSignalDetection",
            DataAction::CreateSignalDetection(_) => "data/createSignalDetection",
            DataAction::DeleteSignalDetections { .. } => "data/deleteSignalDetection",
            DataAction::AssociateSignalDetections { .. } => "data/associateSignalDetectionsToEvent",
            DataAction::UnassociateSignalDetections { .. } => "data/unassociateSignalDetectionsToEvent",
            DataAction::CreateEvent { .. } => "data/createEvent",
            DataAction::DuplicateEvents { .. } => "data/duplicateEvents",
            DataAction::RejectEvents { .. } => "data/rejectEvents",
            DataAction::DeleteEvents { .. } => "data/deleteEvents",
            DataAction::LoadEvents(_) => "data/loadEvents",
            DataAction::LoadSignalDetections(_) => "data/loadSignalDetections",
        }
    }

    pub fn is_undoable(&self) -> bool {
        !matches!(self, DataAction::LoadEvents(_) | DataAction::LoadSignalDetections(_))
    }

    pub fn is_deletion(&self) -> bool {
        matches!(
            self,
            DataAction::DeleteEvents { .. } | DataAction::DeleteSignalDetections { .. }
        )
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, DataAction::RejectEvents { .. })
    }

    /// Whether an undoable action names nothing to act on. Such a call is a
    /// caller bug and is refused rather than recorded as a no-op.
    pub fn is_missing_targets(&self) -> bool {
        match self {
            DataAction::UpdateArrivalTime { signal_detection_ids, .. }
            | DataAction::UpdatePhase { signal_detection_ids, .. }
            | DataAction::DeleteSignalDetections { signal_detection_ids } => {
                signal_detection_ids.is_empty()
            }
            DataAction::AssociateSignalDetections {
                event_id,
                signal_detection_ids,
            }
            | DataAction::UnassociateSignalDetections {
                event_id,
                signal_detection_ids,
            } => event_id.is_empty() || signal_detection_ids.is_empty(),
            DataAction::CreateSignalDetection(sd) => sd.id.is_empty(),
            DataAction::CreateEvent { event_id, .. } => event_id.is_empty(),
            DataAction::DuplicateEvents { event_ids }
            | DataAction::RejectEvents { event_ids }
            | DataAction::DeleteEvents { event_ids } => event_ids.is_empty(),
            DataAction::LoadEvents(_) | DataAction::LoadSignalDetections(_) => false,
        }
    }

    /// Reduce this action into `state`. Unknown ids are skipped.
    pub fn apply(&self, state: &mut DataState) {
        match self {
            DataAction::UpdateArrivalTime {
                signal_detection_ids,
                arrival_time,
            } => {
                for sd in signal_detections_mut(state, signal_detection_ids) {
                    sd.arrival_time = *arrival_time;
                }
            }
            DataAction::UpdatePhase {
                signal_detection_ids,
                phase,
            } => {
                for sd in signal_detections_mut(state, signal_detection_ids) {
                    sd.phase.clone_from(phase);
                }
            }
            DataAction::CreateSignalDetection(sd) => {
                state.signal_detections.insert(sd.id.clone(), sd.clone());
            }
            DataAction::DeleteSignalDetections {
                signal_detection_ids,
            } => {
                for sd in signal_detections_mut(state, signal_detection_ids) {
                    sd.deleted = true;
                }
            }
            DataAction::AssociateSignalDetections {
                event_id,
                signal_detection_ids,
            } => {
                if let Some(event) = state.events.get_mut(event_id) {
                    event
                        .associated_signal_detection_ids
                        .extend(signal_detection_ids.iter().cloned());
                }
            }
            DataAction::UnassociateSignalDetections {
                event_id,
                signal_detection_ids,
            } => {
                if let Some(event) = state.events.get_mut(event_id) {
                    for id in signal_detection_ids {
                        event.associated_signal_detection_ids.remove(id);
                    }
                }
            }
            DataAction::CreateEvent {
                event_id,
                time,
                signal_detection_ids,
            } => {
                let mut event = EventRecord::new(event_id.clone(), *time);
                event
                    .associated_signal_detection_ids
                    .extend(signal_detection_ids.iter().cloned());
                state.events.insert(event_id.clone(), event);
            }
            DataAction::DuplicateEvents { event_ids } => {
                let copies: Vec<EventRecord> = event_ids
                    .iter()
                    .filter_map(|id| state.events.get(id))
                    .map(|original| EventRecord {
                        id: Uuid::new_v4().to_string(),
                        ..original.clone()
                    })
                    .collect();
                for copy in copies {
                    state.events.insert(copy.id.clone(), copy);
                }
            }
            DataAction::RejectEvents { event_ids } => {
                for id in event_ids {
                    if let Some(event) = state.events.get_mut(id) {
                        event.rejected = true;
                    }
                }
            }
            DataAction::DeleteEvents { event_ids } => {
                for id in event_ids {
                    if let Some(event) = state.events.get_mut(id) {
                        event.deleted = true;
                    }
                }
            }
            DataAction::LoadEvents(events) => {
                for event in events {
                    state.events.insert(event.id.clone(), event.clone());
                }
            }
            DataAction::LoadSignalDetections(sds) => {
                for sd in sds {
                    state.signal_detections.insert(sd.id.clone(), sd.clone());
                }
            }
        }
    }
}

fn signal_detections_mut<'a>(
    state: &'a mut DataState,
    ids: &'a [String],
) -> impl Iterator<Item = &'a mut SignalDetectionRecord> {
    state
        .signal_detections
        .iter_mut()
        .filter(move |(id, _)| ids.contains(*id))
        .map(|(_, sd)| sd)
}
