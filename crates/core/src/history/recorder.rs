use uuid::Uuid;

use crate::data::{DataAction, DataState, EventRecord, Patch, SignalDetectionRecord};
use crate::scale::{epoch_seconds_now, to_utc};

use super::{ConflictStatus, HistoryItem, HistoryStatus};

/// Build the history entry for `action`, which turned `before` into `after`.
///
/// Returns `None` for actions that are not recorded and for actions that
/// changed nothing.
pub fn capture(action: &DataAction, before: &DataState, after: &DataState) -> Option<HistoryItem> {
    if !action.is_undoable() {
        return None;
    }
    let (patches, inverse_patches) = DataState::diff(before, after);
    if patches.is_empty() {
        tracing::debug!(action = action.name(), "zero state changes; nothing recorded");
        return None;
    }
    Some(HistoryItem {
        id: Uuid::new_v4(),
        action: action.name().to_string(),
        time: epoch_seconds_now(),
        label: label(action, before, after),
        description: describe(&patches),
        conflict_status: conflict_status(before, after),
        is_deletion: action.is_deletion(),
        is_rejection: action.is_rejection(),
        status: HistoryStatus::Applied,
        patches,
        inverse_patches,
    })
}

pub fn conflict_status(before: &DataState, after: &DataState) -> ConflictStatus {
    let (old, new) = (before.association_conflicts(), after.association_conflicts());
    if old == new {
        ConflictStatus::None
    } else if new.len() > old.len() || !new.is_subset(&old) {
        ConflictStatus::CreatedConflict
    } else {
        ConflictStatus::ResolvedConflict
    }
}

fn label(action: &DataAction, before: &DataState, after: &DataState) -> String {
    match action {
        DataAction::UpdateArrivalTime {
            signal_detection_ids,
            arrival_time,
        } => match single_sd(before, signal_detection_ids) {
            Some(sd) => format!(
                "{} arrival time changed from {} to {}",
                sd_name(sd),
                format_time(sd.arrival_time),
                format_time(*arrival_time)
            ),
            None => format!(
                "{} arrival time changed to {}",
                count_sds(signal_detection_ids.len()),
                format_time(*arrival_time)
            ),
        },
        DataAction::UpdatePhase {
            signal_detection_ids,
            phase,
        } => match single_sd(before, signal_detection_ids) {
            Some(sd) => format!("{} phase changed to {phase}", sd_name(sd)),
            None => format!(
                "{} phase changed to {phase}",
                count_sds(signal_detection_ids.len())
            ),
        },
        DataAction::CreateSignalDetection(sd) => {
            format!("{} created at {}", sd_name(sd), format_time(sd.arrival_time))
        }
        DataAction::DeleteSignalDetections {
            signal_detection_ids,
        } => match single_sd(before, signal_detection_ids) {
            Some(sd) => format!("{} deleted", sd_name(sd)),
            None => format!("{} deleted", count_sds(signal_detection_ids.len())),
        },
        DataAction::AssociateSignalDetections {
            event_id,
            signal_detection_ids,
        } => format!(
            "{} associated to {}",
            sds_name(before, signal_detection_ids),
            event_name(before.events.get(event_id), event_id)
        ),
        DataAction::UnassociateSignalDetections {
            event_id,
            signal_detection_ids,
        } => format!(
            "{} unassociated from {}",
            sds_name(before, signal_detection_ids),
            event_name(before.events.get(event_id), event_id)
        ),
        DataAction::CreateEvent { event_id, .. } => {
            format!("{} created", event_name(after.events.get(event_id), event_id))
        }
        DataAction::DuplicateEvents { event_ids } => match event_ids.as_slice() {
            [id] => format!(
                "{} created (duplicate)",
                event_name(before.events.get(id), id)
            ),
            _ => format!("{} events duplicated", event_ids.len()),
        },
        DataAction::RejectEvents { event_ids } => events_label(before, event_ids, "rejected"),
        DataAction::DeleteEvents { event_ids } => events_label(before, event_ids, "deleted"),
        DataAction::LoadEvents(_) | DataAction::LoadSignalDetections(_) => action.name().to_string(),
    }
}

fn describe(patches: &[Patch]) -> String {
    patches
        .iter()
        .map(|p| match p {
            Patch::Event { id, .. } => format!("event {id}"),
            Patch::SignalDetection { id, .. } => format!("signal detection {id}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn single_sd<'a>(state: &'a DataState, ids: &[String]) -> Option<&'a SignalDetectionRecord> {
    match ids {
        [id] => state.signal_detections.get(id),
        _ => None,
    }
}

fn sds_name(state: &DataState, ids: &[String]) -> String {
    single_sd(state, ids).map_or_else(|| count_sds(ids.len()), sd_name)
}

fn sd_name(sd: &SignalDetectionRecord) -> String {
    format!("{}-{}", sd.station, sd.phase)
}

fn count_sds(n: usize) -> String {
    if n == 1 {
        "1 signal detection".to_string()
    } else {
        format!("{n} signal detections")
    }
}

fn events_label(state: &DataState, ids: &[String], verb: &str) -> String {
    match ids {
        [id] => format!("{} {verb}", event_name(state.events.get(id), id)),
        _ => format!("{} events {verb}", ids.len()),
    }
}

fn event_name(event: Option<&EventRecord>, id: &str) -> String {
    match event {
        Some(e) => format!(
            "EV-{}",
            to_utc(e.time).map_or_else(|| e.time.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        ),
        None => format!("EV-{id}"),
    }
}

fn format_time(time_secs: f64) -> String {
    to_utc(time_secs).map_or_else(
        || time_secs.to_string(),
        |dt| dt.format("%H:%M:%S%.3f").to_string(),
    )
}
