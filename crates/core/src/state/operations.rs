use crate::model::{ActivityInterval, Interval, IntervalRef, StageIntervalEntry, WorkflowError};

use super::WorkflowState;

/// Name of the stage an interval belongs to.
pub fn get_stage_name(interval: IntervalRef<'_>) -> &str {
    interval.stage_name()
}

/// Whether `interval` is the one currently open.
///
/// A stage interval is open when its stage and start time match the open
/// state. An activity interval additionally needs its activity among the
/// open activities. Sequence intervals are never opened.
pub fn is_interval_open(state: &WorkflowState, interval: IntervalRef<'_>) -> bool {
    let same_stage_and_time = state.open_interval_name.as_deref() == Some(interval.stage_name())
        && state.open_start_time() == Some(interval.start_time());
    match interval {
        IntervalRef::Stage(_) => same_stage_and_time,
        IntervalRef::Activity(activity) => {
            same_stage_and_time
                && state
                    .open_activity_names
                    .iter()
                    .any(|name| name == activity.interval_id.name())
        }
        IntervalRef::Sequence(_) => false,
    }
}

/// Activity intervals of the open stage interval that `username` has open.
///
/// `Ok(None)` when nothing matching is loaded. Errors when the open stage
/// carries automatic intervals, which can never hold activities.
pub fn current_activity_intervals<'a>(
    state: &WorkflowState,
    username: &str,
    stage_intervals: &'a [StageIntervalEntry],
) -> Result<Option<Vec<&'a ActivityInterval>>, WorkflowError> {
    let Some(open_stage_name) = state.open_interval_name.as_deref() else {
        return Ok(None);
    };
    let Some(entry) = stage_intervals.iter().find(|e| e.name == open_stage_name) else {
        return Ok(None);
    };
    if !entry.value.iter().all(|i| i.is_interactive_analysis()) {
        return Err(WorkflowError::NotInteractive(open_stage_name.to_string()));
    }
    let Some(open_interval) = entry.value.iter().find(|i| {
        Some(i.start_time()) == state.open_start_time() && i.stage_name() == open_stage_name
    }) else {
        return Ok(None);
    };
    let activities = open_interval.activity_intervals().unwrap_or_default();
    Ok(Some(
        activities
            .iter()
            .filter(|a| {
                state.open_activity_names.iter().any(|n| n == a.interval_id.name())
                    && a.active_analysts.iter().any(|u| u == username)
            })
            .collect(),
    ))
}
