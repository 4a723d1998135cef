//! Pure classification of workflow intervals.
//!
//! Every function here is total: absent or mismatched data yields `None`,
//! `0.0` or an empty string rather than an error.

use crate::model::{
    Interval, IntervalRef, IntervalStatus, Stage, StageInterval, StageIntervalEntry, StageMode,
    TimeRange, Workflow,
};
use crate::state::{WorkflowState, is_interval_open};

/// Automatic network intervals are five-minute chunks; anything longer is
/// a long-running automatic stage.
pub const PERCENT_BAR_MIN_DURATION_SECS: f64 = 300.0;

/// Whether a stage interval renders as a continuous percent bar instead of a
/// discrete cell: longer than five minutes, not interactive, and in progress.
pub fn is_stage_interval_percent_bar(interval: &StageInterval) -> bool {
    interval.duration() > PERCENT_BAR_MIN_DURATION_SECS
        && interval.stage_mode != StageMode::Interactive
        && interval.status == IntervalStatus::InProgress
}

/// Percent complete in `[0, 100]`.
///
/// For an automatic stage interval this is the position of the first
/// sequence interval's last executed step within the first sequence
/// definition of the matching stage. Only the first sequence is consulted.
pub fn get_percent_complete(interval: IntervalRef<'_>, workflow: &Workflow) -> f64 {
    match interval {
        IntervalRef::Stage(stage_interval) => {
            let Some(first) = stage_interval.sequence_intervals().and_then(<[_]>::first) else {
                return 0.0;
            };
            let Some(stage) = workflow
                .stage(stage_interval.stage_name())
                .and_then(Stage::as_automatic)
            else {
                return 0.0;
            };
            let Some(sequence) = stage.sequences.first() else {
                return 0.0;
            };
            sequence
                .steps
                .iter()
                .position(|step| step.name == first.last_executed_step_name)
                .map_or(0.0, |index| index as f64 / sequence.steps.len() as f64 * 100.0)
        }
        IntervalRef::Sequence(sequence_interval) => sequence_interval.percent_complete,
        IntervalRef::Activity(_) => 0.0,
    }
}

/// Display text for an interval cell.
///
/// Not-started and not-complete cells stay blank: only a completed interval
/// can be attributed, and then only to the first analyst.
pub fn determine_text_for_cell(status: IntervalStatus, active_analysts: &[String]) -> String {
    let Some(first) = active_analysts.first() else {
        return String::new();
    };
    match status {
        IntervalStatus::NotStarted | IntervalStatus::NotComplete => String::new(),
        IntervalStatus::Complete => first.clone(),
        _ if active_analysts.len() > 1 => format!("{first} + {}", active_analysts.len() - 1),
        _ => first.clone(),
    }
}

/// De-duplicated union, in first-seen order, of the analysts active on any
/// activity of an interactive stage interval. `None` for any other shape.
pub fn get_active_analysts_rollup(interval: IntervalRef<'_>) -> Option<Vec<String>> {
    let IntervalRef::Stage(stage_interval) = interval else {
        return None;
    };
    let activities = stage_interval.activity_intervals()?;
    let mut rollup: Vec<String> = Vec::new();
    for analyst in activities.iter().flat_map(|a| a.active_analysts.iter()) {
        if !rollup.contains(analyst) {
            rollup.push(analyst.clone());
        }
    }
    Some(rollup)
}

/// Latest interval by start time; ties keep the first encountered.
pub fn get_latest_interval<'a, T, I>(intervals: I) -> Option<&'a T>
where
    T: Interval + 'a,
    I: IntoIterator<Item = &'a T>,
{
    intervals.into_iter().fold(None, |best, candidate| match best {
        Some(b) if candidate.start_time() <= b.start_time() => Some(b),
        _ => Some(candidate),
    })
}

/// Earliest interval by start time; ties keep the first encountered.
pub fn get_earliest_interval<'a, T, I>(intervals: I) -> Option<&'a T>
where
    T: Interval + 'a,
    I: IntoIterator<Item = &'a T>,
{
    intervals.into_iter().fold(None, |best, candidate| match best {
        Some(b) if candidate.start_time() >= b.start_time() => Some(b),
        _ => Some(candidate),
    })
}

/// Pick the interval to open automatically for `username`.
///
/// Among incomplete interactive intervals: the earliest one the user is
/// already working on, else the earliest not started / not complete one,
/// else the latest.
pub fn get_best_interval<'a>(
    stage_intervals: &'a [StageInterval],
    username: &str,
) -> Option<&'a StageInterval> {
    let candidates: Vec<&StageInterval> = stage_intervals
        .iter()
        .filter(|i| i.stage_mode == StageMode::Interactive && i.status != IntervalStatus::Complete)
        .collect();

    let mine = candidates.iter().copied().filter(|i| {
        get_active_analysts_rollup(IntervalRef::Stage(i))
            .is_some_and(|rollup| rollup.iter().any(|a| a == username))
    });
    if let Some(best) = get_earliest_interval(mine) {
        return Some(best);
    }

    let open_for_work = candidates.iter().copied().filter(|i| {
        matches!(
            i.status,
            IntervalStatus::NotStarted | IntervalStatus::NotComplete
        )
    });
    if let Some(best) = get_earliest_interval(open_for_work) {
        return Some(best);
    }

    get_latest_interval(candidates)
}

/// Earliest start and latest end across every interval of every stage.
/// `None` when there are no intervals at all.
pub fn get_time_range_for_intervals(stage_intervals: &[StageIntervalEntry]) -> Option<TimeRange> {
    stage_intervals
        .iter()
        .flat_map(|entry| entry.value.iter())
        .fold(None, |range: Option<TimeRange>, interval| {
            let start = interval.start_time();
            let end = interval.end_time;
            Some(match range {
                None => TimeRange::new(start, end),
                Some(r) => TimeRange::new(r.start_time_secs.min(start), r.end_time_secs.max(end)),
            })
        })
}

/// An interval is stale once the operational window has moved past its end.
pub fn is_stale(stale_start_time: f64, interval_end_time: f64) -> bool {
    stale_start_time >= interval_end_time
}

/// Stale intervals cannot be opened unless they are the one already open.
pub fn is_openable(is_stale: bool, is_selected: bool) -> bool {
    !is_stale || is_selected
}

/// Everything a renderer needs to know about one interval cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellState {
    pub is_stale: bool,
    pub is_selected: bool,
    pub is_openable: bool,
    pub text: String,
    pub percent_complete: f64,
    pub is_percent_bar: bool,
}

/// Derive a cell's render state from the open state and the stale edge.
///
/// Only interactive intervals can be opened; automatic stage and sequence
/// cells are display-only.
pub fn derive_cell_state(
    interval: IntervalRef<'_>,
    workflow: &Workflow,
    open_state: &WorkflowState,
    stale_start_time: Option<f64>,
) -> CellState {
    let stale = stale_start_time.is_some_and(|edge| is_stale(edge, interval.end_time()));
    let selected = is_interval_open(open_state, interval);
    let interactive = match interval {
        IntervalRef::Stage(s) => s.is_interactive_analysis(),
        IntervalRef::Activity(_) => true,
        IntervalRef::Sequence(_) => false,
    };
    let text = match interval {
        IntervalRef::Activity(a) => determine_text_for_cell(a.status, &a.active_analysts),
        IntervalRef::Stage(s) => get_active_analysts_rollup(interval)
            .map(|rollup| determine_text_for_cell(s.status, &rollup))
            .unwrap_or_default(),
        IntervalRef::Sequence(_) => String::new(),
    };
    CellState {
        is_stale: stale,
        is_selected: selected,
        is_openable: interactive && is_openable(stale, selected),
        text,
        percent_complete: get_percent_complete(interval, workflow),
        is_percent_bar: matches!(interval, IntervalRef::Stage(s) if is_stage_interval_percent_bar(s)),
    }
}
