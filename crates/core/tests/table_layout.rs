//! Integration test: lay out the interval table from query-shaped JSON and
//! drive it through rendering, scrolling, panning and stale cleanup.

use workflow_desk_core::classify::{get_best_interval, get_time_range_for_intervals};
use workflow_desk_core::config::WorkflowDisplayConfig;
use workflow_desk_core::model::{StageIntervalEntry, TimeRange, Workflow};
use workflow_desk_core::query::{OperationalTimePeriodConfiguration, StageIntervalCache};
use workflow_desk_core::state::WorkflowState;
use workflow_desk_core::table::{
    ScrollSync, StaleDataCleanup, TableCell, WorkflowTable, row_count, stale_cleanup_boundary,
};
use workflow_desk_core::views::interval_table::render_interval_table;
use workflow_desk_protocol::{CellKind, LayoutCommand};

const DAY_START: f64 = 1_704_067_200.0;

fn load() -> (Workflow, Vec<StageIntervalEntry>) {
    let Ok(workflow) = Workflow::from_json(include_bytes!("fixtures/workflow.json")) else {
        unreachable!("workflow fixture should parse");
    };
    let Ok(intervals) = serde_json::from_slice(include_bytes!("fixtures/stage-intervals.json")) else {
        unreachable!("stage interval fixture should parse");
    };
    (workflow, intervals)
}

fn al1(entries: &[StageIntervalEntry]) -> &StageIntervalEntry {
    let Some(entry) = entries.iter().find(|e| e.name == "AL1") else {
        unreachable!("fixture has AL1");
    };
    entry
}

#[test]
fn time_range_spans_every_stage() {
    let (_, intervals) = load();
    assert_eq!(
        get_time_range_for_intervals(&intervals),
        Some(TimeRange::new(DAY_START, DAY_START + 21_600.0))
    );
}

#[test]
fn best_interval_prefers_the_analysts_own() {
    let (_, intervals) = load();
    let stage = al1(&intervals);
    let start = |user: &str| get_best_interval(&stage.value, user).map(|i| i.start_time());
    assert_eq!(start("moe"), Some(DAY_START + 7_200.0));
    assert_eq!(start("curly"), Some(DAY_START + 14_400.0));
}

#[test]
fn expanded_table_renders_every_kind_of_cell() {
    let (workflow, intervals) = load();
    let mut table = WorkflowTable::new(&workflow, WorkflowDisplayConfig::default());
    table.toggle_expanded("Auto Network");
    table.toggle_expanded("AL1");

    let range = get_time_range_for_intervals(&intervals).unwrap_or(TimeRange::new(0.0, 0.0));
    let scale = table.scale(range);
    let cells = table.table_data(&intervals, range);

    // Auto Network, Network, AL1, Event Review, Scan
    assert_eq!(row_count(&cells), 5);
    assert_eq!(table.table_height(&cells), 120.0);
    assert_eq!(cells.len(), 22);
    assert_eq!(cells.iter().filter(|c| c.row_index == 4).count(), 4);

    let refs: Vec<&TableCell<'_>> = cells.iter().collect();
    let open = WorkflowState::default();
    let stale_start = Some(DAY_START + 7_200.0);
    let commands = render_interval_table(&table, &workflow, &scale, &refs, &open, stale_start);

    let bars: Vec<f64> = commands
        .iter()
        .filter_map(|c| match c {
            LayoutCommand::PercentBar { percent_complete, .. } => Some(*percent_complete),
            _ => None,
        })
        .collect();
    assert_eq!(bars, vec![50.0]);

    let sequences = commands
        .iter()
        .filter(|c| {
            matches!(
                c,
                LayoutCommand::IntervalCell { kind: CellKind::Sequence { stage_name, .. }, .. }
                    if stage_name == "Auto Network"
            )
        })
        .count();
    assert_eq!(sequences, 2);

    let first_al1 = commands.iter().find_map(|c| match c {
        LayoutCommand::IntervalCell {
            kind: CellKind::Stage { stage_name, start_time },
            stale,
            openable,
            label,
            ..
        } if stage_name == "AL1" && *start_time == DAY_START => Some((*stale, *openable, label.clone())),
        _ => None,
    });
    assert_eq!(first_al1, Some((true, false, "larry".to_string())));
}

#[test]
fn virtualized_window_follows_the_scroll() {
    let (workflow, intervals) = load();
    let table = WorkflowTable::new(&workflow, WorkflowDisplayConfig::default());
    let range = get_time_range_for_intervals(&intervals).unwrap_or(TimeRange::new(0.0, 0.0));
    let scale = table.scale(range);
    let cells = table.table_data(&intervals, range);
    assert!((scale.total_width() - 4_320.0).abs() < 1e-9);
    assert_eq!(scale.scale_to_position(range.start_time_secs), 0.0);

    let mut scroll = ScrollSync::new(scale.total_width(), 1_000.0, 5.0);
    // Two hours in at 0.2 px/s.
    scroll.pan_by(&scale, 7_200.0);
    assert!((scroll.scroll_left() - 1_440.0).abs() < 1e-9);
    assert_eq!(scroll.time_axis_offset, -scroll.scroll_left());

    let visible = table.visible_cells(&scale, &cells, scroll.scroll_left(), 1_000.0);
    let al1_starts: Vec<f64> = visible
        .iter()
        .filter(|c| c.row_index == 1 && !c.value.is_buffer())
        .map(|c| c.value.start_time())
        .collect();
    assert_eq!(al1_starts, vec![DAY_START, DAY_START + 7_200.0]);

    assert!(!scroll.on_scroll(scroll.scroll_left() + 4.0));
    // Same fraction of the scrollable width after a zoom-like resize.
    scroll.on_resize(500.0, scale.total_width() * 2.0);
    let expected = 1_440.0 / 3_320.0 * 8_140.0;
    assert!((scroll.scroll_left() - expected).abs() < 1e-9);
}

#[derive(Default)]
struct RecordingCache {
    boundaries: Vec<f64>,
}

impl StageIntervalCache for RecordingCache {
    fn cleanup(&mut self, boundary_secs: f64) {
        self.boundaries.push(boundary_secs);
    }
}

#[test]
fn stale_boundary_drives_cleanup() {
    let (workflow, intervals) = load();
    let table = WorkflowTable::new(&workflow, WorkflowDisplayConfig::default());
    let range = get_time_range_for_intervals(&intervals).unwrap_or(TimeRange::new(0.0, 0.0));
    let scale = table.scale(range);
    let period = OperationalTimePeriodConfiguration {
        operational_period_start: 14_400.0,
        operational_period_end: 0.0,
    };
    let operational_start = period.operational_start_time(Some(range));
    assert_eq!(operational_start, Some(DAY_START + 7_200.0));

    let mut scroll = ScrollSync::new(scale.total_width(), 1_000.0, 5.0);
    let mut cache = RecordingCache::default();
    let mut cleanup = StaleDataCleanup::new();

    // At the left edge the boundary is the window start itself.
    let boundary = stale_cleanup_boundary(Some(scroll.viewable_min_start_time(&scale)), None, None);
    assert_eq!(boundary, DAY_START);

    scroll.scroll_to(scale.scale_to_position(DAY_START + 9_000.0));
    let boundary = stale_cleanup_boundary(
        Some(scroll.viewable_min_start_time(&scale)),
        None,
        operational_start,
    );
    assert_eq!(boundary, DAY_START + 7_200.0);
    assert!(cleanup.update(&mut cache, boundary, 1));

    // Scrolling back past the operational start moves the boundary with it.
    scroll.scroll_to(scale.scale_to_position(DAY_START + 3_700.0));
    let boundary = stale_cleanup_boundary(
        Some(scroll.viewable_min_start_time(&scale)),
        None,
        operational_start,
    );
    assert_eq!(boundary, DAY_START + 3_600.0);
    assert!(cleanup.update(&mut cache, boundary, 1));
    assert!(!cleanup.update(&mut cache, boundary, 1));

    assert_eq!(cache.boundaries, vec![DAY_START + 7_200.0, DAY_START + 3_600.0]);
}
