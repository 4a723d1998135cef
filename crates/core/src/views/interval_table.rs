use workflow_desk_protocol::{CellKind, LayoutCommand, Rect, ThemeToken};

use crate::classify::derive_cell_state;
use crate::model::{Interval, IntervalRef, IntervalStatus, Workflow};
use crate::scale::TimeScale;
use crate::state::WorkflowState;
use crate::table::{CellValue, TableCell, WorkflowTable};

pub fn status_token(status: IntervalStatus) -> ThemeToken {
    match status {
        IntervalStatus::NotStarted => ThemeToken::StatusNotStarted,
        IntervalStatus::NotComplete => ThemeToken::StatusNotComplete,
        IntervalStatus::InProgress => ThemeToken::StatusInProgress,
        IntervalStatus::Complete => ThemeToken::StatusComplete,
        IntervalStatus::Skipped => ThemeToken::StatusSkipped,
        IntervalStatus::Failed => ThemeToken::StatusFailed,
    }
}

/// Render the given (usually already virtualized) cells of the grid.
///
/// Row backgrounds span the whole scale width. `stale_start_time` is the
/// leading edge of the operational period, if known.
pub fn render_interval_table(
    table: &WorkflowTable,
    workflow: &Workflow,
    scale: &TimeScale,
    cells: &[&TableCell<'_>],
    open_state: &WorkflowState,
    stale_start_time: Option<f64>,
) -> Vec<LayoutCommand> {
    let row_height = table.config().row_height;
    let mut commands = Vec::with_capacity(cells.len() + 8);
    commands.push(LayoutCommand::BeginGroup {
        id: "interval-table".into(),
        label: Some(workflow.name.clone()),
    });

    let mut rows: Vec<usize> = cells.iter().map(|c| c.row_index).collect();
    rows.sort_unstable();
    rows.dedup();
    for row in rows {
        commands.push(LayoutCommand::DrawRect {
            rect: Rect::new(0.0, row as f64 * row_height, scale.total_width(), row_height),
            color: ThemeToken::RowBackground,
            border_color: Some(ThemeToken::RowBorder),
        });
    }

    for cell in cells {
        let rect = table.cell_rect(scale, cell);
        let CellValue::Interval(interval) = cell.value else {
            commands.push(LayoutCommand::BufferCell { rect });
            continue;
        };
        let state = derive_cell_state(interval, workflow, open_state, stale_start_time);
        let kind = cell_kind(cell.stage_name, interval);
        if state.is_percent_bar {
            commands.push(LayoutCommand::PercentBar {
                rect,
                kind,
                percent_complete: state.percent_complete,
            });
            continue;
        }
        commands.push(LayoutCommand::IntervalCell {
            rect,
            kind,
            fill: status_token(interval.status()),
            label: state.text,
            stale: state.is_stale,
            selected: state.is_selected,
            openable: state.is_openable,
        });
    }

    commands.push(LayoutCommand::EndGroup);
    commands
}

/// Labels for the fixed left column, one per visible row.
pub fn render_row_labels(table: &WorkflowTable) -> Vec<LayoutCommand> {
    let mut commands = Vec::new();
    let mut row_index = 0;
    for row in table.rows() {
        commands.push(LayoutCommand::RowLabel {
            row_index,
            text: row.name.clone(),
            is_activity_row: false,
            is_expanded: row.is_expanded,
        });
        row_index += 1;
        if !row.is_expanded {
            continue;
        }
        for sub_row in &row.sub_rows {
            commands.push(LayoutCommand::RowLabel {
                row_index,
                text: sub_row.name.clone(),
                is_activity_row: sub_row.is_activity_row,
                is_expanded: false,
            });
            row_index += 1;
        }
    }
    commands
}

fn cell_kind(stage_name: &str, interval: IntervalRef<'_>) -> CellKind {
    match interval {
        IntervalRef::Stage(i) => CellKind::Stage {
            stage_name: i.stage_name().to_string(),
            start_time: i.start_time(),
        },
        IntervalRef::Activity(i) => CellKind::Activity {
            stage_name: i.stage_name.clone(),
            activity_name: i.interval_id.name().to_string(),
            start_time: i.start_time(),
        },
        IntervalRef::Sequence(i) => CellKind::Sequence {
            stage_name: stage_name.to_string(),
            sequence_name: i.interval_id.name().to_string(),
            start_time: i.start_time(),
        },
    }
}
