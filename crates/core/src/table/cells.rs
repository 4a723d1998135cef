use std::collections::BTreeSet;

use workflow_desk_protocol::Rect;

use crate::config::WorkflowDisplayConfig;
use crate::model::{Interval, IntervalRef, StageInterval, StageIntervalEntry, TimeRange, Workflow};
use crate::scale::{TimeScale, calculate_width};

/// A top-level stage row and the sub-rows it expands into.
#[derive(Debug, Clone, PartialEq)]
pub struct RowState {
    pub name: String,
    pub is_expanded: bool,
    pub sub_rows: Vec<SubRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubRow {
    pub name: String,
    /// Activity rows belong to interactive stages, the others are
    /// processing sequences.
    pub is_activity_row: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Interval(IntervalRef<'a>),
    /// Placeholder at a window edge.
    Buffer { start_time: f64, end_time: f64 },
}

impl CellValue<'_> {
    pub fn start_time(&self) -> f64 {
        match self {
            CellValue::Interval(i) => i.start_time(),
            CellValue::Buffer { start_time, .. } => *start_time,
        }
    }

    pub fn end_time(&self) -> f64 {
        match self {
            CellValue::Interval(i) => i.end_time(),
            CellValue::Buffer { end_time, .. } => *end_time,
        }
    }

    pub fn is_buffer(&self) -> bool {
        matches!(self, CellValue::Buffer { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableCell<'a> {
    pub index: usize,
    pub row_index: usize,
    pub col_index: usize,
    /// Stage owning the row; sequence intervals do not carry it themselves.
    pub stage_name: &'a str,
    pub value: CellValue<'a>,
}

/// Row layout of the interval table.
///
/// Only the expanded flags are state; everything else is recomputed from the
/// workflow, the interval list and the window on every call.
#[derive(Debug, Clone)]
pub struct WorkflowTable {
    config: WorkflowDisplayConfig,
    rows: Vec<RowState>,
}

impl WorkflowTable {
    pub fn new(workflow: &Workflow, config: WorkflowDisplayConfig) -> Self {
        let rows = workflow
            .stages
            .iter()
            .map(|stage| RowState {
                name: stage.name().to_string(),
                is_expanded: false,
                sub_rows: stage
                    .sub_row_names()
                    .into_iter()
                    .map(|name| SubRow {
                        name: name.to_string(),
                        is_activity_row: stage.as_interactive().is_some(),
                    })
                    .collect(),
            })
            .collect();
        Self { config, rows }
    }

    pub fn config(&self) -> &WorkflowDisplayConfig {
        &self.config
    }

    pub fn rows(&self) -> &[RowState] {
        &self.rows
    }

    /// Flip a stage row between collapsed and expanded. Returns the new
    /// state, or `None` for an unknown stage.
    pub fn toggle_expanded(&mut self, stage_name: &str) -> Option<bool> {
        let row = self.rows.iter_mut().find(|r| r.name == stage_name)?;
        row.is_expanded = !row.is_expanded;
        tracing::debug!(stage = stage_name, expanded = row.is_expanded, "row toggled");
        Some(row.is_expanded)
    }

    pub fn scale(&self, time_range: TimeRange) -> TimeScale {
        TimeScale::for_time_range(time_range, self.config.pixels_per_second)
    }

    /// Cells for every visible row, in row order then start time.
    ///
    /// Each row starts and ends with a buffer cell covering the first and
    /// last `buffer_secs` of the window, so the whole scroll region renders
    /// even where a row has no intervals. Sub-rows pick the
    /// activity or sequence interval named after them out of each stage
    /// interval and skip stage intervals that lack one.
    pub fn table_data<'a>(
        &'a self,
        stage_intervals: &'a [StageIntervalEntry],
        time_range: TimeRange,
    ) -> Vec<TableCell<'a>> {
        let mut builder = CellBuilder {
            cells: Vec::new(),
            buffer_secs: self.config.buffer_secs,
            time_range,
        };
        let mut row_index = 0;
        for row in &self.rows {
            let mut intervals: Vec<&StageInterval> = stage_intervals
                .iter()
                .filter(|e| e.name == row.name)
                .flat_map(|e| e.value.iter())
                .collect();
            intervals.sort_by(|a, b| a.start_time().total_cmp(&b.start_time()));

            builder.row(
                row_index,
                &row.name,
                intervals.iter().map(|&i| IntervalRef::Stage(i)),
            );
            row_index += 1;

            if !row.is_expanded {
                continue;
            }
            for sub_row in &row.sub_rows {
                let refs = intervals
                    .iter()
                    .filter_map(|&i| sub_row_interval(i, &sub_row.name));
                builder.row(row_index, &row.name, refs);
                row_index += 1;
            }
        }
        builder.cells
    }

    /// Pixel rect of `cell` under `scale`.
    pub fn cell_rect(&self, scale: &TimeScale, cell: &TableCell<'_>) -> Rect {
        let (start, end) = (cell.value.start_time(), cell.value.end_time());
        Rect::new(
            scale.scale_to_position(start),
            cell.row_index as f64 * self.config.row_height,
            calculate_width(start, end, scale.pixels_per_second()),
            self.config.row_height,
        )
    }

    pub fn table_height(&self, cells: &[TableCell<'_>]) -> f64 {
        row_count(cells) as f64 * self.config.row_height
    }

    /// Cells that intersect the viewport plus the horizontal overscan.
    pub fn visible_cells<'c, 'a>(
        &self,
        scale: &TimeScale,
        cells: &'c [TableCell<'a>],
        scroll_left: f64,
        client_width: f64,
    ) -> Vec<&'c TableCell<'a>> {
        let overscan = self.config.horizontal_overscan_px;
        let (left, right) = (scroll_left - overscan, scroll_left + client_width + overscan);
        cells
            .iter()
            .filter(|c| self.cell_rect(scale, c).overlaps_x(left, right))
            .collect()
    }
}

/// Number of distinct rows that produced at least one cell.
pub fn row_count(cells: &[TableCell<'_>]) -> usize {
    cells.iter().map(|c| c.row_index).collect::<BTreeSet<_>>().len()
}

fn sub_row_interval<'a>(interval: &'a StageInterval, name: &str) -> Option<IntervalRef<'a>> {
    if let Some(activities) = interval.activity_intervals() {
        return activities
            .iter()
            .find(|a| a.interval_id.name() == name)
            .map(IntervalRef::Activity);
    }
    interval
        .sequence_intervals()?
        .iter()
        .find(|s| s.interval_id.name() == name)
        .map(IntervalRef::Sequence)
}

struct CellBuilder<'a> {
    cells: Vec<TableCell<'a>>,
    buffer_secs: f64,
    time_range: TimeRange,
}

impl<'a> CellBuilder<'a> {
    fn row(
        &mut self,
        row_index: usize,
        stage_name: &'a str,
        intervals: impl Iterator<Item = IntervalRef<'a>>,
    ) {
        let (start, end) = (self.time_range.start_time_secs, self.time_range.end_time_secs);
        let mut col_index = 0;
        self.push(row_index, col_index, stage_name, CellValue::Buffer {
            start_time: start,
            end_time: start + self.buffer_secs,
        });
        for interval in intervals {
            col_index += 1;
            self.push(row_index, col_index, stage_name, CellValue::Interval(interval));
        }
        self.push(row_index, col_index + 1, stage_name, CellValue::Buffer {
            start_time: end - self.buffer_secs,
            end_time: end,
        });
    }

    fn push(&mut self, row_index: usize, col_index: usize, stage_name: &'a str, value: CellValue<'a>) {
        self.cells.push(TableCell {
            index: self.cells.len(),
            row_index,
            col_index,
            stage_name,
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::model::IntervalStatus;

    fn list() -> Vec<StageIntervalEntry> {
        let al1 = |start: f64| {
            interactive_interval(
                "AL1",
                start,
                start + 7_200.0,
                IntervalStatus::NotStarted,
                vec![activity_interval("Scan", "AL1", start, start + 7_200.0, IntervalStatus::NotStarted, &[])],
            )
        };
        vec![
            entry("AL1", vec![al1(7_200.0), al1(0.0)]),
            entry(
                "Auto Network",
                vec![automatic_interval(
                    "Auto Network",
                    0.0,
                    300.0,
                    IntervalStatus::Complete,
                    vec![sequence_interval("Network", 0.0, 300.0, 100.0, "c")],
                )],
            ),
        ]
    }

    #[test]
    fn rows_follow_workflow_order() {
        let table = WorkflowTable::new(&workflow(), WorkflowDisplayConfig::default());
        let names: Vec<&str> = table.rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Auto Network", "AL1"]);
        assert!(table.rows()[1].sub_rows.iter().all(|s| s.is_activity_row));
        assert!(!table.rows()[0].sub_rows[0].is_activity_row);
    }

    #[test]
    fn collapsed_rows_have_buffers_and_sorted_intervals() {
        let table = WorkflowTable::new(&workflow(), WorkflowDisplayConfig::default());
        let data = list();
        let cells = table.table_data(&data, TimeRange::new(0.0, 14_400.0));

        assert_eq!(row_count(&cells), 2);
        assert_eq!(table.table_height(&cells), 48.0);

        let al1: Vec<&TableCell<'_>> = cells.iter().filter(|c| c.row_index == 1).collect();
        assert_eq!(al1.len(), 4);
        assert!(al1[0].value.is_buffer());
        assert_eq!(al1[0].value.start_time(), 0.0);
        assert_eq!(al1[0].value.end_time(), 120.0);
        assert_eq!(al1[1].value.start_time(), 0.0);
        assert_eq!(al1[2].value.start_time(), 7_200.0);
        assert!(al1[3].value.is_buffer());
        assert_eq!(al1[3].value.start_time(), 14_280.0);
        assert_eq!(al1[3].value.end_time(), 14_400.0);
        assert_eq!(al1[3].col_index, 3);
        assert!(cells.iter().enumerate().all(|(i, c)| c.index == i));
    }

    #[test]
    fn expanded_rows_insert_sub_rows() {
        let mut table = WorkflowTable::new(&workflow(), WorkflowDisplayConfig::default());
        assert_eq!(table.toggle_expanded("AL1"), Some(true));
        assert_eq!(table.toggle_expanded("nope"), None);
        let data = list();
        let cells = table.table_data(&data, TimeRange::new(0.0, 14_400.0));

        // Auto Network, AL1, Event Review, Scan
        assert_eq!(row_count(&cells), 4);
        let review: Vec<_> = cells.iter().filter(|c| c.row_index == 2).collect();
        assert_eq!(review.len(), 2, "no Event Review intervals, only buffers");
        let scan: Vec<_> = cells.iter().filter(|c| c.row_index == 3).collect();
        assert_eq!(scan.len(), 4);
        assert!(matches!(scan[1].value, CellValue::Interval(IntervalRef::Activity(_))));
        assert_eq!(scan[1].stage_name, "AL1");

        assert_eq!(table.toggle_expanded("AL1"), Some(false));
        assert_eq!(row_count(&table.table_data(&data, TimeRange::new(0.0, 14_400.0))), 2);
    }

    #[test]
    fn cell_geometry_uses_the_scale() {
        let table = WorkflowTable::new(&workflow(), WorkflowDisplayConfig::default());
        let data = list();
        let range = TimeRange::new(0.0, 14_400.0);
        let scale = table.scale(range);
        let cells = table.table_data(&data, range);

        assert_eq!(scale.scale_to_position(range.start_time_secs), 0.0);
        let rect = table.cell_rect(&scale, &cells[0]);
        assert_eq!(rect, Rect::new(0.0, 0.0, 24.0, 24.0));

        let al1_second = cells
            .iter()
            .find(|c| c.row_index == 1 && c.value.start_time() == 7_200.0);
        let rect = al1_second.map(|c| table.cell_rect(&scale, c));
        assert_eq!(rect, Some(Rect::new(1_440.0, 24.0, 1_440.0, 24.0)));
        assert!((scale.total_width() - 2_880.0).abs() < 1e-9);

        // The end buffer closes flush with the scroll width.
        let end_buffer = cells.iter().rfind(|c| c.row_index == 1);
        let rect = end_buffer.map(|c| table.cell_rect(&scale, c)).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        assert!((rect.x - 2_856.0).abs() < 1e-9, "{rect:?}");
        assert!((rect.right() - scale.total_width()).abs() < 1e-9, "{rect:?}");
    }

    #[test]
    fn virtualization_keeps_overscan() {
        let table = WorkflowTable::new(&workflow(), WorkflowDisplayConfig::default());
        let data = list();
        let range = TimeRange::new(0.0, 14_400.0);
        let scale = table.scale(range);
        let cells = table.table_data(&data, range);

        // Viewport over the second AL1 interval only.
        let visible = table.visible_cells(&scale, &cells, 1_700.0, 400.0);
        let starts: Vec<f64> = visible.iter().map(|c| c.value.start_time()).collect();
        assert_eq!(starts, vec![7_200.0]);

        // Overscan reaches back into the first interval.
        let visible = table.visible_cells(&scale, &cells, 1_500.0, 400.0);
        assert_eq!(visible.len(), 2);
    }
}
