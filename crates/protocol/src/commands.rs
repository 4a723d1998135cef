use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// What a drawn table cell stands for, so the host can hit-test a click
/// back to the interval it should open or close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellKind {
    Stage {
        stage_name: String,
        start_time: f64,
    },
    Activity {
        stage_name: String,
        activity_name: String,
        start_time: f64,
    },
    Sequence {
        stage_name: String,
        sequence_name: String,
        start_time: f64,
    },
}

/// A single, stateless layout instruction.
///
/// The core emits a `Vec<LayoutCommand>` per region (grid, axis, overlay).
/// Hosts consume the list sequentially; each command carries everything it
/// needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LayoutCommand {
    /// A clickable interval cell.
    IntervalCell {
        rect: Rect,
        kind: CellKind,
        fill: ThemeToken,
        label: String,
        stale: bool,
        selected: bool,
        openable: bool,
    },

    /// A continuous progress bar for long-running automatic stages.
    PercentBar {
        rect: Rect,
        kind: CellKind,
        percent_complete: f64,
    },

    /// Zero-content placeholder that keeps the scroll region full width.
    BufferCell { rect: Rect },

    /// Row label in the fixed left column.
    RowLabel {
        row_index: usize,
        text: String,
        is_activity_row: bool,
        is_expanded: bool,
    },

    DrawText {
        position: Point,
        text: String,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
    },

    /// Begin a logical group (grid, axis, overlay).
    BeginGroup { id: String, label: Option<String> },

    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
