use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the host's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    // Interval status fills
    StatusNotStarted,
    StatusNotComplete,
    StatusInProgress,
    StatusComplete,
    StatusSkipped,
    StatusFailed,

    /// Overlay for intervals older than the operational period.
    StaleOverlay,
    /// Outline of the interval currently open for analysis.
    SelectionHighlight,

    PercentBarFill,
    PercentBarTrack,

    /// Empty placeholder cells at the window edges.
    BufferCell,

    RowBackground,
    RowBorder,
    RowLabelText,
    ActivityRowLabelText,

    AxisBackground,
    AxisTick,
    AxisText,
    DayBoundary,

    TextPrimary,
    TextMuted,
}
