//! Row/column layout of the workflow interval table and the scroll state
//! shared by its synchronized regions.

pub mod cells;
pub mod scroll;
pub mod stale;

pub use cells::{CellValue, RowState, SubRow, TableCell, WorkflowTable, row_count};
pub use scroll::ScrollSync;
pub use stale::{StaleDataCleanup, stale_cleanup_boundary};
