//! Workflow-open state and the operations that open and close intervals.

pub mod mutations;
pub mod operations;
pub mod panel;
pub mod slice;

pub use mutations::{
    IntervalMutations, MutationError, UpdateActivityIntervalStatusParams,
    UpdateStageIntervalStatusParams, close_stage, open_or_close_stage, set_interval_status,
    update_stage,
};
pub use operations::{current_activity_intervals, get_stage_name, is_interval_open};
pub use panel::{Notification, OpenAnythingInterval, PromptTarget, WorkflowPanel, open_anything};
pub use slice::{WorkflowAction, WorkflowState};
