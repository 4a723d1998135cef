pub mod interval;
pub mod time_range;
pub mod workflow;

pub use interval::{
    ActivityInterval, DefinitionId, Interval, IntervalId, IntervalRef, IntervalStatus,
    ProcessingSequenceInterval, StageInterval, StageIntervalEntry, StageIntervalKind,
    StageIntervalList, StageMetrics, StageMode,
};
pub use time_range::TimeRange;
pub use workflow::{
    Activity, AnalysisMode, AutomaticProcessingStage, InteractiveAnalysisStage,
    ProcessingSequence, ProcessingStep, Stage, StationGroup, Workflow, WorkflowError,
};
