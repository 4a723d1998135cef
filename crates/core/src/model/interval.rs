use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefinitionId {
    pub name: String,
}

/// Identifies one instance of a stage/activity/sequence definition starting
/// at a given epoch time. Equal ids denote the same logical interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalId {
    pub start_time: f64,
    pub definition_id: DefinitionId,
}

impl IntervalId {
    pub fn new(name: impl Into<String>, start_time: f64) -> Self {
        Self {
            start_time,
            definition_id: DefinitionId { name: name.into() },
        }
    }

    pub fn name(&self) -> &str {
        &self.definition_id.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntervalStatus {
    NotStarted,
    NotComplete,
    InProgress,
    Complete,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageMode {
    Interactive,
    Automatic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageMetrics {
    pub event_count: u32,
    pub associated_signal_detection_count: u32,
    pub max_magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInterval {
    pub interval_id: IntervalId,
    pub stage_name: String,
    pub end_time: f64,
    pub status: IntervalStatus,
    #[serde(default)]
    pub active_analysts: Vec<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub processing_start_time: Option<f64>,
    #[serde(default)]
    pub processing_end_time: Option<f64>,
    #[serde(default)]
    pub modification_time: Option<f64>,
    #[serde(default)]
    pub percent_available: f64,
    #[serde(default)]
    pub storage_time: Option<f64>,
    #[serde(default)]
    pub stage_metrics: Option<StageMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingSequenceInterval {
    pub interval_id: IntervalId,
    pub end_time: f64,
    pub status: IntervalStatus,
    pub percent_complete: f64,
    pub last_executed_step_name: String,
    #[serde(default)]
    pub comment: String,
}

/// Variant payload of a [`StageInterval`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StageIntervalKind {
    Interactive {
        #[serde(rename = "activityIntervals")]
        activity_intervals: Vec<ActivityInterval>,
    },
    Automatic {
        #[serde(rename = "sequenceIntervals")]
        sequence_intervals: Vec<ProcessingSequenceInterval>,
    },
}

/// One time-boxed instance of a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageInterval {
    pub interval_id: IntervalId,
    pub end_time: f64,
    pub status: IntervalStatus,
    pub stage_mode: StageMode,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub processing_start_time: Option<f64>,
    #[serde(default)]
    pub processing_end_time: Option<f64>,
    #[serde(default)]
    pub modification_time: Option<f64>,
    #[serde(default)]
    pub percent_available: f64,
    #[serde(default)]
    pub storage_time: Option<f64>,
    #[serde(flatten)]
    pub kind: StageIntervalKind,
}

impl StageInterval {
    pub fn start_time(&self) -> f64 {
        self.interval_id.start_time
    }

    pub fn stage_name(&self) -> &str {
        self.interval_id.name()
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.interval_id.start_time
    }

    pub fn activity_intervals(&self) -> Option<&[ActivityInterval]> {
        match &self.kind {
            StageIntervalKind::Interactive { activity_intervals } => Some(activity_intervals),
            StageIntervalKind::Automatic { .. } => None,
        }
    }

    pub fn sequence_intervals(&self) -> Option<&[ProcessingSequenceInterval]> {
        match &self.kind {
            StageIntervalKind::Automatic { sequence_intervals } => Some(sequence_intervals),
            StageIntervalKind::Interactive { .. } => None,
        }
    }

    pub fn is_interactive_analysis(&self) -> bool {
        matches!(self.kind, StageIntervalKind::Interactive { .. })
    }

    pub fn is_automatic_processing(&self) -> bool {
        matches!(self.kind, StageIntervalKind::Automatic { .. })
    }
}

/// The stage-intervals query response: one entry per stage holding its
/// (unsorted) time series of intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageIntervalEntry {
    pub name: String,
    pub value: Vec<StageInterval>,
}

pub type StageIntervalList = Vec<StageIntervalEntry>;

/// Accessors shared by every interval kind.
pub trait Interval {
    fn interval_id(&self) -> &IntervalId;
    fn end_time(&self) -> f64;
    fn status(&self) -> IntervalStatus;

    fn start_time(&self) -> f64 {
        self.interval_id().start_time
    }
}

impl Interval for StageInterval {
    fn interval_id(&self) -> &IntervalId {
        &self.interval_id
    }

    fn end_time(&self) -> f64 {
        self.end_time
    }

    fn status(&self) -> IntervalStatus {
        self.status
    }
}

impl Interval for ActivityInterval {
    fn interval_id(&self) -> &IntervalId {
        &self.interval_id
    }

    fn end_time(&self) -> f64 {
        self.end_time
    }

    fn status(&self) -> IntervalStatus {
        self.status
    }
}

impl Interval for ProcessingSequenceInterval {
    fn interval_id(&self) -> &IntervalId {
        &self.interval_id
    }

    fn end_time(&self) -> f64 {
        self.end_time
    }

    fn status(&self) -> IntervalStatus {
        self.status
    }
}

/// A borrowed interval of any kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntervalRef<'a> {
    Stage(&'a StageInterval),
    Activity(&'a ActivityInterval),
    Sequence(&'a ProcessingSequenceInterval),
}

impl<'a> IntervalRef<'a> {
    /// The activity's owning stage, otherwise the interval's definition name.
    pub fn stage_name(&self) -> &'a str {
        match self {
            IntervalRef::Activity(i) => &i.stage_name,
            IntervalRef::Stage(i) => i.interval_id.name(),
            IntervalRef::Sequence(i) => i.interval_id.name(),
        }
    }
}

impl Interval for IntervalRef<'_> {
    fn interval_id(&self) -> &IntervalId {
        match self {
            IntervalRef::Stage(i) => &i.interval_id,
            IntervalRef::Activity(i) => &i.interval_id,
            IntervalRef::Sequence(i) => &i.interval_id,
        }
    }

    fn end_time(&self) -> f64 {
        match self {
            IntervalRef::Stage(i) => i.end_time,
            IntervalRef::Activity(i) => i.end_time,
            IntervalRef::Sequence(i) => i.end_time,
        }
    }

    fn status(&self) -> IntervalStatus {
        match self {
            IntervalRef::Stage(i) => i.status,
            IntervalRef::Activity(i) => i.status,
            IntervalRef::Sequence(i) => i.status,
        }
    }
}

impl<'a> From<&'a StageInterval> for IntervalRef<'a> {
    fn from(value: &'a StageInterval) -> Self {
        IntervalRef::Stage(value)
    }
}

impl<'a> From<&'a ActivityInterval> for IntervalRef<'a> {
    fn from(value: &'a ActivityInterval) -> Self {
        IntervalRef::Activity(value)
    }
}

impl<'a> From<&'a ProcessingSequenceInterval> for IntervalRef<'a> {
    fn from(value: &'a ProcessingSequenceInterval) -> Self {
        IntervalRef::Sequence(value)
    }
}
