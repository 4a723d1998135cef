use serde::{Deserialize, Serialize};

use crate::model::{AnalysisMode, StationGroup, TimeRange};

/// Which interval (and which of its activities) the analyst has open.
///
/// Nothing is open when `open_interval_name` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub open_interval_name: Option<String>,
    pub open_activity_names: Vec<String>,
    pub time_range: Option<TimeRange>,
    pub station_group: Option<StationGroup>,
    pub analysis_mode: Option<AnalysisMode>,
}

/// The only ways the workflow-open state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowAction {
    SetTimeRange(Option<TimeRange>),
    SetStationGroup(Option<StationGroup>),
    SetOpenIntervalName(Option<String>),
    SetOpenActivityNames(Vec<String>),
    SetAnalysisMode(Option<AnalysisMode>),
}

impl WorkflowAction {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowAction::SetTimeRange(_) => "workflow/setTimeRange",
            WorkflowAction::SetStationGroup(_) => "workflow/setStationGroup",
            WorkflowAction::SetOpenIntervalName(_) => "workflow/setOpenIntervalName",
            WorkflowAction::SetOpenActivityNames(_) => "workflow/setOpenActivityNames",
            WorkflowAction::SetAnalysisMode(_) => "workflow/setAnalysisMode",
        }
    }
}

impl WorkflowState {
    pub fn apply(&mut self, action: WorkflowAction) {
        match action {
            WorkflowAction::SetTimeRange(range) => self.time_range = range,
            WorkflowAction::SetStationGroup(group) => self.station_group = group,
            WorkflowAction::SetOpenIntervalName(name) => self.open_interval_name = name,
            WorkflowAction::SetOpenActivityNames(names) => self.open_activity_names = names,
            WorkflowAction::SetAnalysisMode(mode) => self.analysis_mode = mode,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open_interval_name.is_some()
    }

    /// Start of the open time range, if any.
    pub fn open_start_time(&self) -> Option<f64> {
        self.time_range.map(|r| r.start_time_secs)
    }
}
