use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WorkflowError {
    #[error("duplicate stage name: {0}")]
    DuplicateStageName(String),
    #[error("stage {0} does not hold interactive analysis intervals")]
    NotInteractive(String),
    #[error("invalid workflow json: {0}")]
    Json(String),
}

/// How an analyst works through an interactive activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisMode {
    EventReview,
    Scan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationGroup {
    pub name: String,
    #[serde(default)]
    pub effective_at: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub name: String,
    pub analysis_mode: AnalysisMode,
    pub station_group: StationGroup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStep {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSequence {
    pub name: String,
    pub steps: Vec<ProcessingStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveAnalysisStage {
    pub name: String,
    /// Display duration of one interval of this stage, in seconds.
    pub duration: f64,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomaticProcessingStage {
    pub name: String,
    pub duration: f64,
    pub sequences: Vec<ProcessingSequence>,
}

/// A stage definition; the variant is fixed by the `mode` discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum Stage {
    #[serde(rename = "INTERACTIVE")]
    Interactive(InteractiveAnalysisStage),
    #[serde(rename = "AUTOMATIC")]
    Automatic(AutomaticProcessingStage),
}

impl Stage {
    pub fn name(&self) -> &str {
        match self {
            Stage::Interactive(s) => &s.name,
            Stage::Automatic(s) => &s.name,
        }
    }

    /// Names of the sub-rows this stage expands into: activities for
    /// interactive stages, sequences for automatic ones, in definition order.
    pub fn sub_row_names(&self) -> Vec<&str> {
        match self {
            Stage::Interactive(s) => s.activities.iter().map(|a| a.name.as_str()).collect(),
            Stage::Automatic(s) => s.sequences.iter().map(|q| q.name.as_str()).collect(),
        }
    }

    pub fn as_interactive(&self) -> Option<&InteractiveAnalysisStage> {
        match self {
            Stage::Interactive(s) => Some(s),
            Stage::Automatic(_) => None,
        }
    }

    pub fn as_automatic(&self) -> Option<&AutomaticProcessingStage> {
        match self {
            Stage::Automatic(s) => Some(s),
            Stage::Interactive(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    pub stages: Vec<Stage>,
}

impl Workflow {
    /// Parse and validate a workflow definition as returned by the workflow
    /// query.
    pub fn from_json(data: &[u8]) -> Result<Self, WorkflowError> {
        let workflow: Workflow =
            serde_json::from_slice(data).map_err(|e| WorkflowError::Json(e.to_string()))?;
        workflow.validate()?;
        Ok(workflow)
    }

    pub fn validate(&self) -> Result<(), WorkflowError> {
        let mut seen = HashSet::with_capacity(self.stages.len());
        for stage in &self.stages {
            if !seen.insert(stage.name()) {
                return Err(WorkflowError::DuplicateStageName(stage.name().to_string()));
            }
        }
        Ok(())
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name() == name)
    }
}
