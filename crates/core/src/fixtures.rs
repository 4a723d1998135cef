//! Builders for unit-test data.

use crate::model::{
    Activity, ActivityInterval, AnalysisMode, AutomaticProcessingStage, InteractiveAnalysisStage,
    IntervalId, IntervalStatus, ProcessingSequence, ProcessingSequenceInterval, ProcessingStep,
    Stage, StageInterval, StageIntervalEntry, StageIntervalKind, StageMode, StationGroup,
    Workflow,
};

pub fn activity_interval(
    activity: &str,
    stage: &str,
    start: f64,
    end: f64,
    status: IntervalStatus,
    analysts: &[&str],
) -> ActivityInterval {
    ActivityInterval {
        interval_id: IntervalId::new(activity, start),
        stage_name: stage.into(),
        end_time: end,
        status,
        active_analysts: analysts.iter().map(|a| (*a).to_string()).collect(),
        comment: String::new(),
        processing_start_time: None,
        processing_end_time: None,
        modification_time: None,
        percent_available: 100.0,
        storage_time: None,
        stage_metrics: None,
    }
}

pub fn interactive_interval(
    stage: &str,
    start: f64,
    end: f64,
    status: IntervalStatus,
    activity_intervals: Vec<ActivityInterval>,
) -> StageInterval {
    StageInterval {
        interval_id: IntervalId::new(stage, start),
        end_time: end,
        status,
        stage_mode: StageMode::Interactive,
        comment: String::new(),
        processing_start_time: None,
        processing_end_time: None,
        modification_time: None,
        percent_available: 100.0,
        storage_time: None,
        kind: StageIntervalKind::Interactive { activity_intervals },
    }
}

pub fn sequence_interval(
    sequence: &str,
    start: f64,
    end: f64,
    percent_complete: f64,
    last_step: &str,
) -> ProcessingSequenceInterval {
    ProcessingSequenceInterval {
        interval_id: IntervalId::new(sequence, start),
        end_time: end,
        status: IntervalStatus::InProgress,
        percent_complete,
        last_executed_step_name: last_step.into(),
        comment: String::new(),
    }
}

pub fn automatic_interval(
    stage: &str,
    start: f64,
    end: f64,
    status: IntervalStatus,
    sequence_intervals: Vec<ProcessingSequenceInterval>,
) -> StageInterval {
    StageInterval {
        interval_id: IntervalId::new(stage, start),
        end_time: end,
        status,
        stage_mode: StageMode::Automatic,
        comment: String::new(),
        processing_start_time: None,
        processing_end_time: None,
        modification_time: None,
        percent_available: 100.0,
        storage_time: None,
        kind: StageIntervalKind::Automatic { sequence_intervals },
    }
}

pub fn activity(name: &str, group: &str) -> Activity {
    Activity {
        name: name.into(),
        analysis_mode: AnalysisMode::EventReview,
        station_group: StationGroup {
            name: group.into(),
            effective_at: None,
            description: None,
        },
    }
}

/// "Auto Network" (automatic, steps a/b/c) followed by "AL1" (interactive,
/// activities "Event Review" and "Scan").
pub fn workflow() -> Workflow {
    Workflow {
        name: "Seismic".into(),
        stages: vec![
            Stage::Automatic(AutomaticProcessingStage {
                name: "Auto Network".into(),
                duration: 300.0,
                sequences: vec![ProcessingSequence {
                    name: "Network".into(),
                    steps: ["a", "b", "c"]
                        .iter()
                        .map(|s| ProcessingStep { name: (*s).into() })
                        .collect(),
                }],
            }),
            Stage::Interactive(InteractiveAnalysisStage {
                name: "AL1".into(),
                duration: 7_200.0,
                activities: vec![activity("Event Review", "ALL_1"), activity("Scan", "ALL_2")],
            }),
        ],
    }
}

pub fn entry(name: &str, value: Vec<StageInterval>) -> StageIntervalEntry {
    StageIntervalEntry {
        name: name.into(),
        value,
    }
}
