//! Opening and closing intervals against the backend.
//!
//! Every operation awaits the backend acknowledgment before touching the
//! store, so the open state never runs ahead of a rejected mutation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Activity, Interval, IntervalId, IntervalRef, IntervalStatus, Stage, TimeRange, Workflow};
use crate::scale::epoch_seconds_now;
use crate::store::AppStore;

use super::get_stage_name;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MutationError {
    #[error("interval status update rejected: {0}")]
    Backend(String),
    #[error("stage {0} is not defined in the workflow")]
    UnknownStage(String),
    #[error("processing sequence intervals cannot be opened or closed")]
    SequenceInterval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStageIntervalStatusParams {
    pub stage_interval_id: IntervalId,
    pub status: IntervalStatus,
    pub user_name: String,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityIntervalStatusParams {
    pub activity_interval_id: IntervalId,
    pub stage_interval_id: IntervalId,
    pub status: IntervalStatus,
    pub user_name: String,
    pub time: f64,
}

/// Backend mutations that change an interval's status.
#[async_trait(?Send)]
pub trait IntervalMutations {
    async fn update_stage_interval_status(
        &self,
        params: UpdateStageIntervalStatusParams,
    ) -> Result<(), MutationError>;

    async fn update_activity_interval_status(
        &self,
        params: UpdateActivityIntervalStatusParams,
    ) -> Result<(), MutationError>;
}

/// Send the status change for `interval` and return the activities it
/// affects: every activity of the stage for a stage interval, the matching
/// one for an activity interval.
pub async fn update_stage<M: IntervalMutations + ?Sized>(
    interval: IntervalRef<'_>,
    stage: &Stage,
    user_name: &str,
    status: IntervalStatus,
    mutations: &M,
) -> Result<Vec<Activity>, MutationError> {
    let activities = stage.as_interactive().map(|s| s.activities.as_slice()).unwrap_or_default();
    match interval {
        IntervalRef::Stage(stage_interval) => {
            mutations
                .update_stage_interval_status(UpdateStageIntervalStatusParams {
                    stage_interval_id: stage_interval.interval_id.clone(),
                    status,
                    user_name: user_name.to_string(),
                    time: epoch_seconds_now(),
                })
                .await?;
            Ok(activities.to_vec())
        }
        IntervalRef::Activity(activity_interval) => {
            mutations
                .update_activity_interval_status(UpdateActivityIntervalStatusParams {
                    activity_interval_id: activity_interval.interval_id.clone(),
                    stage_interval_id: IntervalId::new(
                        activity_interval.stage_name.clone(),
                        activity_interval.start_time(),
                    ),
                    status,
                    user_name: user_name.to_string(),
                    time: epoch_seconds_now(),
                })
                .await?;
            Ok(activities
                .iter()
                .filter(|a| a.name == activity_interval.interval_id.name())
                .cloned()
                .collect())
        }
        IntervalRef::Sequence(_) => Err(MutationError::SequenceInterval),
    }
}

/// Apply an acknowledged status change to the store.
///
/// `IN_PROGRESS` opens the interval using the first activity's station group
/// and analysis mode. `NOT_COMPLETE` closes the first activity. Any other
/// status leaves the store untouched.
pub fn open_or_close_stage(
    store: &mut AppStore,
    interval: IntervalRef<'_>,
    stage: &Stage,
    status: IntervalStatus,
    is_activity_in_open_stage_interval: bool,
    activities: &[Activity],
) {
    let Some(first) = activities.first() else {
        tracing::debug!(stage = stage.name(), "no activities affected; open state unchanged");
        return;
    };
    match status {
        IntervalStatus::InProgress => {
            let mut names: Vec<String> = activities.iter().map(|a| a.name.clone()).collect();
            if is_activity_in_open_stage_interval {
                for name in &store.workflow().open_activity_names {
                    if !names.contains(name) {
                        names.push(name.clone());
                    }
                }
            }
            store.set_open_interval(
                TimeRange::new(interval.start_time(), interval.end_time()),
                Some(first.station_group.clone()),
                stage.name(),
                names,
                Some(first.analysis_mode),
            );
        }
        IntervalStatus::NotComplete => {
            store.set_closed_interval(&first.name, matches!(interval, IntervalRef::Stage(_)));
        }
        _ => {}
    }
}

/// Mark the open stage interval `NOT_COMPLETE` on the backend.
pub async fn close_stage<M: IntervalMutations + ?Sized>(
    user_name: &str,
    start_time_secs: f64,
    open_interval_name: &str,
    mutations: &M,
) -> Result<(), MutationError> {
    mutations
        .update_stage_interval_status(UpdateStageIntervalStatusParams {
            stage_interval_id: IntervalId::new(open_interval_name, start_time_secs),
            status: IntervalStatus::NotComplete,
            user_name: user_name.to_string(),
            time: epoch_seconds_now(),
        })
        .await
}

/// Change an interval's status on the backend, then open or close it in
/// the store to match.
pub async fn set_interval_status<M: IntervalMutations + ?Sized>(
    store: &mut AppStore,
    workflow: &Workflow,
    mutations: &M,
    interval: IntervalRef<'_>,
    status: IntervalStatus,
) -> Result<(), MutationError> {
    let stage_name = get_stage_name(interval);
    let stage = workflow
        .stage(stage_name)
        .ok_or_else(|| MutationError::UnknownStage(stage_name.to_string()))?;

    let open = store.workflow();
    let is_activity_in_open_stage_interval = matches!(interval, IntervalRef::Activity(_))
        && open.open_interval_name.as_deref() == Some(stage_name)
        && open.open_start_time() == Some(interval.start_time());

    let user_name = store.username().to_string();
    let activities = update_stage(interval, stage, &user_name, status, mutations).await?;
    open_or_close_stage(
        store,
        interval,
        stage,
        status,
        is_activity_in_open_stage_interval,
        &activities,
    );
    Ok(())
}
