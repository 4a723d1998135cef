use crate::model::{
    ActivityInterval, Interval, IntervalRef, IntervalStatus, Stage, StageInterval, StationGroup,
    TimeRange, Workflow,
};
use crate::store::AppStore;

use super::mutations::{IntervalMutations, MutationError, close_stage, set_interval_status};

/// A stage and time range picked directly rather than from a table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAnythingInterval {
    pub open_interval_name: String,
    pub time_range: TimeRange,
    pub station_group: StationGroup,
}

/// What the confirmation prompt will open once accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptTarget {
    Stage(StageInterval),
    Activity(ActivityInterval),
    Anything(OpenAnythingInterval),
}

/// A non-blocking user notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
}

/// Open/close orchestration behind the workflow panel.
///
/// Opening while another interval is open parks the target behind a
/// confirmation prompt. A newer target overwrites a pending one. Backend
/// failures are logged and surfaced as notifications; the open state is not
/// rolled back.
#[derive(Debug, Default)]
pub struct WorkflowPanel {
    pending: Option<PromptTarget>,
    notifications: Vec<Notification>,
}

impl WorkflowPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_confirmation_prompt_visible(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PromptTarget> {
        self.pending.as_ref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Hand the accumulated notifications to the host.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Open `interval`, asking first if a different interval is open.
    pub async fn show_confirmation_prompt<M: IntervalMutations + ?Sized>(
        &mut self,
        store: &mut AppStore,
        workflow: &Workflow,
        mutations: &M,
        interval: IntervalRef<'_>,
    ) {
        let state = store.workflow();
        let Some(open_name) = state.open_interval_name.as_deref() else {
            self.open_interval(store, workflow, mutations, interval).await;
            return;
        };
        let same_interval = open_name == interval.stage_name()
            && state.time_range
                == Some(TimeRange::new(interval.start_time(), interval.end_time()));
        if same_interval {
            self.open_interval(store, workflow, mutations, interval).await;
            return;
        }
        let target = match interval {
            IntervalRef::Stage(i) => PromptTarget::Stage(i.clone()),
            IntervalRef::Activity(i) => PromptTarget::Activity(i.clone()),
            IntervalRef::Sequence(_) => {
                tracing::debug!("ignoring open request for a processing sequence interval");
                return;
            }
        };
        tracing::debug!(stage = interval.stage_name(), "awaiting confirmation to switch intervals");
        self.pending = Some(target);
    }

    /// Open an arbitrary stage/time range, asking first if anything is open.
    pub fn show_open_anything_confirmation_prompt(
        &mut self,
        store: &mut AppStore,
        workflow: &Workflow,
        target: OpenAnythingInterval,
    ) {
        if store.workflow().time_range.is_some() {
            self.pending = Some(PromptTarget::Anything(target));
            return;
        }
        open_anything(store, workflow, &target);
    }

    /// The analyst accepted the prompt.
    pub async fn on_confirmation_prompt<M: IntervalMutations + ?Sized>(
        &mut self,
        store: &mut AppStore,
        workflow: &Workflow,
        mutations: &M,
    ) {
        let Some(target) = self.pending.take() else {
            return;
        };
        match &target {
            PromptTarget::Anything(anything) => {
                if let (Some(name), Some(range)) = (
                    store.workflow().open_interval_name.clone(),
                    store.workflow().time_range,
                ) {
                    let user_name = store.username().to_string();
                    if let Err(e) =
                        close_stage(&user_name, range.start_time_secs, &name, mutations).await
                    {
                        self.notify_failure("close", &name, &e);
                        return;
                    }
                }
                open_anything(store, workflow, anything);
            }
            PromptTarget::Stage(i) => {
                self.open_interval(store, workflow, mutations, IntervalRef::Stage(i)).await;
            }
            PromptTarget::Activity(i) => {
                self.open_interval(store, workflow, mutations, IntervalRef::Activity(i)).await;
            }
        }
    }

    pub fn on_cancel_prompt(&mut self) {
        self.pending = None;
    }

    pub async fn open_interval<M: IntervalMutations + ?Sized>(
        &mut self,
        store: &mut AppStore,
        workflow: &Workflow,
        mutations: &M,
        interval: IntervalRef<'_>,
    ) {
        let result =
            set_interval_status(store, workflow, mutations, interval, IntervalStatus::InProgress).await;
        if let Err(e) = result {
            self.notify_failure("open", interval.stage_name(), &e);
        }
    }

    pub async fn close_interval<M: IntervalMutations + ?Sized>(
        &mut self,
        store: &mut AppStore,
        workflow: &Workflow,
        mutations: &M,
        interval: IntervalRef<'_>,
    ) {
        let result =
            set_interval_status(store, workflow, mutations, interval, IntervalStatus::NotComplete).await;
        if let Err(e) = result {
            self.notify_failure("close", interval.stage_name(), &e);
        }
    }

    fn notify_failure(&mut self, verb: &str, stage: &str, error: &MutationError) {
        tracing::error!(stage, error = %error, "failed to {verb} interval");
        self.notifications.push(Notification {
            message: format!("Failed to {verb} {stage}: {error}"),
        });
    }
}

/// Open the first activity of the named stage over the given time range.
pub fn open_anything(store: &mut AppStore, workflow: &Workflow, target: &OpenAnythingInterval) {
    let first = workflow
        .stage(&target.open_interval_name)
        .and_then(Stage::as_interactive)
        .and_then(|s| s.activities.first());
    store.set_open_interval(
        target.time_range,
        Some(target.station_group.clone()),
        &target.open_interval_name,
        first.map(|a| vec![a.name.clone()]).unwrap_or_default(),
        first.map(|a| a.analysis_mode),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::state::mutations::mock::RecordingMutations;

    fn al1(start: f64) -> StageInterval {
        interactive_interval("AL1", start, start + 7_200.0, IntervalStatus::NotStarted, vec![])
    }

    fn group(name: &str) -> StationGroup {
        StationGroup {
            name: name.into(),
            effective_at: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn opens_immediately_when_nothing_is_open() {
        let (workflow, backend) = (workflow(), RecordingMutations::default());
        let mut store = AppStore::new("me");
        let mut panel = WorkflowPanel::new();
        let first = al1(0.0);

        panel
            .show_confirmation_prompt(&mut store, &workflow, &backend, IntervalRef::Stage(&first))
            .await;

        assert!(!panel.is_confirmation_prompt_visible());
        assert_eq!(store.workflow().open_interval_name.as_deref(), Some("AL1"));
    }

    #[tokio::test]
    async fn reopening_the_same_interval_skips_the_prompt() {
        let (workflow, backend) = (workflow(), RecordingMutations::default());
        let mut store = AppStore::new("me");
        let mut panel = WorkflowPanel::new();
        let first = al1(0.0);

        for _ in 0..2 {
            panel
                .show_confirmation_prompt(&mut store, &workflow, &backend, IntervalRef::Stage(&first))
                .await;
        }
        assert!(!panel.is_confirmation_prompt_visible());
        assert_eq!(backend.stage_calls.borrow().len(), 2);
    }

    #[tokio::test]
    async fn pending_target_is_last_write_wins() {
        let (workflow, backend) = (workflow(), RecordingMutations::default());
        let mut store = AppStore::new("me");
        let mut panel = WorkflowPanel::new();
        let (first, second, third) = (al1(0.0), al1(7_200.0), al1(14_400.0));

        panel
            .show_confirmation_prompt(&mut store, &workflow, &backend, IntervalRef::Stage(&first))
            .await;
        panel
            .show_confirmation_prompt(&mut store, &workflow, &backend, IntervalRef::Stage(&second))
            .await;
        panel
            .show_confirmation_prompt(&mut store, &workflow, &backend, IntervalRef::Stage(&third))
            .await;

        assert!(panel.is_confirmation_prompt_visible());
        assert_eq!(panel.pending(), Some(&PromptTarget::Stage(third.clone())));
        assert_eq!(store.workflow().open_start_time(), Some(0.0));

        panel.on_confirmation_prompt(&mut store, &workflow, &backend).await;
        assert!(!panel.is_confirmation_prompt_visible());
        assert_eq!(store.workflow().open_start_time(), Some(14_400.0));
    }

    #[tokio::test]
    async fn cancel_discards_the_target() {
        let (workflow, backend) = (workflow(), RecordingMutations::default());
        let mut store = AppStore::new("me");
        let mut panel = WorkflowPanel::new();
        let (first, second) = (al1(0.0), al1(7_200.0));

        panel
            .show_confirmation_prompt(&mut store, &workflow, &backend, IntervalRef::Stage(&first))
            .await;
        panel
            .show_confirmation_prompt(&mut store, &workflow, &backend, IntervalRef::Stage(&second))
            .await;
        panel.on_cancel_prompt();
        panel.on_confirmation_prompt(&mut store, &workflow, &backend).await;

        assert_eq!(store.workflow().open_start_time(), Some(0.0));
        assert_eq!(backend.stage_calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn failures_become_notifications() {
        let workflow = workflow();
        let backend = RecordingMutations {
            fail: true,
            ..RecordingMutations::default()
        };
        let mut store = AppStore::new("me");
        let mut panel = WorkflowPanel::new();
        let first = al1(0.0);

        panel
            .show_confirmation_prompt(&mut store, &workflow, &backend, IntervalRef::Stage(&first))
            .await;

        assert!(!store.workflow().is_open());
        let notes = panel.drain_notifications();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.starts_with("Failed to open AL1"), "{notes:?}");
        assert!(panel.notifications().is_empty());
    }

    #[tokio::test]
    async fn open_anything_closes_the_current_stage_first() {
        let (workflow, backend) = (workflow(), RecordingMutations::default());
        let mut store = AppStore::new("me");
        let mut panel = WorkflowPanel::new();
        let target = OpenAnythingInterval {
            open_interval_name: "AL1".into(),
            time_range: TimeRange::new(86_400.0, 93_600.0),
            station_group: group("ALL_3"),
        };

        panel.show_open_anything_confirmation_prompt(&mut store, &workflow, target.clone());
        assert!(!panel.is_confirmation_prompt_visible());
        assert_eq!(store.workflow().open_activity_names, vec!["Event Review".to_string()]);
        assert!(backend.stage_calls.borrow().is_empty());

        let next = OpenAnythingInterval {
            time_range: TimeRange::new(0.0, 7_200.0),
            ..target
        };
        panel.show_open_anything_confirmation_prompt(&mut store, &workflow, next);
        assert!(panel.is_confirmation_prompt_visible());

        panel.on_confirmation_prompt(&mut store, &workflow, &backend).await;
        let calls = backend.stage_calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].status, IntervalStatus::NotComplete);
        assert_eq!(calls[0].stage_interval_id.start_time, 86_400.0);
        assert_eq!(store.workflow().time_range, Some(TimeRange::new(0.0, 7_200.0)));
    }
}
