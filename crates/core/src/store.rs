//! The application store: workflow-open state, analyst selection, the data
//! store and its history, behind a single dispatch.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::data::{DataAction, DataState, Patch};
use crate::history::{HistoryError, HistoryMode, HistoryState, capture};
use crate::model::{AnalysisMode, StationGroup, TimeRange};
use crate::query::RequestTracker;
use crate::state::{WorkflowAction, WorkflowState};

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("{0} requires at least one target id")]
    MissingTargetIds(&'static str),
    #[error(transparent)]
    History(#[from] HistoryError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalystState {
    pub open_event_id: Option<String>,
    pub selected_signal_detection_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalystAction {
    SetOpenEventId(Option<String>),
    SetSelectedSignalDetectionIds(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryCommand {
    Undo(usize),
    Redo(usize),
    UndoById(Uuid),
    RedoById(Uuid),
    EventUndo { event_id: String, count: usize },
    EventRedo { event_id: String, count: usize },
    SetMode(Option<HistoryMode>),
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Workflow(WorkflowAction),
    Analyst(AnalystAction),
    Data(DataAction),
    History(HistoryCommand),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Workflow(a) => a.name(),
            Action::Analyst(AnalystAction::SetOpenEventId(_)) => "analyst/setOpenEventId",
            Action::Analyst(AnalystAction::SetSelectedSignalDetectionIds(_)) => {
                "analyst/setSelectedSignalDetectionIds"
            }
            Action::Data(a) => a.name(),
            Action::History(HistoryCommand::Undo(_)) => "history/undo",
            Action::History(HistoryCommand::Redo(_)) => "history/redo",
            Action::History(HistoryCommand::UndoById(_)) => "history/undoById",
            Action::History(HistoryCommand::RedoById(_)) => "history/redoById",
            Action::History(HistoryCommand::EventUndo { .. }) => "history/eventUndo",
            Action::History(HistoryCommand::EventRedo { .. }) => "history/eventRedo",
            Action::History(HistoryCommand::SetMode(_)) => "history/setMode",
            Action::History(HistoryCommand::Clear) => "history/clear",
        }
    }
}

#[derive(Debug)]
pub struct AppStore {
    username: String,
    workflow: WorkflowState,
    analyst: AnalystState,
    data: DataState,
    history: HistoryState,
    requests: RequestTracker,
}

impl AppStore {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            workflow: WorkflowState::default(),
            analyst: AnalystState::default(),
            data: DataState::default(),
            history: HistoryState::default(),
            requests: RequestTracker::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn workflow(&self) -> &WorkflowState {
        &self.workflow
    }

    pub fn analyst(&self) -> &AnalystState {
        &self.analyst
    }

    pub fn data(&self) -> &DataState {
        &self.data
    }

    pub fn history(&self) -> &HistoryState {
        &self.history
    }

    pub fn requests(&self) -> &RequestTracker {
        &self.requests
    }

    pub fn requests_mut(&mut self) -> &mut RequestTracker {
        &mut self.requests
    }

    /// Reduce `action` into the store.
    ///
    /// Undoable data actions are committed first and then recorded on the
    /// history stack picked by the history mode. Undoable actions that name
    /// no targets are refused before anything changes.
    pub fn dispatch(&mut self, action: Action) -> Result<(), StoreError> {
        tracing::debug!(action = action.name(), "dispatch");
        match action {
            Action::Workflow(a) => self.workflow.apply(a),
            Action::Analyst(AnalystAction::SetOpenEventId(id)) => self.analyst.open_event_id = id,
            Action::Analyst(AnalystAction::SetSelectedSignalDetectionIds(ids)) => {
                self.analyst.selected_signal_detection_ids = ids;
            }
            Action::Data(a) => self.dispatch_data(&a)?,
            Action::History(command) => self.dispatch_history(command)?,
        }
        Ok(())
    }

    fn dispatch_data(&mut self, action: &DataAction) -> Result<(), StoreError> {
        if !action.is_undoable() {
            action.apply(&mut self.data);
            return Ok(());
        }
        if action.is_missing_targets() {
            return Err(StoreError::MissingTargetIds(action.name()));
        }
        let before = self.data.clone();
        action.apply(&mut self.data);
        if let Some(item) = capture(action, &before, &self.data) {
            self.history.record(item, self.analyst.open_event_id.as_deref());
        }
        Ok(())
    }

    fn dispatch_history(&mut self, command: HistoryCommand) -> Result<(), StoreError> {
        let patches = match command {
            HistoryCommand::Undo(count) => self.history.stack.undo(count),
            HistoryCommand::Redo(count) => self.history.stack.redo(count),
            HistoryCommand::UndoById(id) => self.history.stack.undo_by_id(id)?,
            HistoryCommand::RedoById(id) => self.history.stack.redo_by_id(id)?,
            HistoryCommand::EventUndo { event_id, count } => {
                self.history.event_undo(&event_id, count)?
            }
            HistoryCommand::EventRedo { event_id, count } => {
                self.history.event_redo(&event_id, count)?
            }
            HistoryCommand::SetMode(mode) => {
                self.history.set_mode(mode);
                Vec::new()
            }
            HistoryCommand::Clear => {
                self.history.clear();
                Vec::new()
            }
        };
        self.replay(&patches);
        Ok(())
    }

    fn replay(&mut self, patches: &[Patch]) {
        if patches.is_empty() {
            return;
        }
        tracing::debug!(patches = patches.len(), "replaying history patches");
        self.data.apply_patches(patches);
    }

    /// Open `name` over `time_range`. Switching to a different interval or
    /// time range starts a fresh session first.
    pub fn set_open_interval(
        &mut self,
        time_range: TimeRange,
        station_group: Option<StationGroup>,
        name: &str,
        activity_names: Vec<String>,
        analysis_mode: Option<AnalysisMode>,
    ) {
        let changed = self.workflow.open_interval_name.as_deref() != Some(name)
            || self.workflow.time_range.is_some_and(|r| r != time_range);
        if changed {
            self.reset_to_default_state();
        }
        for action in [
            WorkflowAction::SetTimeRange(Some(time_range)),
            WorkflowAction::SetStationGroup(station_group),
            WorkflowAction::SetOpenIntervalName(Some(name.to_string())),
            WorkflowAction::SetOpenActivityNames(activity_names),
            WorkflowAction::SetAnalysisMode(analysis_mode),
        ] {
            tracing::debug!(action = action.name(), "dispatch");
            self.workflow.apply(action);
        }
    }

    /// Close one activity. Closing a stage interval, or the last open
    /// activity, ends the session.
    pub fn set_closed_interval(&mut self, activity_name: &str, is_stage_interval: bool) {
        if self.workflow.open_activity_names.len() <= 1 || is_stage_interval {
            self.reset_to_default_state();
            return;
        }
        let remaining = self
            .workflow
            .open_activity_names
            .iter()
            .filter(|n| n.as_str() != activity_name)
            .cloned()
            .collect();
        self.workflow.apply(WorkflowAction::SetOpenActivityNames(remaining));
    }

    /// Drop everything tied to the open interval, history mode included.
    pub fn reset_to_default_state(&mut self) {
        tracing::info!(
            interval = self.workflow.open_interval_name.as_deref(),
            "resetting session state"
        );
        self.workflow = WorkflowState::default();
        self.analyst = AnalystState::default();
        self.data = DataState::default();
        self.history.clear();
        self.requests.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{EventRecord, SignalDetectionRecord};
    use crate::history::HistoryStack;

    fn sd(id: &str) -> SignalDetectionRecord {
        SignalDetectionRecord {
            id: id.into(),
            station: "ASAR".into(),
            phase: "P".into(),
            arrival_time: 100.0,
            deleted: false,
        }
    }

    fn loaded_store() -> AppStore {
        let mut store = AppStore::new("me");
        store.set_open_interval(TimeRange::new(0.0, 7_200.0), None, "AL1", vec!["Scan".into()], None);
        let _ = store.dispatch(Action::Data(DataAction::LoadSignalDetections(vec![sd("sd1"), sd("sd2")])));
        let _ = store.dispatch(Action::Data(DataAction::LoadEvents(vec![EventRecord::new("ev1", 50.0)])));
        store
    }

    fn phase_of(store: &AppStore, id: &str) -> Option<String> {
        store.data().signal_detections.get(id).map(|sd| sd.phase.clone())
    }

    fn set_phase(id: &str, phase: &str) -> Action {
        Action::Data(DataAction::UpdatePhase {
            signal_detection_ids: vec![id.into()],
            phase: phase.into(),
        })
    }

    #[test]
    fn loads_are_not_recorded() {
        let store = loaded_store();
        assert_eq!(store.data().signal_detections.len(), 2);
        assert!(store.history().stack.is_empty());
    }

    #[test]
    fn undo_and_redo_replay_patches() {
        let mut store = loaded_store();
        assert_eq!(store.dispatch(set_phase("sd1", "Pn")), Ok(()));
        assert_eq!(store.dispatch(set_phase("sd1", "Pg")), Ok(()));
        assert_eq!(store.history().stack.position(), 1);

        assert_eq!(store.dispatch(Action::History(HistoryCommand::Undo(1))), Ok(()));
        assert_eq!(phase_of(&store, "sd1").as_deref(), Some("Pn"));
        assert_eq!(store.dispatch(Action::History(HistoryCommand::Undo(5))), Ok(()));
        assert_eq!(phase_of(&store, "sd1").as_deref(), Some("P"));
        assert_eq!(store.dispatch(Action::History(HistoryCommand::Redo(2))), Ok(()));
        assert_eq!(phase_of(&store, "sd1").as_deref(), Some("Pg"));
    }

    #[test]
    fn zero_change_actions_are_not_recorded() {
        let mut store = loaded_store();
        assert_eq!(store.dispatch(set_phase("sd1", "P")), Ok(()));
        assert!(store.history().stack.is_empty());
    }

    #[test]
    fn missing_targets_are_refused() {
        let mut store = loaded_store();
        let result = store.dispatch(Action::Data(DataAction::DeleteEvents { event_ids: vec![] }));
        assert_eq!(result, Err(StoreError::MissingTargetIds("data/deleteEvents")));
        assert!(store.history().stack.is_empty());
    }

    #[test]
    fn unknown_history_id_is_an_error() {
        let mut store = loaded_store();
        let id = Uuid::new_v4();
        let result = store.dispatch(Action::History(HistoryCommand::UndoById(id)));
        assert_eq!(result, Err(StoreError::History(HistoryError::EntryNotFound(id))));
    }

    #[test]
    fn opening_an_event_keeps_positions() {
        let mut store = loaded_store();
        let _ = store.dispatch(set_phase("sd1", "Pn"));
        let _ = store.dispatch(Action::History(HistoryCommand::Undo(1)));
        let _ = store.dispatch(Action::Analyst(AnalystAction::SetOpenEventId(Some("ev1".into()))));
        assert_eq!(store.history().stack.position(), -1);
        assert!(store.history().stack.can_redo());
    }

    #[test]
    fn event_mode_records_against_the_open_event() {
        let mut store = loaded_store();
        let _ = store.dispatch(Action::History(HistoryCommand::SetMode(Some(HistoryMode::Event))));
        let _ = store.dispatch(Action::Analyst(AnalystAction::SetOpenEventId(Some("ev1".into()))));
        let _ = store.dispatch(Action::Data(DataAction::AssociateSignalDetections {
            event_id: "ev1".into(),
            signal_detection_ids: vec!["sd1".into()],
        }));
        assert!(store.history().stack.is_empty());
        assert_eq!(store.history().event_stack("ev1").map(HistoryStack::len), Some(1));

        let undo = HistoryCommand::EventUndo {
            event_id: "ev1".into(),
            count: 1,
        };
        assert_eq!(store.dispatch(Action::History(undo)), Ok(()));
        let associated = store
            .data()
            .events
            .get("ev1")
            .map(|e| e.associated_signal_detection_ids.len());
        assert_eq!(associated, Some(0));
    }

    #[test]
    fn changing_interval_resets_the_session() {
        let mut store = loaded_store();
        let _ = store.dispatch(set_phase("sd1", "Pn"));
        let _ = store.dispatch(Action::Analyst(AnalystAction::SetOpenEventId(Some("ev1".into()))));
        store.requests_mut().begin("events");

        // Same interval: nothing is lost.
        store.set_open_interval(
            TimeRange::new(0.0, 7_200.0),
            None,
            "AL1",
            vec!["Scan".into(), "Event Review".into()],
            None,
        );
        assert_eq!(store.history().stack.len(), 1);
        assert_eq!(store.analyst().open_event_id.as_deref(), Some("ev1"));

        store.set_open_interval(TimeRange::new(7_200.0, 14_400.0), None, "AL1", vec!["Scan".into()], None);
        assert!(store.history().stack.is_empty());
        assert!(store.data().signal_detections.is_empty());
        assert_eq!(store.analyst().open_event_id, None);
        assert_eq!(store.requests().pending_count(), 0);
        assert_eq!(store.workflow().open_start_time(), Some(7_200.0));
    }

    #[test]
    fn new_interval_returns_to_global_history() {
        let mut store = loaded_store();
        let _ = store.dispatch(Action::History(HistoryCommand::SetMode(Some(HistoryMode::Event))));
        store.set_open_interval(TimeRange::new(0.0, 7_200.0), None, "AL1", vec!["Scan".into()], None);
        assert_eq!(store.history().mode, HistoryMode::Event);

        store.set_open_interval(TimeRange::new(7_200.0, 14_400.0), None, "AL1", vec!["Scan".into()], None);
        assert_eq!(store.history().mode, HistoryMode::Global);
    }

    #[test]
    fn closing_activities() {
        let mut store = AppStore::new("me");
        store.set_open_interval(
            TimeRange::new(0.0, 7_200.0),
            None,
            "AL1",
            vec!["Scan".into(), "Event Review".into()],
            None,
        );
        store.set_closed_interval("Scan", false);
        assert_eq!(store.workflow().open_activity_names, vec!["Event Review".to_string()]);
        assert!(store.workflow().is_open());

        store.set_closed_interval("Event Review", false);
        assert!(!store.workflow().is_open());
        assert_eq!(store.workflow().time_range, None);

        store.set_open_interval(
            TimeRange::new(0.0, 7_200.0),
            None,
            "AL1",
            vec!["Scan".into(), "Event Review".into()],
            None,
        );
        store.set_closed_interval("Scan", true);
        assert!(!store.workflow().is_open());
    }
}
