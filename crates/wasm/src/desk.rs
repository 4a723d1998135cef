use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use workflow_desk_core::classify::{get_best_interval, get_time_range_for_intervals};
use workflow_desk_core::config::WorkflowDisplayConfig;
use workflow_desk_core::data::DataAction;
use workflow_desk_core::history::HistoryMode;
use workflow_desk_core::model::{
    Interval, IntervalRef, StageInterval, StageIntervalEntry, StationGroup, TimeRange, Workflow,
};
use workflow_desk_core::query::{OperationalTimePeriodConfiguration, StageIntervalCache};
use workflow_desk_core::scale::TimeScale;
use workflow_desk_core::state::{IntervalMutations, OpenAnythingInterval, WorkflowPanel};
use workflow_desk_core::store::{Action, AnalystAction, AppStore, HistoryCommand};
use workflow_desk_core::table::{ScrollSync, StaleDataCleanup, WorkflowTable, stale_cleanup_boundary};
use workflow_desk_core::views::{day_boundary, interval_table, time_axis};
use workflow_desk_protocol::LayoutCommand;

/// Request key the host uses when it fetches stage intervals.
pub const STAGE_INTERVALS_REQUEST: &str = "stageIntervals";

/// Everything the browser front-end drives through the bridge.
pub struct Desk {
    config: WorkflowDisplayConfig,
    store: AppStore,
    workflow: Option<Workflow>,
    table: Option<WorkflowTable>,
    intervals: IntervalCache,
    operational_period: Option<OperationalTimePeriodConfiguration>,
    scroll: ScrollSync,
    cleanup: StaleDataCleanup,
    panel: WorkflowPanel,
}

/// Stage intervals as last delivered by the query layer.
#[derive(Default)]
struct IntervalCache {
    entries: Vec<StageIntervalEntry>,
    generation: u64,
}

impl StageIntervalCache for IntervalCache {
    fn cleanup(&mut self, boundary_secs: f64) {
        for entry in &mut self.entries {
            entry.value.retain(|i| i.end_time() > boundary_secs);
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableFrame {
    pub grid: Vec<LayoutCommand>,
    pub row_labels: Vec<LayoutCommand>,
    pub time_axis: Vec<LayoutCommand>,
    pub day_boundaries: Vec<LayoutCommand>,
    pub table_height: f64,
    pub scroll_width: f64,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPositions {
    pub mode: HistoryMode,
    pub position: isize,
    pub length: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// A table cell the analyst clicked: a stage interval, or one of its
/// activities when `activity_name` is set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalTarget {
    pub stage_name: String,
    pub start_time: f64,
    #[serde(default)]
    pub activity_name: Option<String>,
}

impl IntervalTarget {
    fn find<'a>(&self, entries: &'a [StageIntervalEntry]) -> Result<IntervalRef<'a>> {
        let stage = entries
            .iter()
            .find(|e| e.name == self.stage_name)
            .and_then(|e| e.value.iter().find(|i| i.start_time() == self.start_time))
            .ok_or_else(|| {
                anyhow!("no {} interval starts at {}", self.stage_name, self.start_time)
            })?;
        let Some(activity_name) = self.activity_name.as_deref() else {
            return Ok(IntervalRef::Stage(stage));
        };
        stage
            .activity_intervals()
            .and_then(|activities| activities.iter().find(|a| a.interval_id.name() == activity_name))
            .map(IntervalRef::Activity)
            .ok_or_else(|| anyhow!("{} has no {activity_name} activity", self.stage_name))
    }
}

/// A stage and time range typed into the "open anything" dialog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAnythingRequest {
    pub stage_name: String,
    pub start_time: f64,
    pub end_time: f64,
    pub station_group: StationGroup,
}

impl Desk {
    pub fn new(username: &str, config: WorkflowDisplayConfig) -> Self {
        Self {
            scroll: ScrollSync::new(0.0, 0.0, config.scroll_noise_px),
            config,
            store: AppStore::new(username),
            workflow: None,
            table: None,
            intervals: IntervalCache::default(),
            operational_period: None,
            cleanup: StaleDataCleanup::new(),
            panel: WorkflowPanel::new(),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &AppStore {
        &self.store
    }

    fn time_range(&self) -> Result<TimeRange> {
        get_time_range_for_intervals(&self.intervals.entries)
            .ok_or_else(|| anyhow!("no stage intervals loaded"))
    }

    fn scale(&self) -> Result<TimeScale> {
        let table = self.table.as_ref().ok_or_else(|| anyhow!("no workflow loaded"))?;
        Ok(table.scale(self.time_range()?))
    }

    pub fn load_workflow(&mut self, json: &str) -> Result<()> {
        let workflow = Workflow::from_json(json.as_bytes()).context("loading workflow")?;
        self.table = Some(WorkflowTable::new(&workflow, self.config.clone()));
        self.workflow = Some(workflow);
        Ok(())
    }

    /// Replace the stage intervals. A response to a request that has since
    /// been superseded is discarded and `false` returned.
    pub fn load_stage_intervals(&mut self, json: &str, request_id: Option<&str>) -> Result<bool> {
        if let Some(id) = request_id {
            let id = Uuid::parse_str(id).context("parsing request id")?;
            if !self.store.requests_mut().complete(STAGE_INTERVALS_REQUEST, id) {
                return Ok(false);
            }
        }
        let entries: Vec<StageIntervalEntry> =
            serde_json::from_str(json).context("loading stage intervals")?;
        self.intervals.entries = entries;
        self.intervals.generation += 1;
        Ok(true)
    }

    pub fn load_operational_period(&mut self, json: &str) -> Result<()> {
        let period = serde_json::from_str(json).context("loading operational period")?;
        self.operational_period = Some(period);
        Ok(())
    }

    pub fn begin_request(&mut self, key: &str) -> Uuid {
        self.store.requests_mut().begin(key)
    }

    pub fn is_request_pending(&self, key: &str) -> bool {
        self.store.requests().is_pending(key)
    }

    /// Lay out the table for the current scroll position and run stale
    /// interval cleanup.
    pub fn render_table(&mut self, client_width: f64) -> Result<TableFrame> {
        let range = self.time_range()?;
        let workflow = self.workflow.as_ref().ok_or_else(|| anyhow!("no workflow loaded"))?;
        let table = self.table.as_ref().ok_or_else(|| anyhow!("no workflow loaded"))?;
        let scale = table.scale(range);

        if self.scroll.scroll_width != scale.total_width() || self.scroll.client_width != client_width {
            self.scroll.on_resize(client_width, scale.total_width());
        }
        let stale_start = self
            .operational_period
            .and_then(|p| p.operational_start_time(Some(range)));
        let boundary = stale_cleanup_boundary(
            Some(self.scroll.viewable_min_start_time(&scale)),
            self.store.workflow().open_start_time(),
            stale_start,
        );

        let scroll_left = self.scroll.scroll_left();
        let frame = {
            let cells = table.table_data(&self.intervals.entries, range);
            let visible = table.visible_cells(&scale, &cells, scroll_left, client_width);
            let overscan = self.config.horizontal_overscan_px;
            TableFrame {
                grid: interval_table::render_interval_table(
                    table,
                    workflow,
                    &scale,
                    &visible,
                    self.store.workflow(),
                    stale_start,
                ),
                row_labels: interval_table::render_row_labels(table),
                time_axis: time_axis::render_time_axis(&scale, &self.config, scroll_left, client_width),
                day_boundaries: day_boundary::render_day_boundaries(
                    &scale,
                    table.table_height(&cells),
                    scroll_left - overscan,
                    scroll_left + client_width + overscan,
                ),
                table_height: table.table_height(&cells),
                scroll_width: scale.total_width(),
            }
        };
        let generation = self.intervals.generation;
        self.cleanup.update(&mut self.intervals, boundary, generation);
        Ok(frame)
    }

    pub fn toggle_stage(&mut self, stage_name: &str) -> Result<bool> {
        let table = self.table.as_mut().ok_or_else(|| anyhow!("no workflow loaded"))?;
        table
            .toggle_expanded(stage_name)
            .ok_or_else(|| anyhow!("unknown stage {stage_name}"))
    }

    pub fn on_scroll(&mut self, scroll_left: f64) -> bool {
        self.scroll.on_scroll(scroll_left)
    }

    pub fn on_wheel(&mut self, dx: f64, dy: f64, shift: bool) -> Option<f64> {
        self.scroll.on_wheel(dx, dy, shift)
    }

    pub fn pan_by(&mut self, seconds: f64) -> Result<f64> {
        let scale = self.scale()?;
        Ok(self.scroll.pan_by(&scale, seconds))
    }

    /// Jump to the latest intervals. Returns the new scroll position.
    pub fn scroll_to_end(&mut self) -> f64 {
        self.scroll.scroll_to_end();
        self.scroll.scroll_left()
    }

    pub fn visible_time_range(&self) -> Result<TimeRange> {
        Ok(self.scroll.visible_time_range(&self.scale()?))
    }

    pub fn best_interval(&self, stage_name: &str) -> Option<&StageInterval> {
        let entry = self.intervals.entries.iter().find(|e| e.name == stage_name)?;
        get_best_interval(&entry.value, self.store.username())
    }

    /// Open `target`, or park it behind the confirmation prompt when a
    /// different interval is open. Returns whether the prompt is showing.
    pub async fn request_open<M: IntervalMutations + ?Sized>(
        &mut self,
        target: &IntervalTarget,
        mutations: &M,
    ) -> Result<bool> {
        let workflow = self.workflow.as_ref().ok_or_else(|| anyhow!("no workflow loaded"))?;
        let interval = target.find(&self.intervals.entries)?;
        self.panel
            .show_confirmation_prompt(&mut self.store, workflow, mutations, interval)
            .await;
        Ok(self.panel.is_confirmation_prompt_visible())
    }

    /// Returns whether the prompt is showing.
    pub fn request_open_anything(&mut self, request: OpenAnythingRequest) -> Result<bool> {
        let workflow = self.workflow.as_ref().ok_or_else(|| anyhow!("no workflow loaded"))?;
        let target = OpenAnythingInterval {
            open_interval_name: request.stage_name,
            time_range: TimeRange::new(request.start_time, request.end_time),
            station_group: request.station_group,
        };
        self.panel
            .show_open_anything_confirmation_prompt(&mut self.store, workflow, target);
        Ok(self.panel.is_confirmation_prompt_visible())
    }

    pub async fn confirm_prompt<M: IntervalMutations + ?Sized>(&mut self, mutations: &M) -> Result<()> {
        let workflow = self.workflow.as_ref().ok_or_else(|| anyhow!("no workflow loaded"))?;
        self.panel
            .on_confirmation_prompt(&mut self.store, workflow, mutations)
            .await;
        Ok(())
    }

    pub fn cancel_prompt(&mut self) {
        self.panel.on_cancel_prompt();
    }

    pub async fn request_close<M: IntervalMutations + ?Sized>(
        &mut self,
        target: &IntervalTarget,
        mutations: &M,
    ) -> Result<()> {
        let workflow = self.workflow.as_ref().ok_or_else(|| anyhow!("no workflow loaded"))?;
        let interval = target.find(&self.intervals.entries)?;
        self.panel
            .close_interval(&mut self.store, workflow, mutations, interval)
            .await;
        Ok(())
    }

    pub fn take_notifications(&mut self) -> Vec<String> {
        self.panel
            .drain_notifications()
            .into_iter()
            .map(|n| n.message)
            .collect()
    }

    pub fn dispatch_data(&mut self, json: &str) -> Result<()> {
        let action: DataAction = serde_json::from_str(json).context("parsing data action")?;
        Ok(self.store.dispatch(Action::Data(action))?)
    }

    pub fn set_open_event(&mut self, event_id: Option<String>) -> Result<()> {
        Ok(self
            .store
            .dispatch(Action::Analyst(AnalystAction::SetOpenEventId(event_id)))?)
    }

    /// `"GLOBAL"` or `"EVENT"`; anything else is rejected. `None` toggles.
    pub fn set_history_mode(&mut self, mode: Option<&str>) -> Result<()> {
        let mode = mode
            .map(|m| serde_json::from_value::<HistoryMode>(serde_json::Value::from(m)))
            .transpose()
            .context("parsing history mode")?;
        self.history(HistoryCommand::SetMode(mode))
    }

    pub fn history(&mut self, command: HistoryCommand) -> Result<()> {
        Ok(self.store.dispatch(Action::History(command))?)
    }

    pub fn undo_by_id(&mut self, id: &str) -> Result<()> {
        let id = Uuid::parse_str(id).context("parsing history id")?;
        self.history(HistoryCommand::UndoById(id))
    }

    pub fn redo_by_id(&mut self, id: &str) -> Result<()> {
        let id = Uuid::parse_str(id).context("parsing history id")?;
        self.history(HistoryCommand::RedoById(id))
    }

    pub fn history_positions(&self) -> HistoryPositions {
        let history = self.store.history();
        HistoryPositions {
            mode: history.mode,
            position: history.stack.position(),
            length: history.stack.len(),
            can_undo: history.stack.can_undo(),
            can_redo: history.stack.can_redo(),
        }
    }

    /// Ids of the live events a signal detection is associated to.
    pub fn associated_events(&self, signal_detection_id: &str) -> Vec<String> {
        self.store
            .data()
            .events_associated_to(signal_detection_id)
            .into_iter()
            .map(|e| e.id.clone())
            .collect()
    }
}
