mod backend;
mod desk;

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use wasm_bindgen::prelude::*;
use workflow_desk_core::config::WorkflowDisplayConfig;
use workflow_desk_core::store::HistoryCommand;

use backend::JsBackend;
use desk::{Desk, IntervalTarget, OpenAnythingRequest};

pub use desk::STAGE_INTERVALS_REQUEST;

static DESK: Mutex<Option<Desk>> = Mutex::new(None);

fn lock() -> Result<MutexGuard<'static, Option<Desk>>, JsError> {
    DESK.lock().map_err(|_| JsError::new("desk state poisoned"))
}

fn to_js(error: &anyhow::Error) -> JsError {
    JsError::new(&format!("{error:#}"))
}

fn with_desk<T>(f: impl FnOnce(&mut Desk) -> Result<T>) -> Result<T, JsError> {
    let mut guard = lock()?;
    let desk = guard
        .as_mut()
        .ok_or_else(|| JsError::new("desk not initialized or busy with a backend call"))?;
    f(desk).map_err(|e| to_js(&e))
}

/// Move the desk out for the duration of a backend call. Calls made while it
/// is out fail as busy.
fn take_desk() -> Result<Desk, JsError> {
    lock()?
        .take()
        .ok_or_else(|| JsError::new("desk not initialized or busy with a backend call"))
}

fn restore_desk(desk: Desk) -> Result<(), JsError> {
    *lock()? = Some(desk);
    Ok(())
}

fn parse_target(json: &str) -> Result<IntervalTarget, JsError> {
    serde_json::from_str(json)
        .context("parsing interval target")
        .map_err(|e| to_js(&e))
}

/// Start a session for `username`. `config_json` may be empty for defaults.
#[wasm_bindgen]
pub fn init_desk(username: &str, config_json: &str) -> Result<(), JsError> {
    let config = if config_json.trim().is_empty() {
        WorkflowDisplayConfig::default()
    } else {
        WorkflowDisplayConfig::from_json(config_json.as_bytes())
            .map_err(|e| JsError::new(&e.to_string()))?
    };
    *lock()? = Some(Desk::new(username, config));
    Ok(())
}

#[wasm_bindgen]
pub fn load_workflow(json: &str) -> Result<(), JsError> {
    with_desk(|desk| desk.load_workflow(json))
}

/// Register an outgoing request for `key` and return its id. Stage interval
/// fetches use `"stageIntervals"`.
#[wasm_bindgen]
pub fn begin_request(key: &str) -> Result<String, JsError> {
    with_desk(|desk| Ok(desk.begin_request(key).to_string()))
}

#[wasm_bindgen]
pub fn is_request_pending(key: &str) -> Result<bool, JsError> {
    with_desk(|desk| Ok(desk.is_request_pending(key)))
}

/// Returns `false` when the response belongs to a request that is no longer
/// tracked and was dropped.
#[wasm_bindgen]
#[allow(clippy::needless_pass_by_value)]
pub fn load_stage_intervals(json: &str, request_id: Option<String>) -> Result<bool, JsError> {
    with_desk(|desk| desk.load_stage_intervals(json, request_id.as_deref()))
}

#[wasm_bindgen]
pub fn load_operational_period(json: &str) -> Result<(), JsError> {
    with_desk(|desk| desk.load_operational_period(json))
}

/// Lay out the table for the current scroll position. Returns a JSON
/// `TableFrame`.
#[wasm_bindgen]
pub fn render_table(client_width: f64) -> Result<String, JsError> {
    with_desk(|desk| Ok(serde_json::to_string(&desk.render_table(client_width)?)?))
}

#[wasm_bindgen]
pub fn toggle_stage(stage_name: &str) -> Result<bool, JsError> {
    with_desk(|desk| desk.toggle_stage(stage_name))
}

/// Grid scroll event. Returns whether the synchronized regions moved.
#[wasm_bindgen]
pub fn on_scroll(scroll_left: f64) -> Result<bool, JsError> {
    with_desk(|desk| Ok(desk.on_scroll(scroll_left)))
}

#[wasm_bindgen]
pub fn on_wheel(dx: f64, dy: f64, shift: bool) -> Result<Option<f64>, JsError> {
    with_desk(|desk| Ok(desk.on_wheel(dx, dy, shift)))
}

/// Pan by `seconds` and return the new scroll position.
#[wasm_bindgen]
pub fn pan_by(seconds: f64) -> Result<f64, JsError> {
    with_desk(|desk| desk.pan_by(seconds))
}

#[wasm_bindgen]
pub fn scroll_to_end() -> Result<f64, JsError> {
    with_desk(|desk| Ok(desk.scroll_to_end()))
}

/// The time range under the grid viewport as JSON.
#[wasm_bindgen]
pub fn visible_time_range() -> Result<String, JsError> {
    with_desk(|desk| Ok(serde_json::to_string(&desk.visible_time_range()?)?))
}

/// The interval of `stage_name` to open by default, as JSON, if any.
#[wasm_bindgen]
pub fn best_interval(stage_name: &str) -> Result<Option<String>, JsError> {
    with_desk(|desk| {
        desk.best_interval(stage_name)
            .map(serde_json::to_string)
            .transpose()
            .map_err(Into::into)
    })
}

/// Open the clicked interval, or show the confirmation prompt when another
/// one is open. `target_json` is `{stageName, startTime, activityName?}`.
/// Returns whether the prompt is showing.
#[wasm_bindgen]
#[allow(clippy::needless_pass_by_value)]
pub async fn request_open_interval(
    target_json: String,
    backend: js_sys::Function,
) -> Result<bool, JsError> {
    let target = parse_target(&target_json)?;
    let mut desk = take_desk()?;
    let result = desk.request_open(&target, &JsBackend::new(backend)).await;
    restore_desk(desk)?;
    result.map_err(|e| to_js(&e))
}

/// `request_json` is `{stageName, startTime, endTime, stationGroup}`.
/// Returns whether the prompt is showing.
#[wasm_bindgen]
pub fn request_open_anything(request_json: &str) -> Result<bool, JsError> {
    with_desk(|desk| {
        let request: OpenAnythingRequest =
            serde_json::from_str(request_json).context("parsing open anything request")?;
        desk.request_open_anything(request)
    })
}

/// The analyst accepted the confirmation prompt.
#[wasm_bindgen]
pub async fn confirm_prompt(backend: js_sys::Function) -> Result<(), JsError> {
    let mut desk = take_desk()?;
    let result = desk.confirm_prompt(&JsBackend::new(backend)).await;
    restore_desk(desk)?;
    result.map_err(|e| to_js(&e))
}

#[wasm_bindgen]
pub fn cancel_prompt() -> Result<(), JsError> {
    with_desk(|desk| {
        desk.cancel_prompt();
        Ok(())
    })
}

#[wasm_bindgen]
#[allow(clippy::needless_pass_by_value)]
pub async fn request_close_interval(
    target_json: String,
    backend: js_sys::Function,
) -> Result<(), JsError> {
    let target = parse_target(&target_json)?;
    let mut desk = take_desk()?;
    let result = desk.request_close(&target, &JsBackend::new(backend)).await;
    restore_desk(desk)?;
    result.map_err(|e| to_js(&e))
}

/// Failure messages for the host to toast, as a JSON array of strings.
#[wasm_bindgen]
pub fn take_notifications() -> Result<String, JsError> {
    with_desk(|desk| Ok(serde_json::to_string(&desk.take_notifications())?))
}

/// Apply a `{type, payload}` data action.
#[wasm_bindgen]
pub fn dispatch_data(json: &str) -> Result<(), JsError> {
    with_desk(|desk| desk.dispatch_data(json))
}

#[wasm_bindgen]
pub fn set_open_event(event_id: Option<String>) -> Result<(), JsError> {
    with_desk(|desk| desk.set_open_event(event_id))
}

/// Event ids a signal detection is associated to, as JSON.
#[wasm_bindgen]
pub fn associated_events(signal_detection_id: &str) -> Result<String, JsError> {
    with_desk(|desk| Ok(serde_json::to_string(&desk.associated_events(signal_detection_id))?))
}

/// `"GLOBAL"` or `"EVENT"`; omit to toggle.
#[wasm_bindgen]
#[allow(clippy::needless_pass_by_value)]
pub fn set_history_mode(mode: Option<String>) -> Result<(), JsError> {
    with_desk(|desk| desk.set_history_mode(mode.as_deref()))
}

#[wasm_bindgen]
pub fn undo(count: usize) -> Result<(), JsError> {
    with_desk(|desk| desk.history(HistoryCommand::Undo(count)))
}

#[wasm_bindgen]
pub fn redo(count: usize) -> Result<(), JsError> {
    with_desk(|desk| desk.history(HistoryCommand::Redo(count)))
}

#[wasm_bindgen]
pub fn undo_by_id(id: &str) -> Result<(), JsError> {
    with_desk(|desk| desk.undo_by_id(id))
}

#[wasm_bindgen]
pub fn redo_by_id(id: &str) -> Result<(), JsError> {
    with_desk(|desk| desk.redo_by_id(id))
}

#[wasm_bindgen]
pub fn event_undo(event_id: &str, count: usize) -> Result<(), JsError> {
    with_desk(|desk| {
        desk.history(HistoryCommand::EventUndo {
            event_id: event_id.to_string(),
            count,
        })
    })
}

#[wasm_bindgen]
pub fn event_redo(event_id: &str, count: usize) -> Result<(), JsError> {
    with_desk(|desk| {
        desk.history(HistoryCommand::EventRedo {
            event_id: event_id.to_string(),
            count,
        })
    })
}

/// History mode and global stack position as JSON.
#[wasm_bindgen]
pub fn history_positions() -> Result<String, JsError> {
    with_desk(|desk| Ok(serde_json::to_string(&desk.history_positions())?))
}
