use async_trait::async_trait;
use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use workflow_desk_core::state::{
    IntervalMutations, MutationError, UpdateActivityIntervalStatusParams,
    UpdateStageIntervalStatusParams,
};

/// Interval status mutations sent through a host callback.
///
/// The callback is called as `callback(kind, paramsJson)` and may return a
/// promise; a rejected promise or a thrown error fails the mutation.
pub struct JsBackend {
    callback: js_sys::Function,
}

impl JsBackend {
    pub fn new(callback: js_sys::Function) -> Self {
        Self { callback }
    }

    async fn send(&self, kind: &str, params: &impl Serialize) -> Result<(), MutationError> {
        let json = serde_json::to_string(params).map_err(|e| MutationError::Backend(e.to_string()))?;
        let returned = self
            .callback
            .call2(&JsValue::NULL, &JsValue::from_str(kind), &JsValue::from_str(&json))
            .map_err(|e| describe(&e))?;
        JsFuture::from(js_sys::Promise::resolve(&returned))
            .await
            .map_err(|e| describe(&e))?;
        Ok(())
    }
}

fn describe(error: &JsValue) -> MutationError {
    MutationError::Backend(error.as_string().unwrap_or_else(|| format!("{error:?}")))
}

#[async_trait(?Send)]
impl IntervalMutations for JsBackend {
    async fn update_stage_interval_status(
        &self,
        params: UpdateStageIntervalStatusParams,
    ) -> Result<(), MutationError> {
        self.send("updateStageIntervalStatus", &params).await
    }

    async fn update_activity_interval_status(
        &self,
        params: UpdateActivityIntervalStatusParams,
    ) -> Result<(), MutationError> {
        self.send("updateActivityIntervalStatus", &params).await
    }
}
