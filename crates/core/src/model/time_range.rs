use serde::{Deserialize, Serialize};

/// A window of epoch seconds. An absent window is modelled as
/// `Option<TimeRange>::None` rather than with undefined bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_time_secs: f64,
    pub end_time_secs: f64,
}

impl TimeRange {
    pub fn new(start_time_secs: f64, end_time_secs: f64) -> Self {
        Self {
            start_time_secs,
            end_time_secs,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time_secs - self.start_time_secs
    }

    pub fn contains(&self, time_secs: f64) -> bool {
        time_secs >= self.start_time_secs && time_secs <= self.end_time_secs
    }
}
