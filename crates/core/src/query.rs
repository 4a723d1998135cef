//! Shapes and hooks of the query layer that feeds the workflow display.
//!
//! Fetching lives outside this crate. What the core needs from it is the
//! operational period configuration, a way to evict stale cached intervals,
//! and bookkeeping that lets late responses be recognised and dropped.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::TimeRange;

/// Retention window of the operational data, as durations in seconds
/// measured back from the newest interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalTimePeriodConfiguration {
    pub operational_period_start: f64,
    pub operational_period_end: f64,
}

impl OperationalTimePeriodConfiguration {
    pub fn duration(&self) -> f64 {
        self.operational_period_start - self.operational_period_end
    }

    /// Leading edge of the retention window for the given data range.
    /// Intervals ending at or before this time are stale.
    pub fn operational_start_time(&self, intervals_range: Option<TimeRange>) -> Option<f64> {
        intervals_range.map(|r| r.end_time_secs - self.duration())
    }
}

/// Cache of stage-interval query results that can drop entries older than
/// a boundary.
pub trait StageIntervalCache {
    fn cleanup(&mut self, boundary_secs: f64);
}

/// Tracks in-flight requests per argument key so that a response can be
/// matched to a request that is still wanted.
#[derive(Debug, Default)]
pub struct RequestTracker {
    pending: HashMap<String, HashSet<Uuid>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request for `key` and return its id.
    pub fn begin(&mut self, key: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.pending.entry(key.into()).or_default().insert(id);
        id
    }

    /// Mark a response as arrived. Returns `false` when the request is no
    /// longer tracked, in which case the response must be discarded.
    pub fn complete(&mut self, key: &str, id: Uuid) -> bool {
        let Some(ids) = self.pending.get_mut(key) else {
            tracing::warn!(key, %id, "discarding response for untracked request");
            return false;
        };
        if !ids.remove(&id) {
            tracing::warn!(key, %id, "discarding stale response");
            return false;
        }
        if ids.is_empty() {
            self.pending.remove(key);
        }
        true
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.get(key).is_some_and(|ids| !ids.is_empty())
    }

    pub fn pending_count(&self) -> usize {
        self.pending.values().map(HashSet::len).sum()
    }

    /// Forget every in-flight request, e.g. after the open interval changed.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operational_start_is_end_minus_duration() {
        let config = OperationalTimePeriodConfiguration {
            operational_period_start: 86_400.0,
            operational_period_end: 3_600.0,
        };
        let range = TimeRange::new(0.0, 200_000.0);
        assert_eq!(config.duration(), 82_800.0);
        assert_eq!(config.operational_start_time(Some(range)), Some(117_200.0));
        assert_eq!(config.operational_start_time(None), None);
    }

    #[test]
    fn tracked_response_is_accepted_once() {
        let mut tracker = RequestTracker::new();
        let id = tracker.begin("AL1:3600");
        assert!(tracker.is_pending("AL1:3600"));
        assert!(tracker.complete("AL1:3600", id));
        assert!(!tracker.complete("AL1:3600", id));
        assert_eq!(tracker.pending_count(), 0);
    }

    #[test]
    fn cleared_requests_are_discarded() {
        let mut tracker = RequestTracker::new();
        let a = tracker.begin("sd");
        let b = tracker.begin("sd");
        assert_eq!(tracker.pending_count(), 2);
        tracker.clear();
        assert!(!tracker.complete("sd", a));
        assert!(!tracker.complete("sd", b));
    }
}
