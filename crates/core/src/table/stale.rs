use crate::query::StageIntervalCache;
use crate::scale::start_of_hour;

/// Earliest of the present times, floored to its UTC hour; `0` when none is
/// known.
pub fn stale_cleanup_boundary(
    viewable_min_start_time: Option<f64>,
    open_interval_start_time: Option<f64>,
    operational_start_time: Option<f64>,
) -> f64 {
    [viewable_min_start_time, open_interval_start_time, operational_start_time]
        .into_iter()
        .flatten()
        .filter(|t| t.is_finite())
        .reduce(f64::min)
        .map_or(0.0, start_of_hour)
}

/// Calls [`StageIntervalCache::cleanup`] whenever the boundary or the
/// interval data changes.
#[derive(Debug, Default)]
pub struct StaleDataCleanup {
    last_boundary: Option<f64>,
    last_generation: Option<u64>,
}

impl StaleDataCleanup {
    pub fn new() -> Self {
        Self::default()
    }

    /// `generation` identifies the current interval data set. Returns
    /// whether cleanup ran.
    pub fn update<C: StageIntervalCache + ?Sized>(
        &mut self,
        cache: &mut C,
        boundary_secs: f64,
        generation: u64,
    ) -> bool {
        if self.last_boundary == Some(boundary_secs) && self.last_generation == Some(generation) {
            return false;
        }
        tracing::debug!(
            boundary_secs,
            generation,
            previous = ?self.last_boundary,
            "stale data boundary changed"
        );
        self.last_boundary = Some(boundary_secs);
        self.last_generation = Some(generation);
        cache.cleanup(boundary_secs);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Cache {
        calls: Vec<f64>,
    }

    impl StageIntervalCache for Cache {
        fn cleanup(&mut self, boundary_secs: f64) {
            self.calls.push(boundary_secs);
        }
    }

    #[test]
    fn boundary_is_the_earliest_floored() {
        assert_eq!(stale_cleanup_boundary(Some(7_300.0), Some(3_700.0), Some(90_000.0)), 3_600.0);
        assert_eq!(stale_cleanup_boundary(None, None, Some(90_500.0)), 90_000.0);
        assert_eq!(stale_cleanup_boundary(None, None, None), 0.0);
    }

    #[test]
    fn cleanup_runs_on_change_only() {
        let mut cache = Cache::default();
        let mut cleanup = StaleDataCleanup::new();
        assert!(cleanup.update(&mut cache, 3_600.0, 1));
        assert!(!cleanup.update(&mut cache, 3_600.0, 1));
        assert!(cleanup.update(&mut cache, 3_600.0, 2));
        assert!(cleanup.update(&mut cache, 7_200.0, 2));
        assert_eq!(cache.calls, vec![3_600.0, 3_600.0, 7_200.0]);
    }
}
