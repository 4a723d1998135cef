//! Mapping between epoch seconds and table pixels.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};

use crate::model::TimeRange;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Calendar-friendly tick steps in seconds, smallest first.
const TICK_STEPS: &[f64] = &[
    60.0,
    300.0,
    900.0,
    1_800.0,
    3_600.0,
    7_200.0,
    10_800.0,
    21_600.0,
    43_200.0,
    SECONDS_PER_DAY,
    2.0 * SECONDS_PER_DAY,
    7.0 * SECONDS_PER_DAY,
];

/// Pixel width of the span `[start_time, end_time]`.
///
/// Cell sizing and [`TimeScale`] both go through this so that widths
/// re-derived per cell always match the scale.
pub fn calculate_width(start_time: f64, end_time: f64, pixels_per_second: f64) -> f64 {
    (end_time - start_time) * pixels_per_second
}

/// Floor an epoch time to the start of its UTC hour.
pub fn start_of_hour(time_secs: f64) -> f64 {
    to_utc(time_secs)
        .and_then(|dt| dt.duration_trunc(TimeDelta::hours(1)).ok())
        .map_or_else(
            || (time_secs / 3_600.0).floor() * 3_600.0,
            |dt| dt.timestamp() as f64,
        )
}

/// Convert epoch seconds to a UTC datetime, `None` when out of range.
pub fn to_utc(time_secs: f64) -> Option<DateTime<Utc>> {
    if !time_secs.is_finite() {
        return None;
    }
    let secs = time_secs.floor();
    let nanos = ((time_secs - secs) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
}

/// Wall-clock time in epoch seconds, millisecond precision.
pub fn epoch_seconds_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1_000.0
}

/// A tick on the time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub time_secs: f64,
    pub x: f64,
    pub label: String,
    /// Ticks on a UTC midnight carry the date and are drawn taller.
    pub is_day_start: bool,
}

/// Linear scales for one visible time window.
///
/// `scale_to_position`, `scale_to_time` and `scale_axis` agree at both
/// ends of the domain and extrapolate linearly outside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    range: TimeRange,
    pixels_per_second: f64,
    total_width: f64,
}

impl TimeScale {
    pub fn for_time_range(range: TimeRange, pixels_per_second: f64) -> Self {
        Self {
            range,
            pixels_per_second,
            total_width: calculate_width(range.start_time_secs, range.end_time_secs, pixels_per_second),
        }
    }

    pub fn time_range(&self) -> TimeRange {
        self.range
    }

    pub fn total_width(&self) -> f64 {
        self.total_width
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.pixels_per_second
    }

    fn is_degenerate(&self) -> bool {
        self.range.duration() == 0.0 || self.pixels_per_second == 0.0
    }

    pub fn scale_to_position(&self, time_secs: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        (time_secs - self.range.start_time_secs) / self.range.duration() * self.total_width
    }

    pub fn scale_to_time(&self, position: f64) -> f64 {
        if self.is_degenerate() {
            return self.range.start_time_secs;
        }
        self.range.start_time_secs + position / self.total_width * self.range.duration()
    }

    /// Calendar-aware counterpart of [`scale_to_position`](Self::scale_to_position).
    pub fn scale_axis(&self, time: DateTime<Utc>) -> f64 {
        let secs = time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) / 1e9;
        self.scale_to_position(secs)
    }

    /// Ticks aligned to UTC calendar boundaries, spaced at least
    /// `min_spacing_px` apart.
    pub fn axis_ticks(&self, min_spacing_px: f64) -> Vec<AxisTick> {
        if self.is_degenerate() || self.range.duration() < 0.0 {
            return Vec::new();
        }
        let step = tick_step(min_spacing_px, self.pixels_per_second);
        let mut ticks = Vec::new();
        let mut t = (self.range.start_time_secs / step).ceil() * step;
        while t <= self.range.end_time_secs {
            let is_day_start = t.rem_euclid(SECONDS_PER_DAY) == 0.0;
            let label = to_utc(t).map_or_else(String::new, |dt| {
                if is_day_start {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%H:%M").to_string()
                }
            });
            ticks.push(AxisTick {
                time_secs: t,
                x: self.scale_to_position(t),
                label,
                is_day_start,
            });
            t += step;
        }
        ticks
    }

    /// UTC midnights inside the domain, with their x positions.
    pub fn day_boundaries(&self) -> Vec<(f64, f64)> {
        if self.range.duration() <= 0.0 {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut t = (self.range.start_time_secs / SECONDS_PER_DAY).ceil() * SECONDS_PER_DAY;
        while t <= self.range.end_time_secs {
            out.push((t, self.scale_to_position(t)));
            t += SECONDS_PER_DAY;
        }
        out
    }
}

fn tick_step(min_spacing_px: f64, pixels_per_second: f64) -> f64 {
    let min_secs = min_spacing_px / pixels_per_second;
    TICK_STEPS
        .iter()
        .copied()
        .find(|&step| step >= min_secs)
        .unwrap_or_else(|| (min_secs / SECONDS_PER_DAY).ceil() * SECONDS_PER_DAY)
}
