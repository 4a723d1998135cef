use crate::model::TimeRange;
use crate::scale::TimeScale;

/// Horizontal scroll state shared by the regions that move together: the
/// cell grid, the hidden axis collection that keeps virtualization in step,
/// the time axis header and the day boundary overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollSync {
    pub grid_scroll_left: f64,
    pub axis_collection_scroll_left: f64,
    pub time_axis_offset: f64,
    pub day_boundary_offset: f64,
    pub scroll_width: f64,
    pub client_width: f64,
    noise_px: f64,
}

impl ScrollSync {
    pub fn new(scroll_width: f64, client_width: f64, noise_px: f64) -> Self {
        Self {
            grid_scroll_left: 0.0,
            axis_collection_scroll_left: 0.0,
            time_axis_offset: 0.0,
            day_boundary_offset: 0.0,
            scroll_width,
            client_width,
            noise_px,
        }
    }

    pub fn scroll_left(&self) -> f64 {
        self.grid_scroll_left
    }

    /// A scroll event from the grid. Moves every region in the same call
    /// unless the delta is within the noise threshold, which is how echoes
    /// from the synchronized regions are dropped. Returns whether anything
    /// moved.
    pub fn on_scroll(&mut self, scroll_left: f64) -> bool {
        if (scroll_left - self.grid_scroll_left).abs() <= self.noise_px {
            return false;
        }
        self.apply(scroll_left);
        true
    }

    /// Translate a wheel event into a scroll. A vertical wheel with shift
    /// held scrolls horizontally. Returns the new position, if it moved.
    pub fn on_wheel(&mut self, dx: f64, dy: f64, shift: bool) -> Option<f64> {
        let delta = if shift && dx == 0.0 { dy } else { dx };
        if delta == 0.0 {
            return None;
        }
        let target = (self.grid_scroll_left + delta).clamp(0.0, self.max_scroll_left());
        if target == self.grid_scroll_left {
            return None;
        }
        self.apply(target);
        Some(target)
    }

    /// Jump without the noise check.
    pub fn scroll_to(&mut self, scroll_left: f64) {
        self.apply(scroll_left);
    }

    pub fn scroll_to_end(&mut self) {
        self.apply(self.max_scroll_left());
    }

    /// Shift the view by `seconds` through the scale. Positions past either
    /// end of the window are kept.
    pub fn pan_by(&mut self, scale: &TimeScale, seconds: f64) -> f64 {
        let time = scale.scale_to_time(self.grid_scroll_left) + seconds;
        let target = scale.scale_to_position(time);
        tracing::debug!(seconds, from = self.grid_scroll_left, to = target, "pan");
        self.apply(target);
        target
    }

    /// Keep the same fraction of the scrollable width after the container
    /// or the content changes width.
    pub fn on_resize(&mut self, new_client_width: f64, new_scroll_width: f64) {
        let max = self.max_scroll_left();
        let fraction = if max > 0.0 {
            (self.grid_scroll_left / max).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.client_width = new_client_width;
        self.scroll_width = new_scroll_width;
        self.apply(fraction * self.max_scroll_left());
    }

    /// Earliest time showing at the left edge of the grid.
    pub fn viewable_min_start_time(&self, scale: &TimeScale) -> f64 {
        scale.scale_to_time(self.grid_scroll_left)
    }

    pub fn visible_time_range(&self, scale: &TimeScale) -> TimeRange {
        TimeRange::new(
            scale.scale_to_time(self.grid_scroll_left),
            scale.scale_to_time(self.grid_scroll_left + self.client_width),
        )
    }

    fn max_scroll_left(&self) -> f64 {
        (self.scroll_width - self.client_width).max(0.0)
    }

    fn apply(&mut self, scroll_left: f64) {
        self.grid_scroll_left = scroll_left;
        self.axis_collection_scroll_left = scroll_left;
        self.time_axis_offset = -scroll_left;
        self.day_boundary_offset = -scroll_left;
    }
}
