use workflow_desk_protocol::{LayoutCommand, Point, TextAlign, ThemeToken};

use crate::scale::{TimeScale, to_utc};

const FONT_SIZE: f64 = 10.0;
const LABEL_OFFSET_Y: f64 = 12.0;

/// Vertical lines at UTC midnights across the grid, each labelled with the
/// date it starts. Only boundaries within `[left, right]` are drawn.
pub fn render_day_boundaries(
    scale: &TimeScale,
    grid_height: f64,
    left: f64,
    right: f64,
) -> Vec<LayoutCommand> {
    let boundaries: Vec<(f64, f64)> = scale
        .day_boundaries()
        .into_iter()
        .filter(|&(_, x)| x >= left && x <= right)
        .collect();
    if boundaries.is_empty() {
        return Vec::new();
    }

    let mut commands = Vec::with_capacity(boundaries.len() * 2 + 2);
    commands.push(LayoutCommand::BeginGroup {
        id: "day-boundaries".into(),
        label: None,
    });
    for (time, x) in boundaries {
        commands.push(LayoutCommand::DrawLine {
            from: Point::new(x, 0.0),
            to: Point::new(x, grid_height),
            color: ThemeToken::DayBoundary,
            width: 1.0,
        });
        if let Some(day) = to_utc(time) {
            commands.push(LayoutCommand::DrawText {
                position: Point::new(x + 2.0, LABEL_OFFSET_Y),
                text: day.format("%b %-d").to_string(),
                color: ThemeToken::TextMuted,
                font_size: FONT_SIZE,
                align: TextAlign::Left,
            });
        }
    }
    commands.push(LayoutCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeRange;

    #[test]
    fn one_line_per_midnight() {
        // 2024-01-01T12:00Z .. 2024-01-03T12:00Z
        let scale = TimeScale::for_time_range(TimeRange::new(1_704_110_400.0, 1_704_283_200.0), 0.01);
        let commands = render_day_boundaries(&scale, 96.0, 0.0, scale.total_width());

        let lines: Vec<f64> = commands
            .iter()
            .filter_map(|c| match c {
                LayoutCommand::DrawLine { from, .. } => Some(from.x),
                _ => None,
            })
            .collect();
        assert_eq!(lines.len(), 2);
        assert!((lines[0] - 432.0).abs() < 1e-6);

        let text = commands.iter().find_map(|c| match c {
            LayoutCommand::DrawText { text, .. } => Some(text.clone()),
            _ => None,
        });
        assert_eq!(text.as_deref(), Some("Jan 2"));
    }

    #[test]
    fn nothing_outside_the_band() {
        let scale = TimeScale::for_time_range(TimeRange::new(1_704_110_400.0, 1_704_283_200.0), 0.01);
        assert!(render_day_boundaries(&scale, 96.0, 0.0, 400.0).is_empty());
    }
}
