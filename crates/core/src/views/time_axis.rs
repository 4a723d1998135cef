use workflow_desk_protocol::{LayoutCommand, Point, Rect, TextAlign, ThemeToken};

use crate::config::WorkflowDisplayConfig;
use crate::scale::TimeScale;

const DAY_TICK_HEIGHT: f64 = 10.0;
const TICK_HEIGHT: f64 = 5.0;
const FONT_SIZE: f64 = 10.0;
const LABEL_Y: f64 = 12.0;
const MIN_TICK_SPACING_PX: f64 = 80.0;

/// Render the time axis header for the horizontal band
/// `[scroll_left, scroll_left + client_width]` plus overscan.
///
/// Coordinates are in table pixel space; the host offsets the header by the
/// synchronized scroll position.
pub fn render_time_axis(
    scale: &TimeScale,
    config: &WorkflowDisplayConfig,
    scroll_left: f64,
    client_width: f64,
) -> Vec<LayoutCommand> {
    let height = config.time_axis_height;
    let (left, right) = (
        scroll_left - config.horizontal_overscan_px,
        scroll_left + client_width + config.horizontal_overscan_px,
    );
    let mut commands = vec![
        LayoutCommand::BeginGroup {
            id: "time-axis".into(),
            label: None,
        },
        LayoutCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, scale.total_width(), height),
            color: ThemeToken::AxisBackground,
            border_color: None,
        },
    ];

    for tick in scale.axis_ticks(MIN_TICK_SPACING_PX) {
        let x = tick.x + config.axis_margin_px;
        if x < left || x > right {
            continue;
        }
        let tick_height = if tick.is_day_start { DAY_TICK_HEIGHT } else { TICK_HEIGHT };
        commands.push(LayoutCommand::DrawLine {
            from: Point::new(x, height - tick_height),
            to: Point::new(x, height),
            color: ThemeToken::AxisTick,
            width: 1.0,
        });
        commands.push(LayoutCommand::DrawText {
            position: Point::new(x + 3.0, LABEL_Y),
            text: tick.label,
            color: ThemeToken::AxisText,
            font_size: FONT_SIZE,
            align: TextAlign::Left,
        });
    }

    commands.push(LayoutCommand::EndGroup);
    commands
}
