use crate::config::EditorConfig;
use crate::geometry::clamp_to_margin;
use crate::types::*;
use uuid::Uuid;

/// Keyboard nudge direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Quick placement presets. These set exact positions and are not
/// subject to the pointer margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionPreset {
    TopCenter,
    Center,
    BottomCenter,
}

impl PositionPreset {
    pub fn position(self) -> Position {
        match self {
            PositionPreset::TopCenter => Position {
                x: 50.0,
                y: 20.0,
                anchor: Anchor::TopCenter,
            },
            PositionPreset::Center => Position {
                x: 50.0,
                y: 50.0,
                anchor: Anchor::Center,
            },
            PositionPreset::BottomCenter => Position {
                x: 50.0,
                y: 80.0,
                anchor: Anchor::BottomCenter,
            },
        }
    }
}

/// Build a new overlay at `at` (percent) starting at `at_time`.
///
/// The overlay lasts `default_overlay_duration` seconds, capped at
/// `max_time`. When `at_time` sits at (or past) the end of the timeline the
/// window is moved back so it still ends at `max_time`. Returns `None` when
/// there is no timeline to place it on or the window would be empty.
pub fn new_overlay(
    at: (f64, f64),
    at_time: f64,
    max_time: f64,
    config: &EditorConfig,
) -> Option<TextOverlay> {
    if !(max_time.is_finite() && at_time.is_finite() && at.0.is_finite() && at.1.is_finite()) {
        return None;
    }
    if max_time <= 0.0 {
        return None;
    }

    let mut start = at_time.clamp(0.0, max_time);
    let end = (start + config.default_overlay_duration).min(max_time);
    if end - start <= f64::EPSILON {
        start = (end - config.default_overlay_duration).max(0.0);
    }
    if start >= end {
        return None;
    }

    Some(TextOverlay {
        id: Uuid::now_v7(),
        content: "New text".to_string(),
        start_time: start,
        end_time: end,
        position: Position::new(
            clamp_to_margin(at.0, config.edge_margin),
            clamp_to_margin(at.1, config.edge_margin),
        ),
        style: TextStyle::default(),
        text_align: TextAlign::Center,
    })
}

/// Append a new overlay. A timeline with no duration leaves the collection
/// unchanged.
pub fn create_overlay(
    overlays: &[TextOverlay],
    at: (f64, f64),
    at_time: f64,
    max_time: f64,
    config: &EditorConfig,
) -> Vec<TextOverlay> {
    let mut next = overlays.to_vec();
    if let Some(overlay) = new_overlay(at, at_time, max_time, config) {
        next.push(overlay);
    }
    next
}

pub fn find_overlay(overlays: &[TextOverlay], id: Uuid) -> Option<&TextOverlay> {
    overlays.iter().find(|o| o.id == id)
}

/// Overlays on screen at `time`, in collection order.
pub fn visible_at(overlays: &[TextOverlay], time: f64) -> impl Iterator<Item = &TextOverlay> {
    overlays.iter().filter(move |o| o.is_visible_at(time))
}

pub fn remove_overlay(overlays: &[TextOverlay], id: Uuid) -> Vec<TextOverlay> {
    overlays.iter().filter(|o| o.id != id).cloned().collect()
}

/// Replace the overlay with `id` by the result of `f` applied to a copy.
pub fn update_overlay<F>(overlays: &[TextOverlay], id: Uuid, f: F) -> Vec<TextOverlay>
where
    F: FnOnce(&mut TextOverlay),
{
    let mut next = overlays.to_vec();
    if let Some(overlay) = next.iter_mut().find(|o| o.id == id) {
        f(overlay);
    }
    next
}

/// Move to `(x, y)`, clamped to the pointer margin.
pub fn move_overlay(
    overlays: &[TextOverlay],
    id: Uuid,
    x: f64,
    y: f64,
    config: &EditorConfig,
) -> Vec<TextOverlay> {
    if !(x.is_finite() && y.is_finite()) {
        return overlays.to_vec();
    }
    update_overlay(overlays, id, |o| {
        o.position.x = clamp_to_margin(x, config.edge_margin);
        o.position.y = clamp_to_margin(y, config.edge_margin);
    })
}

pub fn set_font_size(
    overlays: &[TextOverlay],
    id: Uuid,
    font_size: f64,
    config: &EditorConfig,
) -> Vec<TextOverlay> {
    if !font_size.is_finite() {
        return overlays.to_vec();
    }
    update_overlay(overlays, id, |o| {
        o.style.font_size = config.clamp_font_size(font_size);
    })
}

pub fn set_content(overlays: &[TextOverlay], id: Uuid, content: impl Into<String>) -> Vec<TextOverlay> {
    let content = content.into();
    update_overlay(overlays, id, |o| o.content = content)
}

/// Replace the style. Font size and opacity are clamped into range.
pub fn set_style(
    overlays: &[TextOverlay],
    id: Uuid,
    style: TextStyle,
    config: &EditorConfig,
) -> Vec<TextOverlay> {
    update_overlay(overlays, id, |o| {
        let font_size = if style.font_size.is_finite() {
            config.clamp_font_size(style.font_size)
        } else {
            o.style.font_size
        };
        let opacity = if style.opacity.is_finite() {
            style.opacity.clamp(0.0, 1.0)
        } else {
            o.style.opacity
        };
        o.style = TextStyle {
            font_size,
            opacity,
            ..style
        };
    })
}

pub fn set_text_align(overlays: &[TextOverlay], id: Uuid, align: TextAlign) -> Vec<TextOverlay> {
    update_overlay(overlays, id, |o| o.text_align = align)
}

/// Change the time window, clamped into `[0, total]`. A window that would
/// end up empty or inverted is rejected and the collection is unchanged.
pub fn set_timing(
    overlays: &[TextOverlay],
    id: Uuid,
    start: f64,
    end: f64,
    total: f64,
) -> Vec<TextOverlay> {
    if !(start.is_finite() && end.is_finite() && total.is_finite()) || total <= 0.0 {
        return overlays.to_vec();
    }
    let start = start.clamp(0.0, total);
    let end = end.clamp(0.0, total);
    if start >= end {
        return overlays.to_vec();
    }
    update_overlay(overlays, id, |o| {
        o.start_time = start;
        o.end_time = end;
    })
}

pub fn apply_preset(overlays: &[TextOverlay], id: Uuid, preset: PositionPreset) -> Vec<TextOverlay> {
    update_overlay(overlays, id, |o| o.position = preset.position())
}

/// Shift by one step (or the fast step) in `direction`, clamped to the
/// pointer margin.
pub fn nudge(
    overlays: &[TextOverlay],
    id: Uuid,
    direction: Direction,
    fast: bool,
    config: &EditorConfig,
) -> Vec<TextOverlay> {
    let step = if fast {
        config.nudge_step_fast
    } else {
        config.nudge_step
    };
    let (dx, dy) = match direction {
        Direction::Up => (0.0, -step),
        Direction::Down => (0.0, step),
        Direction::Left => (-step, 0.0),
        Direction::Right => (step, 0.0),
    };
    update_overlay(overlays, id, |o| {
        o.position.x = clamp_to_margin(o.position.x + dx, config.edge_margin);
        o.position.y = clamp_to_margin(o.position.y + dy, config.edge_margin);
    })
}
