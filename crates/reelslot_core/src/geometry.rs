use crate::types::{Position, TextAlign, TextOverlay, TextStyle};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// Pixel dimensions of the drawing surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Inclusive bounds check. Invalid surfaces contain nothing.
    pub fn contains(&self, point: PixelPoint) -> bool {
        self.is_valid()
            && point.is_finite()
            && (0.0..=self.width).contains(&point.x)
            && (0.0..=self.height).contains(&point.y)
    }
}

/// 270x480 portrait preview used by the editor canvas.
pub fn preset_editor_preview() -> Surface {
    Surface::new(270.0, 480.0)
}

/// 1080x1920 vertical export.
pub fn preset_shorts() -> Surface {
    Surface::new(1080.0, 1920.0)
}

/// 1920x1080 landscape export.
pub fn preset_landscape() -> Surface {
    Surface::new(1920.0, 1080.0)
}

// ---------------------------------------------------------------------------
// PixelPoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn to_pixels(position: &Position, surface: Surface) -> PixelPoint {
    PixelPoint {
        x: position.x / 100.0 * surface.width,
        y: position.y / 100.0 * surface.height,
    }
}

/// Inverse of [`to_pixels`]. The result is not clamped; callers decide
/// which range applies.
pub fn to_percent(point: PixelPoint, surface: Surface) -> (f64, f64) {
    (
        point.x / surface.width * 100.0,
        point.y / surface.height * 100.0,
    )
}

/// Convert a pixel delta into a percentage delta.
pub fn delta_to_percent(dx: f64, dy: f64, surface: Surface) -> (f64, f64) {
    (dx / surface.width * 100.0, dy / surface.height * 100.0)
}

/// Font size is relative to the surface height only.
pub fn font_size_px(font_size_percent: f64, surface: Surface) -> f64 {
    font_size_percent / 100.0 * surface.height
}

/// Clamp a percentage to `[margin, 100 - margin]`.
pub fn clamp_to_margin(value: f64, margin: f64) -> f64 {
    value.clamp(margin, 100.0 - margin)
}

// ---------------------------------------------------------------------------
// Rect / Corner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// Axis-aligned rectangle in pixels, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    pub fn corner(&self, corner: Corner) -> PixelPoint {
        match corner {
            Corner::TopLeft => PixelPoint::new(self.x, self.y),
            Corner::TopRight => PixelPoint::new(self.right(), self.y),
            Corner::BottomLeft => PixelPoint::new(self.x, self.bottom()),
            Corner::BottomRight => PixelPoint::new(self.right(), self.bottom()),
        }
    }

    /// Square of half-width `half` centered on `center`.
    pub fn around(center: PixelPoint, half: f64) -> Self {
        Self {
            x: center.x - half,
            y: center.y - half,
            width: half * 2.0,
            height: half * 2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Text measurement
// ---------------------------------------------------------------------------

/// Measures rendered text width. Hosts with access to real font metrics
/// (a canvas context, a shaping library) provide their own implementation.
pub trait TextMetrics {
    fn measure_width(&self, text: &str, font_px: f64, style: &TextStyle) -> f64;
}

/// Average-advance estimate used when no font backend is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMetrics;

impl TextMetrics for ApproxMetrics {
    fn measure_width(&self, text: &str, font_px: f64, style: &TextStyle) -> f64 {
        let advance = if style.bold { 0.65 } else { 0.6 };
        text.chars().count() as f64 * font_px * advance
    }
}

/// Pixel box used for hit testing an overlay.
///
/// Width is the measured text plus `padding`, height is the font size in
/// pixels plus `padding`. The box is vertically centered on the anchor
/// point and placed horizontally according to `text_align`.
pub fn overlay_bounds<M: TextMetrics + ?Sized>(
    overlay: &TextOverlay,
    surface: Surface,
    metrics: &M,
    padding: f64,
) -> Rect {
    let anchor = to_pixels(&overlay.position, surface);
    let font_px = font_size_px(overlay.style.font_size, surface);
    let width = metrics.measure_width(&overlay.content, font_px, &overlay.style) + padding;
    let height = font_px + padding;

    let x = match overlay.text_align {
        TextAlign::Left => anchor.x,
        TextAlign::Center => anchor.x - width / 2.0,
        TextAlign::Right => anchor.x - width,
    };

    Rect {
        x,
        y: anchor.y - height / 2.0,
        width,
        height,
    }
}
