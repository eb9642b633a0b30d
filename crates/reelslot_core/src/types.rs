use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Anchor
// ---------------------------------------------------------------------------

/// Alignment hint for the text baseline. Rendering only; stored geometry
/// is always the `x`/`y` percentage pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    #[default]
    Center,
    TopCenter,
    BottomCenter,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Position as percentages (0-100) of the surface width and height.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub anchor: Anchor,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            anchor: Anchor::Center,
        }
    }
}

// ---------------------------------------------------------------------------
// TextAlign
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

// ---------------------------------------------------------------------------
// TextStyle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    /// Percent of the surface height, never pixels.
    pub font_size: f64,
    pub color: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub shadow: bool,
    #[serde(default)]
    pub outline: bool,
    #[serde(default)]
    pub background: bool,
    pub opacity: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
            font_size: 6.0,
            color: "#FFFFFF".to_string(),
            bold: false,
            italic: false,
            shadow: true,
            outline: false,
            background: false,
            opacity: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// TextOverlay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextOverlay {
    pub id: Uuid,
    pub content: String,
    pub start_time: f64,
    pub end_time: f64,
    pub position: Position,
    pub style: TextStyle,
    #[serde(default)]
    pub text_align: TextAlign,
}

impl TextOverlay {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Inclusive on both ends, matching how the preview decides what to draw.
    pub fn is_visible_at(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time
    }
}

// ---------------------------------------------------------------------------
// ContentVideo
// ---------------------------------------------------------------------------

/// A clip supplied by the remote API. Read-only from the editor's side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentVideo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub video_url: String,
    pub duration: f64,
    #[serde(default)]
    pub description: String,
}

// ---------------------------------------------------------------------------
// VideoSlot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignedVideo {
    pub title: String,
    pub thumbnail_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoSlot {
    pub id: String,
    /// 1-based display order.
    pub order: u32,
    pub duration: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub end_time: f64,
    #[serde(default)]
    pub assigned_video: Option<AssignedVideo>,
}

// ---------------------------------------------------------------------------
// SlotAssignment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotAssignment {
    pub slot_id: String,
    pub video_id: Option<String>,
    pub confidence: Option<f64>,
}

impl SlotAssignment {
    pub fn unassigned(slot_id: impl Into<String>) -> Self {
        Self {
            slot_id: slot_id.into(),
            video_id: None,
            confidence: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.video_id.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
