use crate::error::{CoreError, Result};
use crate::geometry::{preset_editor_preview, Surface};
use crate::types::TextOverlay;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// The overlay set for one generated video, as persisted by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlayDocument {
    pub id: Uuid,
    pub name: String,
    /// Seconds; every overlay lies within `[0, total_duration]`.
    pub total_duration: f64,
    pub surface: Surface,
    pub overlays: Vec<TextOverlay>,
}

impl OverlayDocument {
    /// Create an empty document sized for the editor preview.
    pub fn new(name: impl Into<String>, total_duration: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            total_duration,
            surface: preset_editor_preview(),
            overlays: vec![],
        }
    }

    /// Save as pretty-printed JSON.
    /// Automatically appends `.reelslot` extension if not present.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = ensure_extension(path.as_ref());
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a document from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let doc: OverlayDocument = serde_json::from_str(&data)?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.total_duration.is_finite() && self.total_duration > 0.0) {
            return Err(CoreError::InvalidOperation(format!(
                "total_duration {} must be positive",
                self.total_duration
            )));
        }
        if !self.surface.is_valid() {
            return Err(CoreError::InvalidOperation(format!(
                "surface {}x{} is not drawable",
                self.surface.width, self.surface.height
            )));
        }
        for overlay in &self.overlays {
            let in_range = overlay.start_time >= 0.0
                && overlay.start_time < overlay.end_time
                && overlay.end_time <= self.total_duration;
            if !in_range {
                return Err(CoreError::InvalidOperation(format!(
                    "overlay {} has invalid time range [{}, {}]",
                    overlay.id, overlay.start_time, overlay.end_time
                )));
            }
        }
        Ok(())
    }
}

fn ensure_extension(path: &Path) -> std::path::PathBuf {
    if path.extension().and_then(|e| e.to_str()) == Some("reelslot") {
        path.to_path_buf()
    } else {
        let mut p = path.to_path_buf();
        let mut name = p.file_name().unwrap_or_default().to_os_string();
        name.push(".reelslot");
        p.set_file_name(name);
        p
    }
}
