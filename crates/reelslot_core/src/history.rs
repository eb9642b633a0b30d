use crate::error::{CoreError, Result};
use crate::types::TextOverlay;
use std::cell::RefCell;
use uuid::Uuid;

/// An overlay edit that can be executed, undone, and described.
pub trait Command: std::fmt::Debug {
    fn execute(&self, overlays: &mut Vec<TextOverlay>) -> Result<()>;
    fn undo(&self, overlays: &mut Vec<TextOverlay>) -> Result<()>;
    fn description(&self) -> &str;
}

/// Undo/redo history stack.
#[derive(Debug)]
pub struct History {
    undo_stack: Vec<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    max_size: usize,
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Execute a command and push it onto the undo stack. Clears redo stack.
    pub fn execute(&mut self, cmd: Box<dyn Command>, overlays: &mut Vec<TextOverlay>) -> Result<()> {
        cmd.execute(overlays)?;
        self.push(cmd);
        Ok(())
    }

    /// Push a command whose effect is already applied, e.g. a drag that
    /// updated the overlay live on every pointer move.
    pub fn record(&mut self, cmd: Box<dyn Command>) {
        self.push(cmd);
    }

    fn push(&mut self, cmd: Box<dyn Command>) {
        self.redo_stack.clear();
        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last command.
    pub fn undo(&mut self, overlays: &mut Vec<TextOverlay>) -> Result<()> {
        let cmd = self.undo_stack.pop().ok_or(CoreError::NothingToUndo)?;
        cmd.undo(overlays)?;
        self.redo_stack.push(cmd);
        Ok(())
    }

    /// Redo the last undone command.
    pub fn redo(&mut self, overlays: &mut Vec<TextOverlay>) -> Result<()> {
        let cmd = self.redo_stack.pop().ok_or(CoreError::NothingToRedo)?;
        cmd.execute(overlays)?;
        self.undo_stack.push(cmd);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|cmd| cmd.description())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|cmd| cmd.description())
    }
}

fn replace_by_id(overlays: &mut [TextOverlay], overlay: &TextOverlay) -> Result<()> {
    let slot = overlays
        .iter_mut()
        .find(|o| o.id == overlay.id)
        .ok_or_else(|| CoreError::InvalidOperation(format!("overlay {} not found", overlay.id)))?;
    *slot = overlay.clone();
    Ok(())
}

// ---------------------------------------------------------------------------
// AddOverlayCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AddOverlayCommand {
    overlay: TextOverlay,
}

impl AddOverlayCommand {
    pub fn new(overlay: TextOverlay) -> Self {
        Self { overlay }
    }
}

impl Command for AddOverlayCommand {
    fn execute(&self, overlays: &mut Vec<TextOverlay>) -> Result<()> {
        if overlays.iter().any(|o| o.id == self.overlay.id) {
            return Err(CoreError::InvalidOperation(format!(
                "overlay {} already exists",
                self.overlay.id
            )));
        }
        overlays.push(self.overlay.clone());
        Ok(())
    }

    fn undo(&self, overlays: &mut Vec<TextOverlay>) -> Result<()> {
        overlays.retain(|o| o.id != self.overlay.id);
        Ok(())
    }

    fn description(&self) -> &str {
        "Add text"
    }
}

// ---------------------------------------------------------------------------
// RemoveOverlayCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct RemoveOverlayCommand {
    overlay_id: Uuid,
    removed: RefCell<Option<(usize, TextOverlay)>>,
}

impl RemoveOverlayCommand {
    pub fn new(overlay_id: Uuid) -> Self {
        Self {
            overlay_id,
            removed: RefCell::new(None),
        }
    }
}

impl Command for RemoveOverlayCommand {
    fn execute(&self, overlays: &mut Vec<TextOverlay>) -> Result<()> {
        let index = overlays
            .iter()
            .position(|o| o.id == self.overlay_id)
            .ok_or_else(|| {
                CoreError::InvalidOperation(format!("overlay {} not found", self.overlay_id))
            })?;
        let overlay = overlays.remove(index);
        *self.removed.borrow_mut() = Some((index, overlay));
        Ok(())
    }

    fn undo(&self, overlays: &mut Vec<TextOverlay>) -> Result<()> {
        let (index, overlay) = self
            .removed
            .borrow()
            .clone()
            .ok_or_else(|| CoreError::InvalidOperation("no removed overlay saved".into()))?;
        overlays.insert(index.min(overlays.len()), overlay);
        Ok(())
    }

    fn description(&self) -> &str {
        "Delete text"
    }
}

// ---------------------------------------------------------------------------
// ReplaceOverlayCommand
// ---------------------------------------------------------------------------

/// Swap one overlay between two snapshots. Covers drag, resize, nudge and
/// form edits, which all change a single overlay in place.
#[derive(Debug)]
pub struct ReplaceOverlayCommand {
    before: TextOverlay,
    after: TextOverlay,
    description: &'static str,
}

impl ReplaceOverlayCommand {
    pub fn new(before: TextOverlay, after: TextOverlay, description: &'static str) -> Self {
        Self {
            before,
            after,
            description,
        }
    }
}

impl Command for ReplaceOverlayCommand {
    fn execute(&self, overlays: &mut Vec<TextOverlay>) -> Result<()> {
        replace_by_id(overlays, &self.after)
    }

    fn undo(&self, overlays: &mut Vec<TextOverlay>) -> Result<()> {
        replace_by_id(overlays, &self.before)
    }

    fn description(&self) -> &str {
        self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Position, TextAlign, TextStyle};
    use assert_matches::assert_matches;

    fn make_overlay(x: f64) -> TextOverlay {
        TextOverlay {
            id: Uuid::new_v4(),
            content: "Hello".to_string(),
            start_time: 0.0,
            end_time: 3.0,
            position: Position::new(x, 50.0),
            style: TextStyle::default(),
            text_align: TextAlign::Center,
        }
    }

    #[test]
    fn add_undo_redo() {
        let mut overlays = Vec::new();
        let overlay = make_overlay(50.0);
        let mut history = History::new(100);

        history
            .execute(Box::new(AddOverlayCommand::new(overlay.clone())), &mut overlays)
            .unwrap();
        assert_eq!(overlays.len(), 1);

        history.undo(&mut overlays).unwrap();
        assert!(overlays.is_empty());

        history.redo(&mut overlays).unwrap();
        assert_eq!(overlays[0], overlay);
    }

    #[test]
    fn adding_duplicate_id_fails() {
        let overlay = make_overlay(50.0);
        let mut overlays = vec![overlay.clone()];
        let mut history = History::new(100);
        let result = history.execute(Box::new(AddOverlayCommand::new(overlay)), &mut overlays);
        assert_matches!(result, Err(CoreError::InvalidOperation(_)));
        assert!(!history.can_undo());
    }

    #[test]
    fn remove_undo_restores_original_index() {
        let a = make_overlay(10.0);
        let b = make_overlay(20.0);
        let c = make_overlay(30.0);
        let mut overlays = vec![a.clone(), b.clone(), c.clone()];
        let mut history = History::new(100);

        history
            .execute(Box::new(RemoveOverlayCommand::new(b.id)), &mut overlays)
            .unwrap();
        assert_eq!(overlays, vec![a.clone(), c.clone()]);

        history.undo(&mut overlays).unwrap();
        assert_eq!(overlays, vec![a, b, c]);
    }

    #[test]
    fn remove_missing_overlay_fails() {
        let mut overlays = vec![make_overlay(10.0)];
        let mut history = History::new(100);
        let result = history.execute(Box::new(RemoveOverlayCommand::new(Uuid::new_v4())), &mut overlays);
        assert_matches!(result, Err(CoreError::InvalidOperation(_)));
    }

    #[test]
    fn replace_round_trips_through_undo_and_redo() {
        let before = make_overlay(10.0);
        let mut after = before.clone();
        after.position.x = 80.0;
        let mut overlays = vec![after.clone()];
        let mut history = History::new(100);

        // effect already applied live
        history.record(Box::new(ReplaceOverlayCommand::new(before.clone(), after.clone(), "Move text")));
        assert_eq!(history.undo_description(), Some("Move text"));

        history.undo(&mut overlays).unwrap();
        assert_eq!(overlays[0], before);
        assert_eq!(history.redo_description(), Some("Move text"));

        history.redo(&mut overlays).unwrap();
        assert_eq!(overlays[0], after);
    }

    #[test]
    fn empty_history_errors() {
        let mut overlays = Vec::new();
        let mut history = History::new(10);
        assert_matches!(history.undo(&mut overlays), Err(CoreError::NothingToUndo));
        assert_matches!(history.redo(&mut overlays), Err(CoreError::NothingToRedo));
    }

    #[test]
    fn max_size_limits_undo_stack() {
        let mut overlays = Vec::new();
        let mut history = History::new(3);

        for i in 0..5 {
            let cmd = Box::new(AddOverlayCommand::new(make_overlay(i as f64 * 10.0)));
            history.execute(cmd, &mut overlays).unwrap();
        }
        assert_eq!(overlays.len(), 5);

        assert!(history.undo(&mut overlays).is_ok());
        assert!(history.undo(&mut overlays).is_ok());
        assert!(history.undo(&mut overlays).is_ok());
        assert!(history.undo(&mut overlays).is_err());
        assert_eq!(overlays.len(), 2);
    }

    #[test]
    fn new_command_clears_redo() {
        let mut overlays = Vec::new();
        let mut history = History::new(10);
        history
            .execute(Box::new(AddOverlayCommand::new(make_overlay(1.0))), &mut overlays)
            .unwrap();
        history.undo(&mut overlays).unwrap();
        assert!(history.can_redo());

        history
            .execute(Box::new(AddOverlayCommand::new(make_overlay(2.0))), &mut overlays)
            .unwrap();
        assert!(!history.can_redo());
        assert!(history.can_undo());
    }
}
