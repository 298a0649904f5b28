//! Editor commands triggered from the keyboard

mod shortcuts;

pub use shortcuts::action_for;

use tracing::info;

use crate::session::Editor;
use crate::EditorError;

/// A key as reported by the host shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A character key, compared case-insensitively
    Char(char),
    Escape,
    Other,
}

/// Modifier keys held during a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }
}

/// Something the host asked the editor to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    /// Save to the current path
    Save,
    /// The host must ask for a path and call `Editor::save_as`
    SaveAs,
    ToggleGrid,
    CancelDrag,
}

impl Editor {
    /// Run the shortcut bound to a key, if any
    ///
    /// Returns the action that was handled. `SaveAs` is returned when a save
    /// was requested but the map has no path yet; the host should prompt for one.
    pub fn key_pressed(
        &mut self,
        key: Key,
        modifiers: Modifiers,
    ) -> Result<Option<EditorAction>, EditorError> {
        let Some(action) = action_for(key, modifiers) else {
            return Ok(None);
        };
        match action {
            EditorAction::Save | EditorAction::SaveAs => {
                if action == EditorAction::SaveAs || self.path.is_none() {
                    return Ok(Some(EditorAction::SaveAs));
                }
                self.save_current()?;
            }
            EditorAction::ToggleGrid => {
                let shown = self.toggle_grid();
                info!("Grid {}", if shown { "shown" } else { "hidden" });
            }
            EditorAction::CancelDrag => {
                self.cancel_drag()?;
            }
        }
        Ok(Some(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::MemoryProvider;
    use crate::settings::EditorSettings;
    use crate::tools::PointerButton;

    fn editor() -> Editor {
        let provider = MemoryProvider::new().with_solid("wall", [90, 90, 90, 255]);
        let mut editor = Editor::new(EditorSettings::default(), Box::new(provider)).unwrap();
        editor.create_layer(None).unwrap();
        editor.select_tile(Some("wall".to_string()));
        editor
    }

    #[test]
    fn test_ctrl_g_toggles_grid() {
        let mut editor = editor();
        let action = editor.key_pressed(Key::Char('g'), Modifiers::ctrl()).unwrap();
        assert_eq!(action, Some(EditorAction::ToggleGrid));
        assert!(!editor.document().show_grid);
    }

    #[test]
    fn test_save_without_path_asks_for_one() {
        let mut editor = editor();
        let action = editor.key_pressed(Key::Char('s'), Modifiers::ctrl()).unwrap();
        assert_eq!(action, Some(EditorAction::SaveAs));
    }

    #[test]
    fn test_save_with_path_writes_file() {
        let path = std::env::temp_dir().join(format!("tilegrid_shortcut_{}.json", std::process::id()));
        let mut editor = editor();
        editor.save_as(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let action = editor.key_pressed(Key::Char('S'), Modifiers::ctrl()).unwrap();
        assert_eq!(action, Some(EditorAction::Save));
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_escape_cancels_drag() {
        let mut editor = editor();
        editor.pointer_pressed(PointerButton::Left, 5, 5).unwrap();
        editor.pointer_moved(70, 70).unwrap();
        let action = editor.key_pressed(Key::Escape, Modifiers::default()).unwrap();
        assert_eq!(action, Some(EditorAction::CancelDrag));
        assert!(!editor.region().is_selecting());
        assert_eq!(editor.document().current_layer().unwrap().occupied_count(), 0);
    }

    #[test]
    fn test_unbound_key_does_nothing() {
        let mut editor = editor();
        assert_eq!(editor.key_pressed(Key::Char('g'), Modifiers::default()).unwrap(), None);
        assert!(editor.document().show_grid);
    }
}
