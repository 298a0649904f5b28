//! Keyboard shortcut bindings

use super::{EditorAction, Key, Modifiers};

/// Map a key press to the action bound to it
pub fn action_for(key: Key, modifiers: Modifiers) -> Option<EditorAction> {
    match key {
        // Escape cancels an active region drag
        Key::Escape => Some(EditorAction::CancelDrag),
        Key::Char(c) if modifiers.ctrl && !modifiers.alt => match c.to_ascii_lowercase() {
            // Ctrl+Shift+S - Save As
            's' if modifiers.shift => Some(EditorAction::SaveAs),
            // Ctrl+S - Save
            's' => Some(EditorAction::Save),
            // Ctrl+G - Toggle grid
            'g' => Some(EditorAction::ToggleGrid),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings() {
        let ctrl = Modifiers::ctrl();
        let ctrl_shift = Modifiers {
            shift: true,
            ..ctrl
        };
        assert_eq!(action_for(Key::Char('s'), ctrl), Some(EditorAction::Save));
        assert_eq!(action_for(Key::Char('S'), ctrl_shift), Some(EditorAction::SaveAs));
        assert_eq!(action_for(Key::Char('g'), ctrl), Some(EditorAction::ToggleGrid));
        assert_eq!(action_for(Key::Escape, Modifiers::default()), Some(EditorAction::CancelDrag));
    }

    #[test]
    fn test_unbound_keys() {
        assert_eq!(action_for(Key::Char('s'), Modifiers::default()), None);
        assert_eq!(action_for(Key::Char('z'), Modifiers::ctrl()), None);
        assert_eq!(action_for(Key::Other, Modifiers::ctrl()), None);
        let ctrl_alt = Modifiers {
            alt: true,
            ..Modifiers::ctrl()
        };
        assert_eq!(action_for(Key::Char('s'), ctrl_alt), None);
    }
}
