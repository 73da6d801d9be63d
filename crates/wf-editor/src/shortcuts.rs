//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so every host resolves keys the same way. Suppressing shortcuts
//! while a text input has focus is the host's job.

use crate::tools::ToolKind;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tool switching ──
    /// Switch tools without creating anything (V, L).
    Tool(ToolKind),
    /// Drop a node for this shape tool at the viewport center, then return
    /// to the select tool (T, R, O).
    PlaceShape(ToolKind),

    // ── Edit ──
    Undo,
    Redo,
    Delete,
    Copy,
    Paste,
    Duplicate,

    // ── UI ──
    /// Clear the selection and return to the select tool.
    Deselect,
}

/// Resolves key events into shortcut actions.
///
/// `ctrl` and `meta` both count as the command modifier, so ⌘ on macOS and
/// Ctrl elsewhere behave the same.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        if key == "Escape" {
            return Some(ShortcutAction::Deselect);
        }

        let cmd = ctrl || meta;

        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "c" | "C" => Some(ShortcutAction::Copy),
                "v" | "V" => Some(ShortcutAction::Paste),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                _ => None,
            };
        }

        match key {
            "v" | "V" => Some(ShortcutAction::Tool(ToolKind::Select)),
            "l" | "L" => Some(ShortcutAction::Tool(ToolKind::Connection)),
            "t" | "T" => Some(ShortcutAction::PlaceShape(ToolKind::Text)),
            "r" | "R" => Some(ShortcutAction::PlaceShape(ToolKind::Rectangle)),
            "o" | "O" => Some(ShortcutAction::PlaceShape(ToolKind::Ellipse)),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            _ => None,
        }
    }
}
