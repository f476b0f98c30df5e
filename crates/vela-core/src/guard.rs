//! Page guard policy
//!
//! Casual-use deterrents only: blocking a few shortcuts and the context menu
//! does not stop anyone from reading the page source or capturing the stream.

use serde::{Deserialize, Serialize};

/// Elements marked non-draggable when the guard is installed
pub const NON_DRAGGABLE_SELECTOR: &str = "img, video";

/// Keyboard shortcuts suppressed by the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shortcut {
    /// Ctrl+S
    SavePage,
    /// Ctrl+U
    ViewSource,
    /// Ctrl+P
    Print,
    /// Ctrl+Shift+I
    Inspector,
    /// Ctrl+Shift+C
    ElementPicker,
    /// Ctrl+Shift+J
    Console,
    /// F12
    DevTools,
}

/// Keyboard state of a keydown event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord<'a> {
    /// `KeyboardEvent.key`
    pub key: &'a str,
    pub ctrl: bool,
    pub shift: bool,
}

impl<'a> KeyChord<'a> {
    pub fn new(key: &'a str, ctrl: bool, shift: bool) -> Self {
        Self { key, ctrl, shift }
    }

    /// The shortcut this chord triggers, if it is one the guard blocks.
    /// Key names compare case-insensitively.
    pub fn blocked_shortcut(&self) -> Option<Shortcut> {
        let key = self.key.to_ascii_lowercase();
        match key.as_str() {
            "f12" => Some(Shortcut::DevTools),
            "s" if self.ctrl => Some(Shortcut::SavePage),
            "u" if self.ctrl => Some(Shortcut::ViewSource),
            "p" if self.ctrl => Some(Shortcut::Print),
            "i" if self.ctrl && self.shift => Some(Shortcut::Inspector),
            "c" if self.ctrl && self.shift => Some(Shortcut::ElementPicker),
            "j" if self.ctrl && self.shift => Some(Shortcut::Console),
            _ => None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked_shortcut().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_shortcuts() {
        assert_eq!(KeyChord::new("s", true, false).blocked_shortcut(), Some(Shortcut::SavePage));
        assert_eq!(KeyChord::new("U", true, false).blocked_shortcut(), Some(Shortcut::ViewSource));
        assert_eq!(KeyChord::new("p", true, false).blocked_shortcut(), Some(Shortcut::Print));
        assert_eq!(KeyChord::new("I", true, true).blocked_shortcut(), Some(Shortcut::Inspector));
        assert_eq!(KeyChord::new("C", true, true).blocked_shortcut(), Some(Shortcut::ElementPicker));
        assert_eq!(KeyChord::new("J", true, true).blocked_shortcut(), Some(Shortcut::Console));
        assert_eq!(KeyChord::new("F12", false, false).blocked_shortcut(), Some(Shortcut::DevTools));
        assert_eq!(KeyChord::new("F12", true, true).blocked_shortcut(), Some(Shortcut::DevTools));
    }

    #[test]
    fn test_allowed_keys() {
        // Plain copy and the devtools letters without shift stay usable
        assert!(!KeyChord::new("c", true, false).is_blocked());
        assert!(!KeyChord::new("i", true, false).is_blocked());
        assert!(!KeyChord::new("j", true, false).is_blocked());
        assert!(!KeyChord::new("s", false, false).is_blocked());
        assert!(!KeyChord::new("I", false, true).is_blocked());
        assert!(!KeyChord::new("F5", false, false).is_blocked());
        assert!(!KeyChord::new("Enter", true, true).is_blocked());
    }

    #[test]
    fn test_ctrl_shift_letters_still_blocked() {
        // The Ctrl-only set does not care about shift
        assert!(KeyChord::new("S", true, true).is_blocked());
        assert!(KeyChord::new("P", true, true).is_blocked());
    }
}
