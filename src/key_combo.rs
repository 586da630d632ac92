//! Held-key chord recognition.
//!
//! Tracks the set of currently-depressed keys as an ordered sequence
//! (insertion order = press order) and matches the `+`-joined sequence
//! against a registered table on every key-down that introduces a new key.
//! The engine is fed events by its caller and returns the matched command
//! instead of invoking callbacks, so it needs no terminal, no global
//! listeners, and no re-subscription bookkeeping.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, ModifierKeyCode};
use tracing::trace;

/// Keys whose release drops the whole held sequence. The OS can swallow the
/// release of the other half of a chord while one of these is down, which
/// would otherwise leave a stuck ghost key in the sequence.
const MODIFIER_KEYS: [&str; 5] = ["Meta", "Shift", "Command", "Alt", "Control"];

/// One registered chord. Patterns are matched verbatim against the
/// `+`-joined held sequence; a pattern that can never be produced simply
/// never matches.
#[derive(Debug, Clone)]
pub struct ComboBinding<C> {
    pub pattern: String,
    pub command: C,
    pub suppress_default: bool,
}

impl<C> ComboBinding<C> {
    pub fn new(pattern: &str, command: C) -> Self {
        Self {
            pattern: pattern.to_string(),
            command,
            suppress_default: true,
        }
    }

    /// Binding that lets the terminal's default handling of the key stand.
    pub fn passthrough(pattern: &str, command: C) -> Self {
        Self {
            suppress_default: false,
            ..Self::new(pattern, command)
        }
    }
}

/// A matched chord, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboFire<C> {
    pub command: C,
    pub suppress_default: bool,
}

/// The chord recognizer. Bindings are scanned in registration order and the
/// first exact match wins, so overlapping patterns tie-break on order.
pub struct KeyCombos<C> {
    bindings: Vec<ComboBinding<C>>,
    held: Vec<String>,
}

impl<C: Clone> KeyCombos<C> {
    pub fn new(bindings: Vec<ComboBinding<C>>) -> Self {
        Self {
            bindings,
            held: Vec::new(),
        }
    }

    /// Process a key press. Returns the fired combo, if any. A key that is
    /// already held is a repeat event and must not re-trigger.
    pub fn key_down(&mut self, key: &str) -> Option<ComboFire<C>> {
        if self.held.iter().any(|held| held == key) {
            return None;
        }
        self.held.push(key.to_string());

        let pattern = self.held.join("+");
        trace!(target: "input", "held sequence: {pattern}");

        for binding in &self.bindings {
            if binding.pattern == pattern {
                return Some(ComboFire {
                    command: binding.command.clone(),
                    suppress_default: binding.suppress_default,
                });
            }
        }
        None
    }

    /// Process a key release. Releasing a modifier clears the entire held
    /// sequence; releasing anything else removes just that key. A release
    /// for a key that was never pressed (focus regained mid-chord) is a
    /// no-op.
    pub fn key_up(&mut self, key: &str) {
        if MODIFIER_KEYS.contains(&key) {
            self.held.clear();
        } else {
            self.held.retain(|held| held != key);
        }
    }

    /// The currently-depressed keys in press order.
    pub fn held(&self) -> &[String] {
        &self.held
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.iter().any(|held| held == key)
    }

    /// Drop all held keys, e.g. when the terminal loses focus and releases
    /// will never arrive.
    pub fn reset(&mut self) {
        self.held.clear();
    }
}

/// Translate a crossterm key event into the browser-style name the binding
/// tables use ("a", " ", "Enter", "ArrowUp", "Shift", ...). Repeat events
/// and keys without a stable name map to `None`.
pub fn key_name(event: &KeyEvent) -> Option<String> {
    if event.kind == KeyEventKind::Repeat {
        return None;
    }

    let name = match event.code {
        KeyCode::Char(c) => return Some(c.to_string()),
        KeyCode::Enter => "Enter",
        KeyCode::Esc => "Escape",
        KeyCode::Up => "ArrowUp",
        KeyCode::Down => "ArrowDown",
        KeyCode::Left => "ArrowLeft",
        KeyCode::Right => "ArrowRight",
        KeyCode::Backspace => "Backspace",
        KeyCode::Tab => "Tab",
        KeyCode::Delete => "Delete",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Modifier(modifier) => match modifier {
            ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => "Shift",
            ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => "Control",
            ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => "Alt",
            ModifierKeyCode::LeftSuper
            | ModifierKeyCode::RightSuper
            | ModifierKeyCode::LeftMeta
            | ModifierKeyCode::RightMeta => "Meta",
            _ => return None,
        },
        _ => return None,
    };
    Some(name.to_string())
}
