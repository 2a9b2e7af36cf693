use std::fmt;

use super::types::{Key, KeyEvent};

/// Matches key events against a designated key.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyBinding {
    /// Matches the physical key regardless of layout, case or modifiers.
    Physical(Key),
    /// Matches the produced character exactly; `Char('P')` does not match `p`.
    Char(char),
}

impl KeyBinding {
    pub fn matches(&self, event: &KeyEvent) -> bool {
        match *self {
            KeyBinding::Physical(key) => event.key == key,
            KeyBinding::Char(ch) => event.ch == Some(ch),
        }
    }
}

impl Default for KeyBinding {
    /// Uppercase `P`.
    fn default() -> Self {
        KeyBinding::Char('P')
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyBinding::Physical(key) => write!(f, "key {key}"),
            KeyBinding::Char(ch) => write!(f, "'{ch}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    #[test]
    fn char_binding_is_case_sensitive() {
        let b = KeyBinding::Char('P');
        let shift = Modifiers { shift: true, ..Default::default() };

        assert!(b.matches(&KeyEvent::press(Key::P).with_char('P').with_modifiers(shift)));
        assert!(!b.matches(&KeyEvent::press(Key::P).with_char('p')));
        assert!(!b.matches(&KeyEvent::press(Key::P)));
    }

    #[test]
    fn physical_binding_ignores_case() {
        let b = KeyBinding::Physical(Key::P);
        assert!(b.matches(&KeyEvent::press(Key::P).with_char('p')));
        assert!(b.matches(&KeyEvent::press(Key::P).with_char('P')));
        assert!(!b.matches(&KeyEvent::press(Key::O).with_char('P')));
    }

    #[test]
    fn repeats_match_like_presses() {
        let b = KeyBinding::default();
        assert!(b.matches(&KeyEvent::press(Key::P).with_char('P').repeated()));
    }
}
