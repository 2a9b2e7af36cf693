use std::fmt;

/// Physical keyboard key identifier.
///
/// The runtime maps platform key codes into these variants where possible.
/// For unsupported keys, `Key::Unknown(u32)` carries the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    // Common control keys
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,
    Meta,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Platform-dependent key not yet represented here.
    Unknown(u32),
}

/// Modifier keys state.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// A key-down notification.
///
/// Only presses are delivered; OS key-repeat produces further presses with
/// `repeat` set.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyEvent {
    /// Physical key.
    pub key: Key,
    /// Character produced under the current layout and modifiers, if any.
    pub ch: Option<char>,
    pub modifiers: Modifiers,
    /// True when the event is an auto-repeat of a held key.
    pub repeat: bool,
}

impl KeyEvent {
    /// Initial press of `key` with no character and no modifiers.
    pub fn press(key: Key) -> Self {
        Self {
            key,
            ch: None,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }

    pub fn with_char(mut self, ch: char) -> Self {
        self.ch = Some(ch);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }
}

/// What a subscriber does with an event it observed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PassThrough {
    /// Later subscribers and the host still see the event.
    Forward,
    /// Delivery stops here.
    Consume,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
