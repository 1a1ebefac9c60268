//! XInput digital button table
//!
//! XInput packs the 14 digital buttons into a 16-bit word (bits 0x0400 and
//! 0x0800 are unused). [`BUTTONS`] is the fixed iteration order used when
//! diffing button words, so simultaneous transitions are always reported in
//! the same order.

use std::fmt;

/// XInput button bit flags
///
/// rusty_xinput doesn't export individual button constants,
/// so we define them here based on the XInput API spec.
pub mod button_flags {
    pub const DPAD_UP: u16 = 0x0001;
    pub const DPAD_DOWN: u16 = 0x0002;
    pub const DPAD_LEFT: u16 = 0x0004;
    pub const DPAD_RIGHT: u16 = 0x0008;
    pub const START: u16 = 0x0010;
    pub const BACK: u16 = 0x0020;
    pub const LEFT_THUMB: u16 = 0x0040;
    pub const RIGHT_THUMB: u16 = 0x0080;
    pub const LEFT_SHOULDER: u16 = 0x0100;
    pub const RIGHT_SHOULDER: u16 = 0x0200;
    pub const A: u16 = 0x1000;
    pub const B: u16 = 0x2000;
    pub const X: u16 = 0x4000;
    pub const Y: u16 = 0x8000;
}

/// One of the 14 XInput digital buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    Start,
    Back,
    LeftThumb,
    RightThumb,
    LeftShoulder,
    RightShoulder,
    A,
    B,
    X,
    Y,
}

/// Fixed button table in bit order
pub const BUTTONS: [Button; 14] = [
    Button::DpadUp,
    Button::DpadDown,
    Button::DpadLeft,
    Button::DpadRight,
    Button::Start,
    Button::Back,
    Button::LeftThumb,
    Button::RightThumb,
    Button::LeftShoulder,
    Button::RightShoulder,
    Button::A,
    Button::B,
    Button::X,
    Button::Y,
];

impl Button {
    /// Bit of this button in the XInput button word
    pub fn flag(self) -> u16 {
        use button_flags::*;
        match self {
            Button::DpadUp => DPAD_UP,
            Button::DpadDown => DPAD_DOWN,
            Button::DpadLeft => DPAD_LEFT,
            Button::DpadRight => DPAD_RIGHT,
            Button::Start => START,
            Button::Back => BACK,
            Button::LeftThumb => LEFT_THUMB,
            Button::RightThumb => RIGHT_THUMB,
            Button::LeftShoulder => LEFT_SHOULDER,
            Button::RightShoulder => RIGHT_SHOULDER,
            Button::A => A,
            Button::B => B,
            Button::X => X,
            Button::Y => Y,
        }
    }

    /// Canonical XInput name ("A", "DPAD_UP", "LEFT_SHOULDER", ...)
    pub fn name(self) -> &'static str {
        match self {
            Button::DpadUp => "DPAD_UP",
            Button::DpadDown => "DPAD_DOWN",
            Button::DpadLeft => "DPAD_LEFT",
            Button::DpadRight => "DPAD_RIGHT",
            Button::Start => "START",
            Button::Back => "BACK",
            Button::LeftThumb => "LEFT_THUMB",
            Button::RightThumb => "RIGHT_THUMB",
            Button::LeftShoulder => "LEFT_SHOULDER",
            Button::RightShoulder => "RIGHT_SHOULDER",
            Button::A => "A",
            Button::B => "B",
            Button::X => "X",
            Button::Y => "Y",
        }
    }

    /// Look up a button by its canonical name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Button> {
        BUTTONS
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(name))
    }

    /// Whether this button is held in the given button word
    pub fn is_pressed(self, buttons: u16) -> bool {
        buttons & self.flag() != 0
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decode a button word into (button, pressed) pairs in table order
pub fn button_values(buttons: u16) -> [(Button, bool); 14] {
    BUTTONS.map(|b| (b, b.is_pressed(buttons)))
}

/// Buttons whose state differs between two button words, with their new state
pub fn changed_buttons(old: u16, new: u16) -> impl Iterator<Item = (Button, bool)> {
    let changed = old ^ new;
    BUTTONS
        .into_iter()
        .filter(move |b| changed & b.flag() != 0)
        .map(move |b| (b, b.is_pressed(new)))
}
