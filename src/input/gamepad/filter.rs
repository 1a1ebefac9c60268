//! Handler filter masks
//!
//! The low 16 bits reuse the XInput button word layout, so a button's filter
//! bit is its [`Button::flag`]. Stick and trigger sides and the two
//! press/release modifiers sit above them. Undefined bits are kept but never
//! match anything.

use bitflags::bitflags;

use super::buttons::{button_flags, Button};
use super::event::{Event, EventKind, Side};

bitflags! {
    /// Which events a handler wants
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventFilter: u32 {
        const DPAD_UP = button_flags::DPAD_UP as u32;
        const DPAD_DOWN = button_flags::DPAD_DOWN as u32;
        const DPAD_LEFT = button_flags::DPAD_LEFT as u32;
        const DPAD_RIGHT = button_flags::DPAD_RIGHT as u32;
        const START = button_flags::START as u32;
        const BACK = button_flags::BACK as u32;
        const LEFT_THUMB = button_flags::LEFT_THUMB as u32;
        const RIGHT_THUMB = button_flags::RIGHT_THUMB as u32;
        const LEFT_SHOULDER = button_flags::LEFT_SHOULDER as u32;
        const RIGHT_SHOULDER = button_flags::RIGHT_SHOULDER as u32;
        const A = button_flags::A as u32;
        const B = button_flags::B as u32;
        const X = button_flags::X as u32;
        const Y = button_flags::Y as u32;

        const LEFT_STICK = 1 << 16;
        const RIGHT_STICK = 1 << 17;
        const LEFT_TRIGGER = 1 << 18;
        const RIGHT_TRIGGER = 1 << 19;

        /// Only deliver button presses
        const PRESSED_ONLY = 1 << 20;
        /// Only deliver button releases
        const RELEASED_ONLY = 1 << 21;

        const BUTTONS = Self::DPAD_UP.bits() | Self::DPAD_DOWN.bits()
            | Self::DPAD_LEFT.bits() | Self::DPAD_RIGHT.bits()
            | Self::START.bits() | Self::BACK.bits()
            | Self::LEFT_THUMB.bits() | Self::RIGHT_THUMB.bits()
            | Self::LEFT_SHOULDER.bits() | Self::RIGHT_SHOULDER.bits()
            | Self::A.bits() | Self::B.bits() | Self::X.bits() | Self::Y.bits();
        const STICKS = Self::LEFT_STICK.bits() | Self::RIGHT_STICK.bits();
        const TRIGGERS = Self::LEFT_TRIGGER.bits() | Self::RIGHT_TRIGGER.bits();
    }
}

impl Default for EventFilter {
    /// Receive everything, in both press directions
    fn default() -> Self {
        Self::receive_all()
    }
}

impl EventFilter {
    /// Every button, stick and trigger; no press/release restriction
    pub fn receive_all() -> Self {
        Self::BUTTONS | Self::STICKS | Self::TRIGGERS
    }

    /// Build a mask from raw bits without validation
    pub fn from_raw(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }

    /// Filter bit for one button
    pub fn for_button(button: Button) -> Self {
        Self::from_bits_retain(button.flag() as u32)
    }

    pub fn for_stick(side: Side) -> Self {
        match side {
            Side::Left => Self::LEFT_STICK,
            Side::Right => Self::RIGHT_STICK,
        }
    }

    pub fn for_trigger(side: Side) -> Self {
        match side {
            Side::Left => Self::LEFT_TRIGGER,
            Side::Right => Self::RIGHT_TRIGGER,
        }
    }

    /// Look up a flag by name as used in configuration files
    /// (`A`, `DPAD_UP`, `LEFT_STICK`, `PRESSED_ONLY`, ...)
    pub fn from_flag_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        Self::from_name(&upper).filter(|f| {
            // Group aliases are accepted too, but not the empty mask
            !f.is_empty()
        })
    }

    /// Whether an event passes this filter (slot membership is checked separately)
    pub fn accepts(&self, event: &Event) -> bool {
        match event.kind {
            EventKind::Connected | EventKind::Disconnected => true,
            EventKind::ButtonPressed { button } => self.accepts_button(button, true),
            EventKind::ButtonReleased { button } => self.accepts_button(button, false),
            EventKind::StickMoved { side, .. } => self.contains(Self::for_stick(side)),
            EventKind::TriggerMoved { side, .. } => self.contains(Self::for_trigger(side)),
        }
    }

    fn accepts_button(&self, button: Button, pressed: bool) -> bool {
        if !self.contains(Self::for_button(button)) {
            return false;
        }
        let pressed_only = self.contains(Self::PRESSED_ONLY);
        let released_only = self.contains(Self::RELEASED_ONLY);
        if !pressed_only && !released_only {
            return true;
        }
        if pressed {
            pressed_only
        } else {
            released_only
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::gamepad::slot::Slot;

    fn slot0() -> Slot {
        Slot::new(0).unwrap()
    }

    fn pressed(button: Button) -> Event {
        Event::new(slot0(), EventKind::ButtonPressed { button })
    }

    fn released(button: Button) -> Event {
        Event::new(slot0(), EventKind::ButtonReleased { button })
    }

    fn stick(side: Side) -> Event {
        Event::new(
            slot0(),
            EventKind::StickMoved {
                side,
                x: 0.5,
                y: 0.0,
                magnitude: 0.5,
                direction: (1.0, 0.0),
            },
        )
    }

    #[test]
    fn test_default_receives_everything() {
        let filter = EventFilter::default();
        assert!(filter.accepts(&pressed(Button::A)));
        assert!(filter.accepts(&released(Button::DpadRight)));
        assert!(filter.accepts(&stick(Side::Right)));
        assert!(filter.accepts(&Event::new(
            slot0(),
            EventKind::TriggerMoved { side: Side::Left, value: 0.2 }
        )));
    }

    #[test]
    fn test_pressed_only_single_button() {
        let filter = EventFilter::A | EventFilter::PRESSED_ONLY;
        assert!(filter.accepts(&pressed(Button::A)));
        assert!(!filter.accepts(&released(Button::A)));
        assert!(!filter.accepts(&pressed(Button::B)));
        assert!(!filter.accepts(&released(Button::B)));
    }

    #[test]
    fn test_released_only() {
        let filter = EventFilter::BUTTONS | EventFilter::RELEASED_ONLY;
        assert!(!filter.accepts(&pressed(Button::Y)));
        assert!(filter.accepts(&released(Button::Y)));
    }

    #[test]
    fn test_both_modifiers_pass_both_directions() {
        let filter = EventFilter::X | EventFilter::PRESSED_ONLY | EventFilter::RELEASED_ONLY;
        assert!(filter.accepts(&pressed(Button::X)));
        assert!(filter.accepts(&released(Button::X)));
    }

    #[test]
    fn test_stick_and_trigger_sides() {
        let filter = EventFilter::LEFT_STICK | EventFilter::RIGHT_TRIGGER;
        assert!(filter.accepts(&stick(Side::Left)));
        assert!(!filter.accepts(&stick(Side::Right)));
        assert!(!filter.accepts(&pressed(Button::A)));
    }

    #[test]
    fn test_connection_always_passes() {
        let filter = EventFilter::empty();
        assert!(filter.accepts(&Event::new(slot0(), EventKind::Connected)));
        assert!(filter.accepts(&Event::new(slot0(), EventKind::Disconnected)));
        assert!(!filter.accepts(&pressed(Button::A)));
    }

    #[test]
    fn test_undefined_bits_are_inert() {
        let filter = EventFilter::from_raw(0x0C00 | (1 << 30));
        assert!(!filter.accepts(&pressed(Button::A)));
        assert!(!filter.accepts(&stick(Side::Left)));

        let filter = EventFilter::from_raw(EventFilter::A.bits() | (1 << 31));
        assert!(filter.accepts(&pressed(Button::A)));
    }

    #[test]
    fn test_flag_names() {
        assert_eq!(EventFilter::from_flag_name("a"), Some(EventFilter::A));
        assert_eq!(EventFilter::from_flag_name("LEFT_STICK"), Some(EventFilter::LEFT_STICK));
        assert_eq!(EventFilter::from_flag_name("buttons"), Some(EventFilter::BUTTONS));
        assert_eq!(EventFilter::from_flag_name("HOME"), None);
    }
}
