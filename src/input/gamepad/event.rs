//! Typed controller events

use std::fmt;

use super::buttons::Button;
use super::slot::Slot;

/// Left or right stick/trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
        }
    }
}

/// What happened on a slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    Connected,
    Disconnected,
    ButtonPressed {
        button: Button,
    },
    ButtonReleased {
        button: Button,
    },
    TriggerMoved {
        side: Side,
        /// Normalized value in [0.0, 1.0]
        value: f64,
    },
    StickMoved {
        side: Side,
        /// Position, i.e. `direction * magnitude`
        x: f64,
        y: f64,
        /// Deadzone-rescaled magnitude in [0.0, 1.0]
        magnitude: f64,
        /// Unit direction of the raw vector, `(0.0, 0.0)` when centered
        direction: (f64, f64),
    },
}

/// Event tagged with the slot it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub slot: Slot,
    pub kind: EventKind,
}

impl Event {
    pub fn new(slot: Slot, kind: EventKind) -> Self {
        Self { slot, kind }
    }

    /// Button involved, for press/release events
    pub fn button(&self) -> Option<Button> {
        match self.kind {
            EventKind::ButtonPressed { button } | EventKind::ButtonReleased { button } => {
                Some(button)
            },
            _ => None,
        }
    }

    /// Canonical button name, for press/release events
    pub fn button_name(&self) -> Option<&'static str> {
        self.button().map(Button::name)
    }

    pub fn is_connection(&self) -> bool {
        matches!(self.kind, EventKind::Connected | EventKind::Disconnected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EventKind::Connected => write!(f, "{} connected", self.slot),
            EventKind::Disconnected => write!(f, "{} disconnected", self.slot),
            EventKind::ButtonPressed { button } => write!(f, "{} {} pressed", self.slot, button),
            EventKind::ButtonReleased { button } => {
                write!(f, "{} {} released", self.slot, button)
            },
            EventKind::TriggerMoved { side, value } => {
                write!(f, "{} {}_TRIGGER {:.3}", self.slot, side.name(), value)
            },
            EventKind::StickMoved {
                side, x, y, magnitude, ..
            } => write!(
                f,
                "{} {}_STICK ({:.3}, {:.3}) mag {:.3}",
                self.slot,
                side.name(),
                x,
                y,
                magnitude
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_accessors() {
        let slot = Slot::new(0).unwrap();
        let event = Event::new(slot, EventKind::ButtonPressed { button: Button::A });
        assert_eq!(event.button_name(), Some("A"));
        assert!(!event.is_connection());

        let event = Event::new(slot, EventKind::Connected);
        assert_eq!(event.button(), None);
        assert!(event.is_connection());
    }

    #[test]
    fn test_display() {
        let slot = Slot::new(1).unwrap();
        let event = Event::new(
            slot,
            EventKind::TriggerMoved {
                side: Side::Left,
                value: 0.5,
            },
        );
        assert_eq!(event.to_string(), "controller2 LEFT_TRIGGER 0.500");
    }
}
