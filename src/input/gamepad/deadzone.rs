//! Engine-wide deadzone thresholds
//!
//! Thresholds are shared between the caller and the dispatch thread through an
//! `Arc<DeadzoneConfig>`. Updates take effect on the next poll and never touch
//! events that were already synthesized.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalize::{
    XINPUT_GAMEPAD_LEFT_THUMB_DEADZONE, XINPUT_GAMEPAD_RIGHT_THUMB_DEADZONE,
    XINPUT_GAMEPAD_TRIGGER_THRESHOLD,
};
use crate::error::{Result, XInputError};

/// Which threshold to change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadzoneKind {
    LeftStick,
    RightStick,
    Trigger,
}

impl DeadzoneKind {
    /// Largest accepted explicit value
    pub fn max_value(self) -> u16 {
        match self {
            DeadzoneKind::LeftStick | DeadzoneKind::RightStick => i16::MAX as u16,
            DeadzoneKind::Trigger => u8::MAX as u16,
        }
    }

    /// Built-in XInput default
    pub fn default_value(self) -> u16 {
        match self {
            DeadzoneKind::LeftStick => XINPUT_GAMEPAD_LEFT_THUMB_DEADZONE,
            DeadzoneKind::RightStick => XINPUT_GAMEPAD_RIGHT_THUMB_DEADZONE,
            DeadzoneKind::Trigger => XINPUT_GAMEPAD_TRIGGER_THRESHOLD as u16,
        }
    }
}

/// Requested threshold: explicit or reset to default
///
/// Deserializes from an integer or the string `"default"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DeadzoneValue {
    Value(i64),
    Named(DefaultMarker),
}

/// The literal `default` in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultMarker {
    Default,
}

impl DeadzoneValue {
    pub const DEFAULT: DeadzoneValue = DeadzoneValue::Named(DefaultMarker::Default);
}

/// Snapshot of all three thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadzones {
    pub left_stick: u16,
    pub right_stick: u16,
    pub trigger: u8,
}

impl Default for Deadzones {
    fn default() -> Self {
        Self {
            left_stick: XINPUT_GAMEPAD_LEFT_THUMB_DEADZONE,
            right_stick: XINPUT_GAMEPAD_RIGHT_THUMB_DEADZONE,
            trigger: XINPUT_GAMEPAD_TRIGGER_THRESHOLD,
        }
    }
}

/// Mutable thresholds owned by one engine instance
#[derive(Debug, Default)]
pub struct DeadzoneConfig {
    inner: RwLock<Deadzones>,
}

impl DeadzoneConfig {
    pub fn new(initial: Deadzones) -> Self {
        Self {
            inner: RwLock::new(initial),
        }
    }

    /// Set or reset one threshold
    ///
    /// # Errors
    /// [`XInputError::InvalidArgument`] when an explicit value is outside
    /// 0..=32767 for sticks or 0..=255 for the trigger. The stored value is
    /// left untouched in that case.
    pub fn set(&self, which: DeadzoneKind, value: DeadzoneValue) -> Result<()> {
        let resolved = match value {
            DeadzoneValue::Named(DefaultMarker::Default) => which.default_value(),
            DeadzoneValue::Value(v) => {
                if v < 0 || v > which.max_value() as i64 {
                    return Err(XInputError::InvalidArgument(format!(
                        "{:?} deadzone {} is outside 0..={}",
                        which,
                        v,
                        which.max_value()
                    )));
                }
                v as u16
            },
        };

        let mut zones = self.inner.write();
        match which {
            DeadzoneKind::LeftStick => zones.left_stick = resolved,
            DeadzoneKind::RightStick => zones.right_stick = resolved,
            // Range-checked above
            DeadzoneKind::Trigger => zones.trigger = resolved as u8,
        }
        debug!("{:?} deadzone set to {}", which, resolved);
        Ok(())
    }

    /// Current thresholds
    pub fn get(&self) -> Deadzones {
        *self.inner.read()
    }
}
