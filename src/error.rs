//! Error taxonomy for the event engine and convenience reads

use thiserror::Error;

use crate::input::gamepad::driver::DriverError;

/// Errors surfaced to callers of the public API
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum XInputError {
    /// The slot is valid but no controller is currently plugged into it
    #[error("Controller [{slot}] appears to be disconnected")]
    NotConnected { slot: u32 },

    /// Slot outside 0..=3, deadzone out of range, or an emptied controller set
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A handler callback was invoked without ever being provided
    #[error("Handler callback not implemented: {0}")]
    NotImplemented(&'static str),

    /// The XInput library failed in a way that is neither of the above
    #[error("XInput backend error: {0}")]
    Backend(String),
}

impl From<DriverError> for XInputError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::NotConnected(slot) => XInputError::NotConnected { slot },
            DriverError::InvalidSlot(slot) => {
                XInputError::InvalidArgument(format!("slot {} is outside 0..=3", slot))
            },
            DriverError::Backend(msg) => XInputError::Backend(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, XInputError>;
