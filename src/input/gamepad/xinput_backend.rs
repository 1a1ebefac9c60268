//! XInput driver backed by rusty_xinput
//!
//! Loads the first available XInput DLL and exposes it through
//! [`XInputDriver`]. Polling works without a focused window.

use rusty_xinput::{XInputHandle, XInputState, XInputUsageError};
use tracing::{debug, warn};

use super::driver::{
    BatteryInformation, BatteryLevel, BatteryType, DriverError, RawSample, XInputDriver,
};

impl From<&XInputState> for RawSample {
    fn from(state: &XInputState) -> Self {
        Self {
            packet_number: state.raw.dwPacketNumber,
            buttons: state.raw.Gamepad.wButtons,
            left_trigger: state.left_trigger(),
            right_trigger: state.right_trigger(),
            thumb_lx: state.raw.Gamepad.sThumbLX,
            thumb_ly: state.raw.Gamepad.sThumbLY,
            thumb_rx: state.raw.Gamepad.sThumbRX,
            thumb_ry: state.raw.Gamepad.sThumbRY,
        }
    }
}

fn map_usage_error(user_index: u32, err: XInputUsageError) -> DriverError {
    match err {
        XInputUsageError::DeviceNotConnected => DriverError::NotConnected(user_index),
        XInputUsageError::InvalidControllerID => DriverError::InvalidSlot(user_index),
        other => DriverError::Backend(format!("{:?}", other)),
    }
}

/// Driver for the system XInput library
pub struct RustyXInputDriver {
    handle: XInputHandle,
}

impl RustyXInputDriver {
    /// Load the default XInput DLL (1.4, 9.1.0, 1.3, ...)
    pub fn load() -> Result<Self, DriverError> {
        match XInputHandle::load_default() {
            Ok(handle) => {
                debug!("XInput initialized successfully");
                Ok(Self { handle })
            },
            Err(e) => {
                warn!("XInput library not available: {:?}", e);
                Err(DriverError::Backend(format!(
                    "XInput library was not found: {:?}",
                    e
                )))
            },
        }
    }
}

// SAFETY: the XInput entry points are documented as thread-safe, and the
// handle only holds the loaded module and its function pointers.
unsafe impl Send for RustyXInputDriver {}
unsafe impl Sync for RustyXInputDriver {}

impl XInputDriver for RustyXInputDriver {
    fn poll(&self, user_index: u32) -> Result<RawSample, DriverError> {
        self.handle
            .get_state(user_index)
            .map(|state| RawSample::from(&state))
            .map_err(|e| map_usage_error(user_index, e))
    }

    fn set_vibration(&self, user_index: u32, left: u16, right: u16) -> Result<(), DriverError> {
        self.handle
            .set_state(user_index, left, right)
            .map_err(|e| map_usage_error(user_index, e))
    }

    fn battery(&self, user_index: u32) -> Result<BatteryInformation, DriverError> {
        let info = self
            .handle
            .get_gamepad_battery_information(user_index)
            .map_err(|e| map_usage_error(user_index, e))?;
        Ok(BatteryInformation {
            battery_type: BatteryType::from_raw(info.BatteryType),
            level: BatteryLevel::from_raw(info.BatteryLevel),
        })
    }
}
