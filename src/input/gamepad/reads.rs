//! Stateless convenience reads
//!
//! Each call is one driver poll with no diffing, independent of any
//! [`EventSynthesizer`](super::synthesizer::EventSynthesizer) and safe from
//! any thread. Errors surface directly: a disconnected slot is
//! [`XInputError::NotConnected`], an out-of-range index is
//! [`XInputError::InvalidArgument`].

use super::buttons::button_values;
use super::deadzone::Deadzones;
use super::driver::{BatteryInformation, DriverError, RawSample, XInputDriver};
use super::normalize::{normalize_stick, normalize_trigger, stick_position};
use super::slot::{Slot, SLOT_COUNT};
use crate::error::{Result, XInputError};

/// Connectivity of all four slots
pub fn get_connected(driver: &dyn XInputDriver) -> [bool; SLOT_COUNT] {
    Slot::ALL.map(|slot| driver.poll(slot.user_index()).is_ok())
}

/// Raw state of one controller
pub fn get_state(driver: &dyn XInputDriver, user_index: u32) -> Result<RawSample> {
    let slot = Slot::new(user_index)?;
    Ok(driver.poll(slot.user_index())?)
}

/// `(name, pressed)` for each of the 14 buttons, in table order
pub fn get_button_values(state: &RawSample) -> [(&'static str, bool); 14] {
    button_values(state.buttons).map(|(button, pressed)| (button.name(), pressed))
}

/// Normalized `(left, right)` trigger values
pub fn get_trigger_values(state: &RawSample, deadzones: &Deadzones) -> (f64, f64) {
    (
        normalize_trigger(state.left_trigger, deadzones.trigger),
        normalize_trigger(state.right_trigger, deadzones.trigger),
    )
}

/// Normalized `((lx, ly), (rx, ry))` stick positions
pub fn get_thumb_values(state: &RawSample, deadzones: &Deadzones) -> ((f64, f64), (f64, f64)) {
    let position = |x, y, deadzone| {
        let (dir_x, dir_y, magnitude) = normalize_stick(x, y, deadzone);
        stick_position(dir_x, dir_y, magnitude)
    };
    (
        position(state.thumb_lx, state.thumb_ly, deadzones.left_stick),
        position(state.thumb_rx, state.thumb_ry, deadzones.right_stick),
    )
}

/// Battery type and charge of one controller
///
/// A disconnected slot is not an error here; it reports
/// [`BatteryType::Disconnected`](super::driver::BatteryType::Disconnected).
pub fn get_battery_information(
    driver: &dyn XInputDriver,
    user_index: u32,
) -> Result<BatteryInformation> {
    let slot = Slot::new(user_index)?;
    Ok(driver.battery(slot.user_index())?)
}

/// Rumble motor speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotorSpeed {
    /// Raw XInput value, 0..=65535
    Raw(u16),
    /// Fraction of full speed, 0.0..=1.0
    Fraction(f64),
}

impl MotorSpeed {
    /// Raw motor value; fractions are rounded to `65535 * f`
    pub fn to_raw(self) -> Result<u16> {
        match self {
            MotorSpeed::Raw(v) => Ok(v),
            MotorSpeed::Fraction(f) if (0.0..=1.0).contains(&f) => {
                Ok((f * u16::MAX as f64).round() as u16)
            },
            MotorSpeed::Fraction(f) => Err(XInputError::InvalidArgument(format!(
                "motor speed {} is outside 0.0..=1.0",
                f
            ))),
        }
    }
}

impl From<u16> for MotorSpeed {
    fn from(v: u16) -> Self {
        MotorSpeed::Raw(v)
    }
}

impl From<f64> for MotorSpeed {
    fn from(f: f64) -> Self {
        MotorSpeed::Fraction(f)
    }
}

/// Set both rumble motors
///
/// Returns `false` when the controller is not connected, mirroring the
/// XInput status code, and `true` when the driver accepted the values.
pub fn set_vibration(
    driver: &dyn XInputDriver,
    user_index: u32,
    left: impl Into<MotorSpeed>,
    right: impl Into<MotorSpeed>,
) -> Result<bool> {
    let slot = Slot::new(user_index)?;
    let left = left.into().to_raw()?;
    let right = right.into().to_raw()?;

    match driver.set_vibration(slot.user_index(), left, right) {
        Ok(()) => Ok(true),
        Err(DriverError::NotConnected(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::gamepad::buttons::button_flags;
    use crate::input::gamepad::driver::{BatteryLevel, BatteryType};
    use crate::input::gamepad::mock::MockDriver;

    #[test]
    fn test_get_connected() {
        let driver = MockDriver::new();
        driver.plug(1, RawSample::default());
        driver.plug(3, RawSample::default());
        assert_eq!(get_connected(&driver), [false, true, false, true]);
    }

    #[test]
    fn test_get_state_errors() {
        let driver = MockDriver::new();
        assert_eq!(
            get_state(&driver, 0),
            Err(XInputError::NotConnected { slot: 0 })
        );
        assert!(matches!(
            get_state(&driver, 4),
            Err(XInputError::InvalidArgument(_))
        ));
        // Range check happens before the driver is touched
        assert_eq!(driver.poll_count(0), 1);
    }

    #[test]
    fn test_button_values() {
        let state = RawSample {
            buttons: button_flags::A | button_flags::DPAD_LEFT,
            ..RawSample::default()
        };
        let values = get_button_values(&state);
        assert_eq!(values.len(), 14);
        let pressed: Vec<_> = values.iter().filter(|(_, p)| *p).map(|(n, _)| *n).collect();
        assert_eq!(pressed, vec!["DPAD_LEFT", "A"]);
    }

    #[test]
    fn test_trigger_and_thumb_values_use_deadzones() {
        let state = RawSample {
            left_trigger: 255,
            right_trigger: 20,
            thumb_lx: 32767,
            thumb_ry: 5000,
            ..RawSample::default()
        };
        let deadzones = Deadzones::default();
        assert_eq!(get_trigger_values(&state, &deadzones), (1.0, 0.0));

        let ((lx, ly), right) = get_thumb_values(&state, &deadzones);
        assert!((lx - 1.0).abs() < 1e-9);
        assert_eq!(ly, 0.0);
        assert_eq!(right, (0.0, 0.0));

        let loose = Deadzones {
            trigger: 0,
            right_stick: 0,
            ..Deadzones::default()
        };
        let (_, r) = get_trigger_values(&state, &loose);
        assert!(r > 0.0);
        let (_, (_, ry)) = get_thumb_values(&state, &loose);
        assert!(ry > 0.15 && ry < 0.16);
    }

    #[test]
    fn test_motor_speed() {
        assert_eq!(MotorSpeed::from(1.0).to_raw(), Ok(65535));
        assert_eq!(MotorSpeed::from(0.5).to_raw(), Ok(32768));
        assert_eq!(MotorSpeed::from(1234u16).to_raw(), Ok(1234));
        assert!(MotorSpeed::from(1.5).to_raw().is_err());
        assert!(MotorSpeed::from(-0.1).to_raw().is_err());
    }

    #[test]
    fn test_set_vibration() {
        let driver = MockDriver::new();
        assert_eq!(set_vibration(&driver, 2, 1.0, 0u16), Ok(false));

        driver.plug(2, RawSample::default());
        assert_eq!(set_vibration(&driver, 2, 1.0, 0u16), Ok(true));
        assert_eq!(driver.vibration(2), Some((65535, 0)));

        assert!(set_vibration(&driver, 9, 0u16, 0u16).is_err());
    }

    #[test]
    fn test_battery_information() {
        let driver = MockDriver::new();
        let info = get_battery_information(&driver, 0).unwrap();
        assert_eq!(info.battery_type, BatteryType::Disconnected);

        driver.plug(0, RawSample::default());
        driver.set_battery(
            0,
            BatteryInformation {
                battery_type: BatteryType::Alkaline,
                level: BatteryLevel::Low,
            },
        );
        let info = get_battery_information(&driver, 0).unwrap();
        assert_eq!(info.level, BatteryLevel::Low);
    }
}
