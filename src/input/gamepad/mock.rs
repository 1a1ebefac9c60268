//! Scripted in-memory driver
//!
//! Lets the engine run without hardware. Tests push raw samples into a slot
//! (or unplug it) between ticks and inspect how often each slot was polled
//! and which rumble values were written.
//!
//! ```
//! use xinput_events::input::gamepad::driver::{RawSample, XInputDriver};
//! use xinput_events::input::gamepad::mock::MockDriver;
//!
//! let driver = MockDriver::new();
//! driver.plug(0, RawSample::default());
//! assert!(driver.poll(0).is_ok());
//! assert!(driver.poll(1).is_err());
//! ```

use parking_lot::Mutex;

use super::driver::{
    BatteryInformation, BatteryLevel, BatteryType, DriverError, RawSample, XInputDriver,
};
use super::slot::SLOT_COUNT;

#[derive(Debug, Clone, Default)]
struct MockSlot {
    sample: Option<RawSample>,
    polls: usize,
    vibration: Option<(u16, u16)>,
    battery: Option<BatteryInformation>,
    backend_error: Option<String>,
}

/// Driver whose device state is set by the caller
#[derive(Debug, Default)]
pub struct MockDriver {
    slots: Mutex<[MockSlot; SLOT_COUNT]>,
}

impl MockDriver {
    /// All four slots start unplugged
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slot<R>(&self, user_index: u32, f: impl FnOnce(&mut MockSlot) -> R) -> R {
        let mut slots = self.slots.lock();
        f(&mut slots[user_index as usize])
    }

    /// Plug in (or update) a controller. The packet number is bumped on each call.
    ///
    /// # Panics
    /// If `user_index` is outside 0..=3
    pub fn plug(&self, user_index: u32, mut sample: RawSample) {
        self.with_slot(user_index, |slot| {
            let last_packet = slot.sample.map_or(0, |s| s.packet_number);
            sample.packet_number = last_packet.wrapping_add(1);
            slot.sample = Some(sample);
        });
    }

    /// Unplug a controller
    pub fn unplug(&self, user_index: u32) {
        self.with_slot(user_index, |slot| slot.sample = None);
    }

    /// Make every subsequent poll of this slot fail with a backend error
    pub fn fail_with(&self, user_index: u32, message: &str) {
        self.with_slot(user_index, |slot| slot.backend_error = Some(message.to_string()));
    }

    pub fn set_battery(&self, user_index: u32, info: BatteryInformation) {
        self.with_slot(user_index, |slot| slot.battery = Some(info));
    }

    /// Number of polls a slot has received
    pub fn poll_count(&self, user_index: u32) -> usize {
        self.with_slot(user_index, |slot| slot.polls)
    }

    /// Last vibration written to a slot
    pub fn vibration(&self, user_index: u32) -> Option<(u16, u16)> {
        self.with_slot(user_index, |slot| slot.vibration)
    }

    fn check_index(user_index: u32) -> Result<(), DriverError> {
        if (user_index as usize) < SLOT_COUNT {
            Ok(())
        } else {
            Err(DriverError::InvalidSlot(user_index))
        }
    }
}

impl XInputDriver for MockDriver {
    fn poll(&self, user_index: u32) -> Result<RawSample, DriverError> {
        Self::check_index(user_index)?;
        self.with_slot(user_index, |slot| {
            slot.polls += 1;
            if let Some(msg) = &slot.backend_error {
                return Err(DriverError::Backend(msg.clone()));
            }
            slot.sample.ok_or(DriverError::NotConnected(user_index))
        })
    }

    fn set_vibration(&self, user_index: u32, left: u16, right: u16) -> Result<(), DriverError> {
        Self::check_index(user_index)?;
        self.with_slot(user_index, |slot| {
            if slot.sample.is_none() {
                return Err(DriverError::NotConnected(user_index));
            }
            slot.vibration = Some((left, right));
            Ok(())
        })
    }

    fn battery(&self, user_index: u32) -> Result<BatteryInformation, DriverError> {
        Self::check_index(user_index)?;
        self.with_slot(user_index, |slot| {
            Ok(match (slot.sample, slot.battery) {
                (None, _) => BatteryInformation {
                    battery_type: BatteryType::Disconnected,
                    level: BatteryLevel::Empty,
                },
                (Some(_), Some(info)) => info,
                (Some(_), None) => BatteryInformation {
                    battery_type: BatteryType::Wired,
                    level: BatteryLevel::Full,
                },
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plug_bumps_packet_number() {
        let driver = MockDriver::new();
        driver.plug(1, RawSample::default());
        driver.plug(1, RawSample::default());
        assert_eq!(driver.poll(1).unwrap().packet_number, 2);
    }

    #[test]
    fn test_invalid_index_is_distinct_from_disconnected() {
        let driver = MockDriver::new();
        assert_eq!(driver.poll(4), Err(DriverError::InvalidSlot(4)));
        assert_eq!(driver.poll(3), Err(DriverError::NotConnected(3)));
        assert_eq!(driver.poll_count(3), 1);
    }
}
