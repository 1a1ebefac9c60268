//! Driver boundary
//!
//! The engine never talks to XInput directly. Everything it needs from the
//! device layer goes through [`XInputDriver`]: a state poll, a vibration
//! write and a battery query. The Windows backend lives in
//! [`super::xinput_backend`], the scripted test double in [`super::mock`].

use std::fmt;

use thiserror::Error;

/// Raw controller state as reported by one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    /// Device packet counter. Carried along but not used for change detection.
    pub packet_number: u32,
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

/// Why a driver call produced no data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("controller {0} is not connected")]
    NotConnected(u32),

    /// Caller error: user index outside 0..=3
    #[error("invalid user index {0}")]
    InvalidSlot(u32),

    #[error("{0}")]
    Backend(String),
}

/// Battery chemistry or connection type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryType {
    Disconnected,
    Wired,
    Alkaline,
    Nimh,
    Unknown,
}

impl BatteryType {
    /// Decode the XInput `BatteryType` byte
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => BatteryType::Disconnected,
            0x01 => BatteryType::Wired,
            0x02 => BatteryType::Alkaline,
            0x03 => BatteryType::Nimh,
            _ => BatteryType::Unknown,
        }
    }
}

/// Coarse charge level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryLevel {
    Empty,
    Low,
    Medium,
    Full,
}

impl BatteryLevel {
    /// Decode the XInput `BatteryLevel` byte; out-of-range values saturate to `Full`
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => BatteryLevel::Empty,
            0x01 => BatteryLevel::Low,
            0x02 => BatteryLevel::Medium,
            _ => BatteryLevel::Full,
        }
    }
}

/// Battery report for a gamepad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryInformation {
    pub battery_type: BatteryType,
    pub level: BatteryLevel,
}

impl fmt::Display for BatteryInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({:?})", self.battery_type, self.level)
    }
}

/// Device access used by the engine and the convenience reads
///
/// Implementations must be callable from the dispatch thread and any caller
/// thread at the same time.
pub trait XInputDriver: Send + Sync {
    /// Read the current state of one user index
    fn poll(&self, user_index: u32) -> Result<RawSample, DriverError>;

    /// Set both rumble motor speeds
    fn set_vibration(&self, user_index: u32, left: u16, right: u16) -> Result<(), DriverError>;

    /// Query the gamepad battery
    fn battery(&self, user_index: u32) -> Result<BatteryInformation, DriverError>;
}
