//! XInput gamepad event engine
//!
//! A [`DispatchThread`] polls an [`XInputDriver`] at a fixed tick, turns raw
//! state changes into typed [`Event`]s through an [`EventSynthesizer`] and
//! delivers them to registered [`EventHandler`]s. The stateless reads in
//! [`reads`] bypass the engine entirely.

pub mod buttons;
pub mod deadzone;
pub mod dispatch;
pub mod driver;
pub mod event;
pub mod filter;
pub mod handler;
pub mod mock;
pub mod normalize;
pub mod reads;
pub mod slot;
pub mod state_store;
pub mod synthesizer;
#[cfg(windows)]
pub mod xinput_backend;

pub use buttons::{button_flags, Button};
pub use deadzone::{DeadzoneConfig, DeadzoneKind, DeadzoneValue, Deadzones};
pub use dispatch::{DispatchThread, Dispatcher, HandlerRegistry, SharedHandler};
pub use driver::{BatteryInformation, BatteryLevel, BatteryType, DriverError, RawSample, XInputDriver};
pub use event::{Event, EventKind, Side};
pub use filter::EventFilter;
pub use handler::{CallbackHandler, EventHandler, Subscription};
pub use mock::MockDriver;
pub use reads::MotorSpeed;
pub use slot::{Slot, SlotSet};
pub use synthesizer::EventSynthesizer;
#[cfg(windows)]
pub use xinput_backend::RustyXInputDriver;
