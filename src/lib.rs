//! XInput event engine
//!
//! Turns polled XInput controller state into typed, deadzone-normalized
//! events and delivers them to subscribed handlers from a background thread.
//!
//! ```no_run
//! use std::sync::Arc;
//! use xinput_events::input::gamepad::{
//!     CallbackHandler, DeadzoneConfig, DispatchThread, MockDriver, SharedHandler, Subscription,
//! };
//!
//! let driver = Arc::new(MockDriver::new());
//! let mut dispatch = DispatchThread::with_deadzones(Arc::new(DeadzoneConfig::default()), driver);
//!
//! let handler: SharedHandler = Arc::new(
//!     CallbackHandler::new(Subscription::all()).on_any(|event| println!("{}", event)),
//! );
//! dispatch.add_handler(handler);
//! dispatch.start()?;
//! // ...
//! dispatch.stop()?;
//! # Ok::<(), xinput_events::XInputError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod input;

pub use error::{Result, XInputError};
