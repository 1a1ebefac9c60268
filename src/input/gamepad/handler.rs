//! Event subscribers
//!
//! A handler implements all four callbacks of [`EventHandler`]; there are no
//! default bodies. [`CallbackHandler`] builds one from closures and answers
//! [`XInputError::NotImplemented`] for any callback it was not given.
//!
//! Which events reach a handler is decided by its [`Subscription`]: the set of
//! slots it listens to and an [`EventFilter`]. Both can be changed while the
//! handler is registered with a running dispatch thread.

use std::fmt;

use parking_lot::RwLock;

use super::event::{Event, EventKind};
use super::filter::EventFilter;
use super::slot::{Slot, SlotSet};
use crate::error::{Result, XInputError};

/// Slot membership and filter mask of one handler
#[derive(Debug)]
pub struct Subscription {
    inner: RwLock<SubscriptionState>,
}

#[derive(Debug, Clone, Copy)]
struct SubscriptionState {
    controllers: SlotSet,
    filter: EventFilter,
}

impl Subscription {
    /// Subscribe to the given slots with a receive-everything filter
    ///
    /// # Errors
    /// [`XInputError::InvalidArgument`] if no slot is given
    pub fn new(controllers: impl IntoIterator<Item = Slot>) -> Result<Self> {
        let controllers: SlotSet = controllers.into_iter().collect();
        if controllers.is_empty() {
            return Err(XInputError::InvalidArgument(
                "a handler must listen to at least one controller".to_string(),
            ));
        }
        Ok(Self {
            inner: RwLock::new(SubscriptionState {
                controllers,
                filter: EventFilter::receive_all(),
            }),
        })
    }

    /// Subscribe to all four slots
    pub fn all() -> Self {
        Self {
            inner: RwLock::new(SubscriptionState {
                controllers: SlotSet::all(),
                filter: EventFilter::receive_all(),
            }),
        }
    }

    pub fn add_controller(&self, slot: Slot) {
        self.inner.write().controllers.insert(slot);
    }

    /// Stop listening to a slot
    ///
    /// # Errors
    /// [`XInputError::InvalidArgument`] if `slot` is the last one subscribed
    pub fn remove_controller(&self, slot: Slot) -> Result<()> {
        let mut state = self.inner.write();
        let mut remaining = state.controllers;
        remaining.remove(slot);
        if remaining.is_empty() {
            return Err(XInputError::InvalidArgument(format!(
                "cannot remove {}: a handler must listen to at least one controller",
                slot
            )));
        }
        state.controllers = remaining;
        Ok(())
    }

    pub fn has_controller(&self, slot: Slot) -> bool {
        self.inner.read().controllers.contains(slot)
    }

    pub fn controllers(&self) -> SlotSet {
        self.inner.read().controllers
    }

    pub fn set_filter(&self, filter: EventFilter) {
        self.inner.write().filter = filter;
    }

    /// Back to receiving everything
    pub fn clear_filter(&self) {
        self.inner.write().filter = EventFilter::receive_all();
    }

    pub fn filter(&self) -> EventFilter {
        self.inner.read().filter
    }

    /// Slot membership and filter check in one read
    pub fn accepts(&self, event: &Event) -> bool {
        let state = self.inner.read();
        state.controllers.contains(event.slot) && state.filter.accepts(event)
    }
}

/// Subscriber contract
///
/// Callbacks run synchronously on the dispatch thread and should return
/// quickly; a slow callback delays every other handler and the next poll.
pub trait EventHandler: Send + Sync {
    fn subscription(&self) -> &Subscription;

    fn on_button(&self, event: &Event) -> Result<()>;

    fn on_stick(&self, event: &Event) -> Result<()>;

    fn on_trigger(&self, event: &Event) -> Result<()>;

    fn on_connection(&self, event: &Event) -> Result<()>;
}

/// Invoke the callback matching the event kind
pub fn route(handler: &dyn EventHandler, event: &Event) -> Result<()> {
    match event.kind {
        EventKind::ButtonPressed { .. } | EventKind::ButtonReleased { .. } => {
            handler.on_button(event)
        },
        EventKind::StickMoved { .. } => handler.on_stick(event),
        EventKind::TriggerMoved { .. } => handler.on_trigger(event),
        EventKind::Connected | EventKind::Disconnected => handler.on_connection(event),
    }
}

/// Callback type for closure-based handlers
pub type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;

/// Handler assembled from closures
pub struct CallbackHandler {
    subscription: Subscription,
    on_button: Option<EventCallback>,
    on_stick: Option<EventCallback>,
    on_trigger: Option<EventCallback>,
    on_connection: Option<EventCallback>,
}

impl CallbackHandler {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            subscription,
            on_button: None,
            on_stick: None,
            on_trigger: None,
            on_connection: None,
        }
    }

    pub fn on_button(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.on_button = Some(Box::new(f));
        self
    }

    pub fn on_stick(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.on_stick = Some(Box::new(f));
        self
    }

    pub fn on_trigger(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.on_trigger = Some(Box::new(f));
        self
    }

    pub fn on_connection(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.on_connection = Some(Box::new(f));
        self
    }

    /// Same closure for all four callbacks
    pub fn on_any(self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        let f = std::sync::Arc::new(f);
        let (b, s, t) = (f.clone(), f.clone(), f.clone());
        self.on_button(move |e| b(e))
            .on_stick(move |e| s(e))
            .on_trigger(move |e| t(e))
            .on_connection(move |e| f(e))
    }
}

fn call(callback: &Option<EventCallback>, name: &'static str, event: &Event) -> Result<()> {
    match callback {
        Some(f) => {
            f(event);
            Ok(())
        },
        None => Err(XInputError::NotImplemented(name)),
    }
}

impl EventHandler for CallbackHandler {
    fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    fn on_button(&self, event: &Event) -> Result<()> {
        call(&self.on_button, "on_button", event)
    }

    fn on_stick(&self, event: &Event) -> Result<()> {
        call(&self.on_stick, "on_stick", event)
    }

    fn on_trigger(&self, event: &Event) -> Result<()> {
        call(&self.on_trigger, "on_trigger", event)
    }

    fn on_connection(&self, event: &Event) -> Result<()> {
        call(&self.on_connection, "on_connection", event)
    }
}

impl fmt::Debug for CallbackHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHandler")
            .field("subscription", &self.subscription)
            .field("on_button", &self.on_button.is_some())
            .field("on_stick", &self.on_stick.is_some())
            .field("on_trigger", &self.on_trigger.is_some())
            .field("on_connection", &self.on_connection.is_some())
            .finish()
    }
}
