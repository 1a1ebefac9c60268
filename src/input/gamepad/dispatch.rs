//! Handler registry and the background dispatch loop
//!
//! Registration calls may come from any thread. They only enqueue: the
//! pending adds and removes are folded into the live registry at the top of
//! the next tick, under the same lock that guards the running flag. Delivery
//! then runs against a snapshot with the lock released, so a handler removed
//! mid-tick can still see events already in flight for that tick.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};

use super::deadzone::DeadzoneConfig;
use super::driver::XInputDriver;
use super::handler::{route, EventHandler};
use super::synthesizer::EventSynthesizer;
use crate::error::{Result, XInputError};

/// Default pause between ticks (~60 Hz)
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Handler shared between its owner and the dispatch thread
pub type SharedHandler = Arc<dyn EventHandler>;

/// Handlers are identified by allocation, not by value
fn same_handler(a: &SharedHandler, b: &SharedHandler) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

#[derive(Default)]
struct RegistryState {
    active: Vec<SharedHandler>,
    pending_add: Vec<SharedHandler>,
    pending_remove: Vec<SharedHandler>,
    running: bool,
}

/// Lock-protected handler set with its pending queues
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    inner: Arc<Mutex<RegistryState>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a handler for the next tick. Adding one that is already
    /// registered has no effect.
    pub fn add_handler(&self, handler: SharedHandler) {
        let mut state = self.inner.lock();
        state.pending_remove.retain(|h| !same_handler(h, &handler));
        if !state.pending_add.iter().any(|h| same_handler(h, &handler)) {
            state.pending_add.push(handler);
        }
    }

    /// Queue a handler for removal at the next tick
    pub fn remove_handler(&self, handler: &SharedHandler) {
        let mut state = self.inner.lock();
        state.pending_add.retain(|h| !same_handler(h, handler));
        if !state.pending_remove.iter().any(|h| same_handler(h, handler)) {
            state.pending_remove.push(handler.clone());
        }
    }

    /// Handlers in the live registry (pending changes not included)
    pub fn len(&self) -> usize {
        self.inner.lock().active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether changes are queued for the next tick
    pub fn has_pending(&self) -> bool {
        let state = self.inner.lock();
        !state.pending_add.is_empty() || !state.pending_remove.is_empty()
    }

    /// Apply queued changes and take a snapshot of the live registry
    pub fn snapshot(&self) -> Vec<SharedHandler> {
        let mut state = self.inner.lock();
        let RegistryState {
            active,
            pending_add,
            pending_remove,
            ..
        } = &mut *state;

        for handler in pending_add.drain(..) {
            if !active.iter().any(|h| same_handler(h, &handler)) {
                active.push(handler);
            }
        }
        for handler in pending_remove.drain(..) {
            active.retain(|h| !same_handler(h, &handler));
        }
        active.clone()
    }

    fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    fn set_running(&self, running: bool) {
        self.inner.lock().running = running;
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("HandlerRegistry")
            .field("active", &state.active.len())
            .field("pending_add", &state.pending_add.len())
            .field("pending_remove", &state.pending_remove.len())
            .field("running", &state.running)
            .finish()
    }
}

/// One synthesizer plus the registry it delivers to
///
/// [`tick`](Self::tick) is a single synchronous loop iteration; the
/// [`DispatchThread`] just calls it repeatedly.
#[derive(Debug)]
pub struct Dispatcher {
    synth: EventSynthesizer,
    registry: HandlerRegistry,
}

impl Dispatcher {
    pub fn new(synth: EventSynthesizer, registry: HandlerRegistry) -> Self {
        Self { synth, registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn synthesizer(&self) -> &EventSynthesizer {
        &self.synth
    }

    /// Run one tick; returns the number of events synthesized
    pub fn tick(&mut self, driver: &dyn XInputDriver) -> usize {
        self.tick_at(driver, Instant::now())
    }

    /// [`tick`](Self::tick) with an explicit clock reading
    pub fn tick_at(&mut self, driver: &dyn XInputDriver, now: Instant) -> usize {
        let handlers = self.registry.snapshot();
        let mut count = 0;

        self.synth.synthesize_at(driver, now, |event| {
            count += 1;
            for handler in &handlers {
                if !handler.subscription().accepts(&event) {
                    continue;
                }
                if let Err(e) = route(handler.as_ref(), &event) {
                    warn!("Handler failed on '{}': {}", event, e);
                }
            }
        });

        count
    }
}

/// Background polling loop with an explicit start/stop lifecycle
///
/// Dropping a running `DispatchThread` stops it, but callers should call
/// [`stop`](Self::stop) themselves to observe a panicked loop.
pub struct DispatchThread {
    registry: HandlerRegistry,
    driver: Arc<dyn XInputDriver>,
    deadzones: Arc<DeadzoneConfig>,
    probe_interval: Duration,
    tick_interval: Duration,
    /// Present while the loop is not running
    idle: Option<Dispatcher>,
    worker: Option<JoinHandle<Dispatcher>>,
}

impl DispatchThread {
    /// Wrap an engine instance; nothing runs until [`start`](Self::start)
    pub fn new(synth: EventSynthesizer, driver: Arc<dyn XInputDriver>) -> Self {
        let registry = HandlerRegistry::new();
        Self {
            deadzones: synth.deadzones().clone(),
            probe_interval: synth.probe_interval(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            idle: Some(Dispatcher::new(synth, registry.clone())),
            registry,
            driver,
            worker: None,
        }
    }

    /// Engine with default probe interval over the given thresholds
    pub fn with_deadzones(deadzones: Arc<DeadzoneConfig>, driver: Arc<dyn XInputDriver>) -> Self {
        Self::new(EventSynthesizer::new(deadzones), driver)
    }

    /// Minimum time between tick starts. Takes effect on the next `start`.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Spawn the loop, or resume it after a `stop`. Calling it while running
    /// is a no-op.
    ///
    /// # Errors
    /// [`XInputError::Backend`] if the OS refuses to spawn the thread
    pub fn start(&mut self) -> Result<()> {
        if let Some(worker) = &self.worker {
            if !worker.is_finished() {
                return Ok(());
            }
            // Loop died on its own (a handler panicked); reap it first
            let _ = self.join_worker();
        }

        let dispatcher = self.idle.take().unwrap_or_else(|| self.fresh_dispatcher());
        let registry = self.registry.clone();
        let driver = self.driver.clone();
        let tick_interval = self.tick_interval;

        registry.set_running(true);
        let spawned = thread::Builder::new()
            .name("xinput-dispatch".to_string())
            .spawn(move || run_loop(dispatcher, driver, registry, tick_interval));

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                info!("XInput dispatch thread started ({:?} tick)", self.tick_interval);
                Ok(())
            },
            Err(e) => {
                self.registry.set_running(false);
                self.idle = Some(self.fresh_dispatcher());
                Err(XInputError::Backend(format!("failed to spawn dispatch thread: {}", e)))
            },
        }
    }

    /// Clear the running flag and block until the loop has exited
    ///
    /// The engine state (connectivity, last samples) is kept for a later
    /// `start`.
    ///
    /// # Errors
    /// [`XInputError::Backend`] if the loop had panicked; the engine is reset
    /// but the thread can be started again.
    pub fn stop(&mut self) -> Result<()> {
        self.registry.set_running(false);
        if self.worker.is_none() {
            return Ok(());
        }
        let result = self.join_worker();
        info!("XInput dispatch thread stopped");
        result
    }

    fn join_worker(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        match worker.join() {
            Ok(dispatcher) => {
                self.idle = Some(dispatcher);
                Ok(())
            },
            Err(_) => {
                error!("XInput dispatch thread panicked; engine state was reset");
                self.idle = Some(self.fresh_dispatcher());
                Err(XInputError::Backend("dispatch thread panicked".to_string()))
            },
        }
    }

    fn fresh_dispatcher(&self) -> Dispatcher {
        let synth = EventSynthesizer::new(self.deadzones.clone())
            .with_probe_interval(self.probe_interval);
        Dispatcher::new(synth, self.registry.clone())
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Queue a handler; it sees events from the next tick on
    pub fn add_handler(&self, handler: SharedHandler) {
        self.registry.add_handler(handler);
    }

    pub fn remove_handler(&self, handler: &SharedHandler) {
        self.registry.remove_handler(handler);
    }

    /// Registry handle usable from other threads
    pub fn registry(&self) -> HandlerRegistry {
        self.registry.clone()
    }

    pub fn deadzones(&self) -> &Arc<DeadzoneConfig> {
        &self.deadzones
    }

    /// Engine state while stopped, `None` while the loop owns it
    pub fn dispatcher(&self) -> Option<&Dispatcher> {
        self.idle.as_ref()
    }
}

impl Drop for DispatchThread {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.stop();
        }
    }
}

impl std::fmt::Debug for DispatchThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchThread")
            .field("registry", &self.registry)
            .field("tick_interval", &self.tick_interval)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Loop body (runs on the dispatch thread)
fn run_loop(
    mut dispatcher: Dispatcher,
    driver: Arc<dyn XInputDriver>,
    registry: HandlerRegistry,
    tick_interval: Duration,
) -> Dispatcher {
    debug!("XInput dispatch loop entered");

    while registry.is_running() {
        let tick_start = Instant::now();
        let events = dispatcher.tick_at(driver.as_ref(), tick_start);
        if events > 0 {
            trace!("Dispatched {} events", events);
        }

        // Sleep to maintain the tick interval
        let elapsed = tick_start.elapsed();
        if elapsed < tick_interval {
            thread::sleep(tick_interval - elapsed);
        }
    }

    debug!("XInput dispatch loop exited");
    dispatcher
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::gamepad::buttons::button_flags;
    use crate::input::gamepad::driver::RawSample;
    use crate::input::gamepad::event::{Event, EventKind};
    use crate::input::gamepad::filter::EventFilter;
    use crate::input::gamepad::handler::{CallbackHandler, Subscription};
    use crate::input::gamepad::mock::MockDriver;
    use crate::input::gamepad::slot::Slot;

    /// Handler that records everything it receives
    fn recorder(subscription: Subscription) -> (SharedHandler, Arc<Mutex<Vec<Event>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler = CallbackHandler::new(subscription).on_any(move |e| sink.lock().push(*e));
        (Arc::new(handler), seen)
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            EventSynthesizer::new(Arc::new(DeadzoneConfig::default())),
            HandlerRegistry::new(),
        )
    }

    fn pad(buttons: u16) -> RawSample {
        RawSample {
            buttons,
            ..RawSample::default()
        }
    }

    #[test]
    fn test_registry_applies_queue_at_snapshot() {
        let registry = HandlerRegistry::new();
        let (handler, _) = recorder(Subscription::all());

        registry.add_handler(handler.clone());
        registry.add_handler(handler.clone());
        assert!(registry.is_empty());
        assert!(registry.has_pending());

        assert_eq!(registry.snapshot().len(), 1);
        assert_eq!(registry.len(), 1);

        registry.remove_handler(&handler);
        assert_eq!(registry.len(), 1);
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_add_then_remove_before_tick_cancels() {
        let registry = HandlerRegistry::new();
        let (handler, _) = recorder(Subscription::all());
        registry.add_handler(handler.clone());
        registry.remove_handler(&handler);
        assert!(registry.snapshot().is_empty());

        registry.snapshot();
        registry.add_handler(handler.clone());
        registry.snapshot();
        registry.remove_handler(&handler);
        registry.add_handler(handler);
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[test]
    fn test_handler_added_mid_tick_waits_for_next_tick() {
        let driver = MockDriver::new();
        let mut dispatcher = dispatcher();
        let registry = dispatcher.registry().clone();

        let (late, late_seen) = recorder(Subscription::all());
        let late_slot = Mutex::new(Some(late));
        let adder_registry = registry.clone();
        let adder: SharedHandler = Arc::new(
            CallbackHandler::new(Subscription::all())
                .on_any(|_| {})
                .on_button(move |_| {
                    if let Some(h) = late_slot.lock().take() {
                        adder_registry.add_handler(h);
                    }
                }),
        );
        registry.add_handler(adder);

        let t0 = Instant::now();
        driver.plug(0, pad(button_flags::A));
        dispatcher.tick_at(&driver, t0);
        assert!(late_seen.lock().is_empty());

        driver.plug(0, pad(0));
        dispatcher.tick_at(&driver, t0);
        let seen = late_seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].button_name(), Some("A"));
        assert!(matches!(seen[0].kind, EventKind::ButtonReleased { .. }));
    }

    #[test]
    fn test_removed_handler_stops_receiving() {
        let driver = MockDriver::new();
        let mut dispatcher = dispatcher();
        let (handler, seen) = recorder(Subscription::all());
        dispatcher.registry().add_handler(handler.clone());

        let t0 = Instant::now();
        driver.plug(0, pad(0));
        dispatcher.tick_at(&driver, t0);
        assert_eq!(seen.lock().len(), 1);

        dispatcher.registry().remove_handler(&handler);
        driver.plug(0, pad(button_flags::B));
        assert_eq!(dispatcher.tick_at(&driver, t0), 1);
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_filter_and_slot_routing() {
        let driver = MockDriver::new();
        let mut dispatcher = dispatcher();

        let subscription = Subscription::new([Slot::new(0).unwrap()]).unwrap();
        subscription.set_filter(EventFilter::A | EventFilter::PRESSED_ONLY);
        let (only_a, seen) = recorder(subscription);
        dispatcher.registry().add_handler(only_a);

        let t0 = Instant::now();
        driver.plug(0, pad(0));
        driver.plug(1, pad(0));
        dispatcher.tick_at(&driver, t0);

        driver.plug(0, pad(button_flags::A | button_flags::B));
        driver.plug(1, pad(button_flags::A));
        dispatcher.tick_at(&driver, t0);

        driver.plug(0, pad(0));
        dispatcher.tick_at(&driver, t0);

        let seen = seen.lock();
        let kinds: Vec<_> = seen.iter().map(|e| (e.slot.index(), e.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (0, EventKind::Connected),
                (0, EventKind::ButtonPressed { button: crate::input::gamepad::buttons::Button::A }),
            ]
        );
    }

    #[test]
    fn test_handler_error_does_not_block_others() {
        let driver = MockDriver::new();
        let mut dispatcher = dispatcher();

        // No callbacks at all: every delivery is NotImplemented
        let silent: SharedHandler = Arc::new(CallbackHandler::new(Subscription::all()));
        let (handler, seen) = recorder(Subscription::all());
        dispatcher.registry().add_handler(silent);
        dispatcher.registry().add_handler(handler);

        driver.plug(3, pad(button_flags::X));
        assert_eq!(dispatcher.tick(&driver), 2);
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_thread_start_is_idempotent_and_restartable() {
        let driver = Arc::new(MockDriver::new());
        let mut dispatch = DispatchThread::with_deadzones(
            Arc::new(DeadzoneConfig::default()),
            driver.clone(),
        )
        .with_tick_interval(Duration::from_millis(1));

        assert!(!dispatch.is_running());
        dispatch.start().unwrap();
        dispatch.start().unwrap();
        assert!(dispatch.is_running());
        assert!(dispatch.dispatcher().is_none());

        dispatch.stop().unwrap();
        assert!(!dispatch.is_running());
        assert!(dispatch.dispatcher().is_some());

        dispatch.start().unwrap();
        assert!(dispatch.is_running());
        dispatch.stop().unwrap();
        dispatch.stop().unwrap();
    }

    #[test]
    fn test_stop_keeps_engine_state() {
        let driver = Arc::new(MockDriver::new());
        driver.plug(1, pad(0));
        let mut dispatch = DispatchThread::with_deadzones(
            Arc::new(DeadzoneConfig::default()),
            driver.clone(),
        )
        .with_tick_interval(Duration::from_millis(1));

        dispatch.start().unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while driver.poll_count(1) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        dispatch.stop().unwrap();

        let store = dispatch.dispatcher().map(|d| d.synthesizer().store().connected());
        assert_eq!(store, Some([false, true, false, false]));
    }
}
