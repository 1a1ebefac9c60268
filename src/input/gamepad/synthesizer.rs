//! State diffing and event synthesis
//!
//! One [`EventSynthesizer::synthesize`] call is one pass over all four slots:
//!
//! 1. Connectivity. A full probe of every slot runs at most once per probe
//!    interval (one second by default). Between full probes only slots that
//!    were connected are polled, so an unplug is noticed on the next tick
//!    while a plug-in may wait for the next full probe.
//! 2. Buttons, from the XOR of the old and new button words.
//! 3. Triggers, when the raw byte changed and the normalized value differs
//!    from the last emitted one.
//! 4. Sticks, when either raw axis changed and the normalized position
//!    differs from the last emitted one.
//! 5. The new raw sample replaces the stored one.
//!
//! A pass is finite and not restartable; every call starts over at slot 0.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, trace, warn};

use super::buttons::changed_buttons;
use super::deadzone::{DeadzoneConfig, Deadzones};
use super::driver::{DriverError, RawSample, XInputDriver};
use super::event::{Event, EventKind, Side};
use super::normalize::{normalize_stick, normalize_trigger, stick_position};
use super::slot::Slot;
use super::state_store::{side_index, SlotState, StateStore};

/// Default interval between full connectivity probes
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(1);

/// Engine instance: deadzones, per-slot memory and probe throttling
#[derive(Debug)]
pub struct EventSynthesizer {
    deadzones: Arc<DeadzoneConfig>,
    store: StateStore,
    probe_interval: Duration,
    last_full_probe: Option<Instant>,
}

impl EventSynthesizer {
    pub fn new(deadzones: Arc<DeadzoneConfig>) -> Self {
        Self {
            deadzones,
            store: StateStore::new(),
            probe_interval: DEFAULT_PROBE_INTERVAL,
            last_full_probe: None,
        }
    }

    /// Override the full connectivity probe interval
    pub fn with_probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }

    pub fn probe_interval(&self) -> Duration {
        self.probe_interval
    }

    /// Shared thresholds; setting them affects subsequent passes only
    pub fn deadzones(&self) -> &Arc<DeadzoneConfig> {
        &self.deadzones
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Run one pass and collect the events in emission order
    pub fn poll_events(&mut self, driver: &dyn XInputDriver) -> Vec<Event> {
        self.poll_events_at(driver, Instant::now())
    }

    /// [`poll_events`](Self::poll_events) with an explicit clock reading
    pub fn poll_events_at(&mut self, driver: &dyn XInputDriver, now: Instant) -> Vec<Event> {
        let mut events = Vec::new();
        self.synthesize_at(driver, now, |event| events.push(event));
        events
    }

    /// Run one pass, handing each event to `emit` as soon as it is produced
    pub fn synthesize(&mut self, driver: &dyn XInputDriver, emit: impl FnMut(Event)) {
        self.synthesize_at(driver, Instant::now(), emit)
    }

    /// [`synthesize`](Self::synthesize) with an explicit clock reading
    pub fn synthesize_at(
        &mut self,
        driver: &dyn XInputDriver,
        now: Instant,
        mut emit: impl FnMut(Event),
    ) {
        let full_probe = self.should_probe_all(now);
        if full_probe {
            trace!("Full connectivity probe");
            self.last_full_probe = Some(now);
        }

        // Read once so every slot in this pass sees the same thresholds
        let deadzones = self.deadzones.get();

        for slot in Slot::ALL {
            let state = self.store.slot_mut(slot);
            let was_connected = state.connected;

            // Disconnected slots are assumed to stay disconnected until the next full probe
            if !was_connected && !full_probe {
                continue;
            }

            let Some(sample) = poll_slot(driver, slot) else {
                if was_connected {
                    state.reset();
                    debug!("XInput {} disconnected", slot);
                    emit(Event::new(slot, EventKind::Disconnected));
                }
                continue;
            };

            if !was_connected {
                state.connected = true;
                debug!("XInput {} connected", slot);
                emit(Event::new(slot, EventKind::Connected));
            }

            diff_slot(slot, state, &sample, &deadzones, &mut emit);
            state.raw = sample;
        }
    }

    fn should_probe_all(&self, now: Instant) -> bool {
        self.last_full_probe
            .map_or(true, |last| now.saturating_duration_since(last) >= self.probe_interval)
    }
}

/// Poll one slot, folding every failure into "not connected"
fn poll_slot(driver: &dyn XInputDriver, slot: Slot) -> Option<RawSample> {
    match driver.poll(slot.user_index()) {
        Ok(sample) => Some(sample),
        Err(DriverError::NotConnected(_)) => None,
        Err(DriverError::InvalidSlot(idx)) => {
            error!("Driver rejected user index {} for {}", idx, slot);
            None
        },
        Err(DriverError::Backend(msg)) => {
            warn!("XInput error for {}: {}", slot, msg);
            None
        },
    }
}

/// Emit button, trigger and stick events for one connected slot
fn diff_slot(
    slot: Slot,
    state: &mut SlotState,
    new: &RawSample,
    deadzones: &Deadzones,
    emit: &mut impl FnMut(Event),
) {
    let old = state.raw;

    for (button, pressed) in changed_buttons(old.buttons, new.buttons) {
        let kind = if pressed {
            EventKind::ButtonPressed { button }
        } else {
            EventKind::ButtonReleased { button }
        };
        debug!("XInput button event: {} {:?}", slot, kind);
        emit(Event::new(slot, kind));
    }

    let triggers = [
        (Side::Left, old.left_trigger, new.left_trigger),
        (Side::Right, old.right_trigger, new.right_trigger),
    ];
    for (side, old_raw, new_raw) in triggers {
        if old_raw == new_raw {
            continue;
        }
        let value = normalize_trigger(new_raw, deadzones.trigger);
        let last = &mut state.triggers[side_index(side)];
        if value != *last {
            *last = value;
            emit(Event::new(slot, EventKind::TriggerMoved { side, value }));
        }
    }

    let sticks = [
        (
            Side::Left,
            (old.thumb_lx, old.thumb_ly),
            (new.thumb_lx, new.thumb_ly),
            deadzones.left_stick,
        ),
        (
            Side::Right,
            (old.thumb_rx, old.thumb_ry),
            (new.thumb_rx, new.thumb_ry),
            deadzones.right_stick,
        ),
    ];
    for (side, old_raw, (raw_x, raw_y), deadzone) in sticks {
        if old_raw == (raw_x, raw_y) {
            continue;
        }
        let (dir_x, dir_y, magnitude) = normalize_stick(raw_x, raw_y, deadzone);
        let (x, y) = stick_position(dir_x, dir_y, magnitude);
        let last = &mut state.sticks[side_index(side)];
        if (x, y) != *last {
            *last = (x, y);
            emit(Event::new(
                slot,
                EventKind::StickMoved {
                    side,
                    x,
                    y,
                    magnitude,
                    direction: (dir_x, dir_y),
                },
            ));
        }
    }
}
