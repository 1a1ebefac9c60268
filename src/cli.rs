//! Console front end: event printer, status report and rumble test

use anyhow::{Context, Result};
use colored::*;
use std::time::{Duration, Instant};
use tracing::info;

use crate::input::gamepad::reads::{
    get_battery_information, get_connected, set_vibration, MotorSpeed,
};
use crate::input::gamepad::{
    Event, EventHandler, EventKind, Slot, Subscription, XInputDriver,
};

/// Handler that prints every event it receives
pub struct ConsoleHandler {
    subscription: Subscription,
    started: Instant,
}

impl ConsoleHandler {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            subscription,
            started: Instant::now(),
        }
    }

    fn print(&self, event: &Event) {
        let elapsed = self.started.elapsed().as_millis();
        println!(
            "[{}ms] {:12} {}",
            elapsed.to_string().dimmed(),
            event.slot.to_string().white(),
            describe(event)
        );
    }
}

/// Colored one-line description of an event, without the slot
fn describe(event: &Event) -> ColoredString {
    match event.kind {
        EventKind::Connected => "connected".bright_green().bold(),
        EventKind::Disconnected => "disconnected".bright_red().bold(),
        EventKind::ButtonPressed { button } => format!("{} pressed", button).bright_green(),
        EventKind::ButtonReleased { button } => format!("{} released", button).bright_red(),
        EventKind::TriggerMoved { side, value } => {
            format!("{}_TRIGGER {:.3}", side.name(), value).bright_yellow()
        },
        EventKind::StickMoved {
            side, x, y, magnitude, ..
        } => format!(
            "{}_STICK ({:+.3}, {:+.3}) mag {:.3}",
            side.name(),
            x,
            y,
            magnitude
        )
        .bright_cyan(),
    }
}

impl EventHandler for ConsoleHandler {
    fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    fn on_button(&self, event: &Event) -> crate::error::Result<()> {
        self.print(event);
        Ok(())
    }

    fn on_stick(&self, event: &Event) -> crate::error::Result<()> {
        self.print(event);
        Ok(())
    }

    fn on_trigger(&self, event: &Event) -> crate::error::Result<()> {
        self.print(event);
        Ok(())
    }

    fn on_connection(&self, event: &Event) -> crate::error::Result<()> {
        self.print(event);
        Ok(())
    }
}

/// Print connectivity and battery for all four slots
pub fn print_status(driver: &dyn XInputDriver) -> Result<()> {
    println!("\n{}", "=== XInput Controllers ===".bold().cyan());

    let connected = get_connected(driver);
    for slot in Slot::ALL {
        if !connected[slot.index()] {
            println!("  {} {}", slot.to_string().white(), "not connected".bright_black());
            continue;
        }
        let battery = get_battery_information(driver, slot.user_index())
            .with_context(|| format!("Failed to read battery of {}", slot))?;
        println!(
            "  {} {}  battery: {}",
            slot.to_string().white(),
            "connected".bright_green(),
            battery
        );
    }

    let count = connected.iter().filter(|c| **c).count();
    println!("\n{} controller(s) connected", count);
    Ok(())
}

/// Rumble both motors of one controller, then stop them
pub async fn run_vibrate(
    driver: &dyn XInputDriver,
    user_index: u32,
    strength: f64,
    duration: Duration,
) -> Result<()> {
    let speed = MotorSpeed::Fraction(strength);
    let accepted = set_vibration(driver, user_index, speed, speed)
        .context("Failed to start vibration")?;
    if !accepted {
        anyhow::bail!("Controller {} is not connected", user_index);
    }

    info!("Vibrating controller {} at {:.0}% for {:?}", user_index, strength * 100.0, duration);
    tokio::time::sleep(duration).await;

    set_vibration(driver, user_index, 0u16, 0u16).context("Failed to stop vibration")?;
    println!("{}", "Vibration done".green());
    Ok(())
}
