//! Configuration management for the XInput event monitor
//!
//! Handles loading, parsing, and hot-reloading of YAML configuration files.
//! Every section is optional; an empty file yields the XInput defaults.

pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

use crate::input::gamepad::{
    DeadzoneConfig, DeadzoneKind, DeadzoneValue, EventFilter, Slot, SlotSet,
};

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub deadzones: DeadzoneSettings,
    #[serde(default)]
    pub dispatch: DispatchSettings,
    #[serde(default)]
    pub monitor: MonitorSettings,
}

/// Stick and trigger thresholds; each is an integer or `default`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DeadzoneSettings {
    #[serde(default = "default_deadzone")]
    pub left_stick: DeadzoneValue,
    #[serde(default = "default_deadzone")]
    pub right_stick: DeadzoneValue,
    #[serde(default = "default_deadzone")]
    pub trigger: DeadzoneValue,
}

impl Default for DeadzoneSettings {
    fn default() -> Self {
        Self {
            left_stick: default_deadzone(),
            right_stick: default_deadzone(),
            trigger: default_deadzone(),
        }
    }
}

/// Dispatch loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DispatchSettings {
    /// Minimum time between ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Interval between full connectivity probes of all four slots
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            probe_interval_ms: default_probe_interval_ms(),
        }
    }
}

impl DispatchSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }
}

/// What the console monitor listens to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MonitorSettings {
    #[serde(default = "default_slots")]
    pub slots: Vec<u32>,
    /// Filter flag names (`A`, `DPAD_UP`, `LEFT_STICK`, `PRESSED_ONLY`, ...);
    /// absent means everything
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Vec<String>>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            slots: default_slots(),
            filter: None,
        }
    }
}

impl MonitorSettings {
    /// Subscribed slots as a set
    pub fn slot_set(&self) -> Result<SlotSet> {
        self.slots
            .iter()
            .map(|&idx| Slot::new(idx).with_context(|| format!("Invalid monitor slot {}", idx)))
            .collect()
    }

    /// Combined filter mask
    pub fn filter(&self) -> Result<EventFilter> {
        let Some(names) = &self.filter else {
            return Ok(EventFilter::receive_all());
        };
        names.iter().try_fold(EventFilter::empty(), |mask, name| {
            EventFilter::from_flag_name(name)
                .map(|flag| mask | flag)
                .with_context(|| format!("Unknown filter flag '{}'", name))
        })
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse_yaml(&contents)
            .with_context(|| format!("Failed to load config: {}", path))
    }

    /// Parse and validate YAML text
    pub fn parse_yaml(contents: &str) -> Result<Self> {
        // serde_yaml treats an empty document as unit, not as an empty map
        let config: AppConfig = if contents.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        self.apply_deadzones(&DeadzoneConfig::default())
            .context("Invalid deadzones")?;

        if self.dispatch.tick_interval_ms == 0 {
            anyhow::bail!("dispatch.tick_interval_ms must be greater than 0");
        }
        if self.dispatch.probe_interval_ms == 0 {
            anyhow::bail!("dispatch.probe_interval_ms must be greater than 0");
        }

        if self.monitor.slots.is_empty() {
            anyhow::bail!("monitor.slots must list at least one controller");
        }
        self.monitor.slot_set()?;
        self.monitor.filter()?;

        Ok(())
    }

    /// Push the configured thresholds into a live engine
    ///
    /// All three values are checked before any is written.
    pub fn apply_deadzones(&self, target: &DeadzoneConfig) -> crate::error::Result<()> {
        let settings = [
            (DeadzoneKind::LeftStick, self.deadzones.left_stick),
            (DeadzoneKind::RightStick, self.deadzones.right_stick),
            (DeadzoneKind::Trigger, self.deadzones.trigger),
        ];

        let scratch = DeadzoneConfig::default();
        for (kind, value) in settings {
            scratch.set(kind, value)?;
        }
        for (kind, value) in settings {
            target.set(kind, value)?;
        }
        Ok(())
    }
}

fn default_deadzone() -> DeadzoneValue { DeadzoneValue::DEFAULT }
fn default_tick_interval_ms() -> u64 { 16 }
fn default_probe_interval_ms() -> u64 { 1000 }
fn default_slots() -> Vec<u32> { vec![0, 1, 2, 3] }
