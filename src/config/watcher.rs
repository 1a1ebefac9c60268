//! Configuration file watcher for hot-reload support
//!
//! Only the deadzone section is meant to change at runtime; the monitor
//! re-applies it to the live engine on every successful reload.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::AppConfig;
use crate::input::gamepad::DeadzoneConfig;

/// Delay between a modify notification and the re-read, so editors can
/// finish writing
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(100);

/// Watches one config file and yields each successfully reloaded version
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<AppConfig>,
}

impl ConfigWatcher {
    /// Load the file once and start watching it
    pub async fn new(config_path: String) -> Result<(Self, Arc<AppConfig>)> {
        let (tx, rx) = mpsc::channel(10);

        let initial_config = AppConfig::load(&config_path)
            .await
            .context("Failed to load initial config")?;
        let initial_config = Arc::new(initial_config);

        let reload_path = config_path.clone();

        // notify callbacks run on their own OS thread, outside the runtime
        let runtime_handle = tokio::runtime::Handle::current();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Modify(_)) {
                        return;
                    }
                    debug!("Config file modified: {:?}", event.paths);

                    let path = reload_path.clone();
                    let tx = tx.clone();
                    runtime_handle.spawn(async move {
                        tokio::time::sleep(RELOAD_DEBOUNCE).await;

                        match AppConfig::load(&path).await {
                            Ok(new_config) => {
                                info!("Configuration reloaded");
                                if let Err(e) = tx.send(new_config).await {
                                    error!("Failed to send config update: {}", e);
                                }
                            },
                            Err(e) => {
                                warn!("Failed to reload config (keeping old config): {:#}", e);
                            },
                        }
                    });
                },
                Err(e) => {
                    error!("Watch error: {}", e);
                },
            }
        })?;

        watcher
            .watch(Path::new(&config_path), RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config file: {}", config_path))?;

        info!("Config file watcher started for: {}", config_path);

        Ok((
            Self {
                _watcher: watcher,
                rx,
            },
            initial_config,
        ))
    }

    /// Wait for the next config update
    /// Returns None if the watcher has been closed
    pub async fn next_config(&mut self) -> Option<AppConfig> {
        self.rx.recv().await
    }

    /// Apply the deadzones of every reload to a live engine until the
    /// watcher closes
    pub fn spawn_deadzone_reloader(mut self, deadzones: Arc<DeadzoneConfig>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(config) = self.next_config().await {
                match config.apply_deadzones(&deadzones) {
                    Ok(()) => info!("Deadzones updated: {:?}", deadzones.get()),
                    Err(e) => warn!("Ignoring reloaded deadzones: {}", e),
                }
            }
            debug!("Config watcher closed");
        })
    }
}
