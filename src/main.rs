//! XInput events - console monitor
//!
//! Polls up to four XInput controllers and prints button, trigger, stick and
//! connection events as they happen.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use xinput_events::cli::{self, ConsoleHandler};
use xinput_events::config::{AppConfig, ConfigWatcher};
use xinput_events::input::gamepad::{
    DeadzoneConfig, DispatchThread, EventSynthesizer, MockDriver, RawSample, SharedHandler,
    Subscription, XInputDriver,
};

/// XInput event monitor - print controller events to the console
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<String>,

    /// Print controller connectivity and battery, then exit
    #[arg(long)]
    status: bool,

    /// Rumble the controller in this slot (0-3), then exit
    #[arg(long, value_name = "SLOT")]
    vibrate: Option<u32>,

    /// Vibration strength (0.0-1.0)
    #[arg(long, default_value = "0.5")]
    strength: f64,

    /// Vibration duration in milliseconds
    #[arg(long, default_value = "500")]
    duration_ms: u64,

    /// Use the scripted in-memory driver instead of XInput
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let _log_guard = init_logging(&args.log_level, args.log_json, args.log_file.as_deref())?;

    info!("Starting XInput events v{}...", env!("CARGO_PKG_VERSION"));

    let driver = open_driver(args.mock)?;

    if args.status {
        return cli::print_status(driver.as_ref());
    }

    if let Some(slot) = args.vibrate {
        return cli::run_vibrate(
            driver.as_ref(),
            slot,
            args.strength,
            Duration::from_millis(args.duration_ms),
        )
        .await;
    }

    run_monitor(&args, driver).await?;

    info!("XInput events shutdown complete");
    Ok(())
}

/// Run the dispatch thread with a console handler until Ctrl+C
async fn run_monitor(args: &Args, driver: Arc<dyn XInputDriver>) -> Result<()> {
    let deadzones = Arc::new(DeadzoneConfig::default());

    let (config, watcher) = match &args.config {
        Some(path) => {
            info!("Configuration file: {}", path);
            let (watcher, config) = ConfigWatcher::new(path.clone()).await?;
            (config.as_ref().clone(), Some(watcher))
        },
        None => (AppConfig::default(), None),
    };

    config
        .apply_deadzones(&deadzones)
        .context("Failed to apply deadzones")?;

    let subscription = Subscription::new(config.monitor.slot_set()?.iter())?;
    subscription.set_filter(config.monitor.filter()?);

    let synth = EventSynthesizer::new(deadzones.clone())
        .with_probe_interval(config.dispatch.probe_interval());
    let mut dispatch = DispatchThread::new(synth, driver)
        .with_tick_interval(config.dispatch.tick_interval());

    let handler: SharedHandler = Arc::new(ConsoleHandler::new(subscription));
    dispatch.add_handler(handler);
    dispatch.start()?;

    let reloader = watcher.map(|w| w.spawn_deadzone_reloader(deadzones.clone()));

    info!("Monitoring controllers (Ctrl+C to quit)");
    shutdown_signal().await;

    if let Some(task) = reloader {
        task.abort();
    }
    dispatch.stop()?;
    Ok(())
}

/// Real XInput on Windows, the scripted driver elsewhere or on request
fn open_driver(mock: bool) -> Result<Arc<dyn XInputDriver>> {
    if mock {
        return Ok(Arc::new(idle_mock()));
    }
    open_xinput()
}

#[cfg(windows)]
fn open_xinput() -> Result<Arc<dyn XInputDriver>> {
    let driver = xinput_events::input::gamepad::RustyXInputDriver::load()
        .context("Failed to load XInput")?;
    Ok(Arc::new(driver))
}

#[cfg(not(windows))]
fn open_xinput() -> Result<Arc<dyn XInputDriver>> {
    warn!("XInput is only available on Windows; using the mock driver");
    Ok(Arc::new(idle_mock()))
}

/// Mock driver with one idle pad in slot 0
fn idle_mock() -> MockDriver {
    let driver = MockDriver::new();
    driver.plug(0, RawSample::default());
    driver
}

fn init_logging(level: &str, json: bool, file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let console = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed()
    };

    let (file_layer, guard) = match file {
        Some(path) => {
            let path = std::path::Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", e);
        // Without a handler there is nothing to wait for
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
