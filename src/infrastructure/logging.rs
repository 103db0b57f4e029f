//! Logging system configuration and initialization
//!
//! - Console output and an optional daily rolling log file
//! - Optional structured JSON logging
//! - Level and per-module filters from configuration, overridable with `RUST_LOG`
//! - UTC timestamps

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    filter::Directive,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

const CRATE_TARGET: &str = "site_inspector_lib";

// Keeps the non-blocking file writer alive for the life of the process
static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// RFC 3339 UTC timestamps with millisecond precision
struct UtcTimeFormatter;

impl FormatTime for UtcTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"))
    }
}

/// Get the log directory, preferring the platform data directory
pub fn get_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(crate::infrastructure::config::defaults::APP_DIR_NAME))
        .or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(std::path::Path::to_path_buf))
        })
        .unwrap_or_default()
        .join("logs")
}

/// Build the filter from configuration unless `RUST_LOG` is set
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    // Dependency noise stays at the configured module level unless tracing
    if !config.level.eq_ignore_ascii_case("trace") {
        let mut modules: Vec<_> = config.module_filters.iter().collect();
        modules.sort();
        for (module, level) in modules {
            let directive = format!("{module}={level}")
                .parse::<Directive>()
                .with_context(|| format!("Invalid log filter for module '{module}'"))?;
            filter = filter.add_directive(directive);
        }
    }

    let own = format!("{CRATE_TARGET}={}", config.level)
        .parse::<Directive>()
        .with_context(|| format!("Invalid log level '{}'", config.level))?;
    Ok(filter.add_directive(own))
}

/// Initialize logging with custom configuration
pub fn init_logging_with_config(config: LoggingConfig) -> Result<()> {
    let env_filter = build_env_filter(&config)?;

    let console_layer = config.console_output.then(|| {
        let layer = fmt::Layer::new()
            .with_writer(std::io::stderr)
            .with_timer(UtcTimeFormatter)
            .with_target(false);
        if config.json_format {
            layer.json().boxed()
        } else {
            layer.boxed()
        }
    });

    let file_layer = if config.file_output {
        let log_dir = get_log_directory();
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;

        let appender = rolling::daily(&log_dir, &config.file_name_prefix);
        let (writer, guard) = non_blocking(appender);
        if LOG_GUARD.set(guard).is_err() {
            return Err(anyhow!("Logging has already been initialized"));
        }

        let layer = fmt::Layer::new()
            .with_writer(writer)
            .with_timer(UtcTimeFormatter)
            .with_ansi(false);
        Some(if config.json_format {
            layer
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed()
        } else {
            layer.with_target(false).boxed()
        })
    } else {
        None
    };

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!(
        level = %config.level,
        json = config.json_format,
        file = config.file_output,
        "Logging initialized"
    );
    Ok(())
}
