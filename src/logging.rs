//! Tracing setup. The terminal owns stdout while the UI runs, so log output
//! goes to a file under the platform data directory. `RUST_LOG` overrides
//! the default `info` filter.

use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utils::app_paths::AppPaths;

pub fn init() -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(AppPaths::log_file()?)?;

    let fmt_layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_target(true)
        .with_ansi(false)
        .compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    tracing::info!(target: "system", "logging initialized");
    Ok(())
}
