//! Tracing subscriber setup.
//!
//! The terminal belongs to the UI, so logs go to a file. Filtering follows
//! `RUST_LOG` and defaults to `info` for this crate.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::Result;

/// Install the global subscriber writing to `log_file_path`.
///
/// Creates the parent directory if needed. Fails if a global subscriber
/// is already installed.
pub fn init(log_file_path: &Path) -> Result<()> {
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = File::create(log_file_path)?;
    build_subscriber(log_file)
        .try_init()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(())
}

/// Build a subscriber that writes plain-text lines to `log_file`.
pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(concat!(env!("CARGO_CRATE_NAME"), "=info")));

    let fmt_layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry().with(env_filter).with(fmt_layer)
}
