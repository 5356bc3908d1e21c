use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

use color_eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, fmt::writer::BoxMakeWriter, prelude::*};

lazy_static::lazy_static! {
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Initialize logging with default settings (WARN level, log file in the working directory)
pub fn init() -> Result<()> {
    let cwd = std::env::current_dir()?;
    init_with(Some(cwd.join(LOG_FILE.clone())), None)
}

/// Initialize logging with an optional log file and level.
///
/// Without a path, or when the file cannot be opened, events go to stderr.
/// The level overrides `RUST_LOG`; the default is WARN.
pub fn init_with(log_path: Option<PathBuf>, level: Option<tracing::Level>) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.unwrap_or(tracing::Level::WARN).into())
        .from_env_lossy();

    let writer = match log_path {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => BoxMakeWriter::new(std::sync::Mutex::new(file)),
                Err(e) => {
                    eprintln!("Cannot open log file {}: {e}; logging to stderr", path.display());
                    BoxMakeWriter::new(io::stderr)
                }
            }
        }
        None => BoxMakeWriter::new(io::stderr),
    };

    let fmt_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(writer)
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(())
}
