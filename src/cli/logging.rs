//! Logging initialization

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn env_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }))
}

/// Initialize logging
///
/// Logs go to stderr unless `log_file` is set, in which case they are written
/// to a temporary file whose path is returned.
pub fn init_logging(debug: bool, log_file: bool) -> anyhow::Result<Option<PathBuf>> {
    if !log_file {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter(debug))
            .with_target(false)
            .init();
        return Ok(None);
    }

    // Named temp file that outlives the process; the OS cleans it up
    let (file, path) = tempfile::Builder::new()
        .prefix("kustodian-")
        .suffix(".log")
        .tempfile()?
        .keep()?;

    tracing_subscriber::fmt()
        .with_writer(file)
        .with_env_filter(env_filter(debug))
        .with_ansi(false) // No ANSI codes in log file
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Ok(Some(path))
}
