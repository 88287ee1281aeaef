use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::Error;

const DEFAULT_FILTER: &str = "skywatch=debug";

/// Sends tracing output to `path`; the terminal itself belongs to the UI.
pub fn init(path: &Path) -> Result<(), Error> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    info!(path = %path.display(), "logging initialized");
    Ok(())
}
