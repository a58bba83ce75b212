//! Process-wide logger instance.
//!
//! Loggers are ordinary values and most code should pass one around. For
//! applications that want a single shared instance, [`install`] stores one
//! for the life of the process and routes the `log` crate's macros to it.

use std::sync::OnceLock;

use crate::console_logger::Logger;
use crate::error::InstallError;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Installs `logger` as the process-wide instance and registers it with the
/// `log` facade.
///
/// The facade's maximum level is left fully open; the logger applies its own
/// threshold, which may change after installation.
///
/// # Errors
///
/// - [`InstallError::AlreadyInstalled`] if an instance was installed before;
///   `logger` is dropped.
/// - [`InstallError::FacadeTaken`] if some other `log` backend was registered
///   first. The logger is still installed and reachable through [`get`].
pub fn install(logger: Logger) -> Result<&'static Logger, InstallError> {
    GLOBAL.set(logger).map_err(|_| InstallError::AlreadyInstalled)?;
    let installed = GLOBAL.get().ok_or(InstallError::AlreadyInstalled)?;
    tracing::debug!(threshold = %installed.threshold(), colorize = installed.colorized(), "installed global logger");

    log::set_logger(installed).map_err(|_| InstallError::FacadeTaken)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(installed)
}

/// The installed instance, if any.
pub fn get() -> Option<&'static Logger> {
    GLOBAL.get()
}
