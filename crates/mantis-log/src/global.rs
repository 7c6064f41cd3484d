//! Optional process-wide logger.
//!
//! Prefer passing a [`Logger`] to the code that needs it. For binaries that
//! want a single shared instance, [`init_global`] installs one, exactly once:
//! the first call wins and every later call fails with
//! [`LogError::AlreadyInitialized`]. Installing also makes the logger the
//! `tracing` global default and routes `log` crate records into it.

use std::{fmt, sync::OnceLock};

use tracing_log::LogTracer;

use crate::{Logger, TraceId, error::LogError};

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Install `logger` as the process-wide logger.
///
/// The `tracing` and `log` hooks are claimed before the logger is stored, so
/// a failed call leaves [`global`] empty.
pub fn init_global(logger: Logger) -> Result<&'static Logger, LogError> {
    if GLOBAL.get().is_some() {
        return Err(LogError::AlreadyInitialized);
    }

    tracing::dispatcher::set_global_default(logger.dispatch().clone())
        .map_err(|e| LogError::Global(e.to_string()))?;
    LogTracer::init().map_err(|e| LogError::Global(e.to_string()))?;

    GLOBAL.set(logger).map_err(|_| LogError::AlreadyInitialized)?;
    GLOBAL.get().ok_or(LogError::AlreadyInitialized)
}

/// The installed logger, if any.
pub fn global() -> Option<&'static Logger> {
    GLOBAL.get()
}

/// Log through the global logger. A no-op until one is installed.
#[track_caller]
pub fn info(trace: Option<&TraceId>, message: impl fmt::Display) {
    if let Some(logger) = global() {
        logger.info(trace, message);
    }
}

#[track_caller]
pub fn debug(trace: Option<&TraceId>, message: impl fmt::Display) {
    if let Some(logger) = global() {
        logger.debug(trace, message);
    }
}

#[track_caller]
pub fn warn(trace: Option<&TraceId>, message: impl fmt::Display) {
    if let Some(logger) = global() {
        logger.warn(trace, message);
    }
}

#[track_caller]
pub fn error(trace: Option<&TraceId>, message: impl fmt::Display) {
    if let Some(logger) = global() {
        logger.error(trace, message);
    }
}
