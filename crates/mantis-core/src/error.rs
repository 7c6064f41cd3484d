//! Typed error definitions for the log sinks.
//!
//! [`SinkError`] is what a producer can observe from a sink. Queue-full
//! backpressure is deliberately absent: a full queue blocks the caller, it is
//! never reported as a failure.

use thiserror::Error;

/// Option sets that cannot produce a working logger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("project_name must not be empty")]
    EmptyProjectName,

    #[error("log_path must not be empty")]
    EmptyLogPath,

    #[error("buffer.queue_capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("buffer.tick_interval_ms must be at least 1")]
    ZeroTickInterval,
}

/// Errors surfaced by a [`crate::sink::LogSink`].
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink has been stopped; no further records are accepted.
    #[error("sink stopped")]
    Stopped,

    /// Writing or flushing the rotating file failed.
    ///
    /// Only returned from an explicit `sync`. Background flush failures are
    /// counted and dropped, never reported to producers.
    #[error("flush error: {0}")]
    Flush(#[from] std::io::Error),

    /// The log directory or file could not be opened.
    #[error("open error: {0}")]
    Open(std::io::Error),

    /// The background worker could not be started.
    #[error("worker spawn error: {0}")]
    Spawn(std::io::Error),
}

impl SinkError {
    /// Convert into an `io::Error` for the `std::io::Write` adapters.
    pub fn into_io(self) -> std::io::Error {
        match self {
            SinkError::Flush(e) | SinkError::Open(e) | SinkError::Spawn(e) => e,
            SinkError::Stopped => std::io::Error::new(std::io::ErrorKind::BrokenPipe, "sink stopped"),
        }
    }
}
