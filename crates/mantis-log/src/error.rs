use mantis_core::{ConfigError, SinkError};
use thiserror::Error;

/// Errors raised while building or installing a [`crate::Logger`].
#[derive(Debug, Error)]
pub enum LogError {
    /// The options cannot produce a working logger.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Opening or driving the sink failed.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// A process-wide logger has already been installed.
    #[error("global logger already initialized")]
    AlreadyInitialized,

    /// The `tracing` or `log` global hooks are owned by someone else.
    #[error("cannot install global hook: {0}")]
    Global(String),
}
