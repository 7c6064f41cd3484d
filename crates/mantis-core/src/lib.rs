//! # mantis-core
//!
//! Write path of the mantis logging facade, providing:
//!
//! - **Configuration** (`config`): logger options, JSON loading, defaults
//! - **Error types** (`error`): `SinkError` and `ConfigError` via thiserror
//! - **Rotating file** (`rolling`): size/time rolling plus age-based retention
//! - **Sinks** (`sink`): the asynchronous buffered writer and the direct sink
//! - **CPU affinity** (`cpu_affinity`): optional pinning of the writer thread

pub mod config;
pub mod cpu_affinity;
pub mod error;
pub mod rolling;
pub mod sink;

pub use config::{BufferConfig, LogOptions, RotationPolicy, SinkMode};
pub use error::{ConfigError, SinkError};
pub use sink::{BufferedWriter, DirectSink, LogSink, SinkStats};
