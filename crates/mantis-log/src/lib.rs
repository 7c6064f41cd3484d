//! # mantis-log
//!
//! Leveled structured logging with trace identifiers, written as JSON lines
//! to a rotating file through the buffered sink of `mantis-core`, optionally
//! mirrored to stdout.
//!
//! ```no_run
//! use mantis_log::{LogOptions, Logger, TraceId};
//!
//! let options = LogOptions::default()
//!     .with_project_name("gateway")
//!     .with_log_path("tmp/log")
//!     .with_log_level("info")
//!     .with_stdout(true);
//! let logger = Logger::new(&options)?;
//!
//! let trace = TraceId::from("46b1506e7332f7c1:7f75737aa70629cc:3bb947500f42ad71:1");
//! logger.info(Some(&trace), format_args!("order {} accepted", 42));
//! logger.shutdown();
//! # Ok::<(), mantis_log::LogError>(())
//! ```

pub mod error;
pub mod global;
pub mod level;
pub mod logger;
pub mod trace;
pub mod writer;

pub use error::LogError;
pub use level::parse_level;
pub use logger::Logger;
pub use mantis_core::{BufferConfig, LogOptions, RotationPolicy, SinkMode, SinkStats};
pub use trace::TraceId;
