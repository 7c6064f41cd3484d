//! The logging facade.
//!
//! A [`Logger`] owns its `tracing` dispatcher and its sink. It is not
//! installed anywhere: pass it to the code that logs, or hand it to
//! [`crate::global::init_global`] once if a process-wide logger is wanted.
//!
//! Records are JSON lines with the event fields flattened next to
//! `timestamp`, `level` and `message`:
//!
//! ```text
//! {"timestamp":"…","level":"INFO","message":"order accepted","project":"gw",
//!  "trace_id":"46b1506e7332f7c1:…","caller":"src/orders.rs:42","target":"mantis_log::logger"}
//! ```

use std::{backtrace::Backtrace, fmt, panic::Location, sync::Arc};

use mantis_core::{LogOptions, LogSink, SinkStats};
use tracing::{Dispatch, Level, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, fmt as tfmt, layer::SubscriberExt};

use crate::{
    error::LogError,
    level::{at_least, parse_level},
    trace::TraceId,
    writer::SinkMakeWriter,
};

/// Emit one event at a runtime level. `tracing` needs the level as a
/// constant at each callsite, hence one arm per level.
macro_rules! emit {
    ($level:expr, $($rest:tt)+) => {
        match $level {
            Level::ERROR => tracing::event!(Level::ERROR, $($rest)+),
            Level::WARN => tracing::event!(Level::WARN, $($rest)+),
            Level::INFO => tracing::event!(Level::INFO, $($rest)+),
            Level::DEBUG => tracing::event!(Level::DEBUG, $($rest)+),
            _ => tracing::event!(Level::TRACE, $($rest)+),
        }
    };
}

pub struct Logger {
    dispatch: Dispatch,
    sink: Arc<LogSink>,
    project: String,
    max_level: LevelFilter,
    stacktrace_level: Level,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("project", &self.project)
            .field("max_level", &self.max_level)
            .field("stacktrace_level", &self.stacktrace_level)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Open the rotating file described by `options` and build a logger on it.
    pub fn new(options: &LogOptions) -> Result<Self, LogError> {
        options.validate()?;
        let sink = LogSink::open(options)?;
        Ok(Self::from_sink(options, sink))
    }

    /// Build a logger that writes to an already constructed sink.
    pub fn from_sink(options: &LogOptions, sink: LogSink) -> Self {
        let max_level = LevelFilter::from_level(parse_level(&options.log_level));
        let sink = Arc::new(sink);

        let file_layer = tfmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(SinkMakeWriter::new(Arc::clone(&sink)));

        // Console output is independent of the file: no ordering between them.
        let stdout_layer = options.stdout.then(|| {
            tfmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stdout)
        });

        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(max_level.to_string()))
            .with(file_layer)
            .with(stdout_layer);

        Self {
            dispatch: Dispatch::new(subscriber),
            sink,
            project: options.project_name.clone(),
            max_level,
            stacktrace_level: parse_level(&options.stacktrace_level),
        }
    }

    /// The dispatcher behind this logger, for scoping plain `tracing` macros
    /// with `tracing::dispatcher::with_default`.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.max_level
    }

    /// Emit one record. `caller` is the location of the code calling this.
    #[track_caller]
    pub fn log(&self, level: Level, trace: Option<&TraceId>, message: impl fmt::Display) {
        if !self.enabled(level) {
            return;
        }
        let location = Location::caller();
        let caller = format!("{}:{}", short_path(location.file()), location.line());
        let trace_id = trace.map(TraceId::as_str);
        let stacktrace = at_least(level, self.stacktrace_level).then(|| Backtrace::force_capture().to_string());

        tracing::dispatcher::with_default(&self.dispatch, || {
            emit!(
                level,
                project = self.project.as_str(),
                trace_id,
                caller = caller.as_str(),
                stacktrace = stacktrace.as_deref(),
                "{}",
                message
            );
        });
    }

    #[track_caller]
    pub fn debug(&self, trace: Option<&TraceId>, message: impl fmt::Display) {
        self.log(Level::DEBUG, trace, message);
    }

    #[track_caller]
    pub fn info(&self, trace: Option<&TraceId>, message: impl fmt::Display) {
        self.log(Level::INFO, trace, message);
    }

    #[track_caller]
    pub fn warn(&self, trace: Option<&TraceId>, message: impl fmt::Display) {
        self.log(Level::WARN, trace, message);
    }

    #[track_caller]
    pub fn error(&self, trace: Option<&TraceId>, message: impl fmt::Display) {
        self.log(Level::ERROR, trace, message);
    }

    /// Wait until every record emitted so far has reached the file.
    pub fn sync(&self) -> Result<(), LogError> {
        Ok(self.sink.sync()?)
    }

    /// Stop the sink after a final flush. Records emitted afterwards are
    /// rejected by the sink.
    pub fn shutdown(&self) {
        self.sink.stop();
    }

    pub fn stats(&self) -> SinkStats {
        self.sink.stats()
    }
}

/// Keep the last two path components, e.g. `src/orders.rs`.
fn short_path(file: &str) -> &str {
    let mut seps = file.rmatch_indices(['/', '\\']);
    match (seps.next(), seps.next()) {
        (Some(_), Some((idx, _))) => &file[idx + 1..],
        _ => file,
    }
}
