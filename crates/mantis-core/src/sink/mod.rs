//! Byte sinks that sit between the log encoder and the rotating file.
//!
//! Two variants share one capability (`enqueue`, `sync`, `stop`):
//!
//! - [`BufferedWriter`]: queues records and flushes them from a dedicated
//!   worker thread, so producers never wait on disk I/O.
//! - [`DirectSink`]: writes every record through on the caller's thread.
//!
//! [`LogSink`] picks one of them from [`SinkMode`].
//!
//! ```text
//! producer ──enqueue──► [bounded queue] ──► worker ──► buffer ──flush──► RollingFile
//! ```

pub mod buffered;
pub mod direct;

use std::{
    io::Write,
    sync::atomic::{AtomicU64, Ordering},
};

pub use buffered::BufferedWriter;
pub use direct::DirectSink;

use crate::{
    config::{BufferConfig, LogOptions, SinkMode},
    error::SinkError,
    rolling::{RollingFile, RollingFileConfig},
};

/// Snapshot of a sink's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Records accepted by `enqueue`.
    pub records: u64,
    /// Successful writes to the underlying file.
    pub flushes: u64,
    /// Bytes handed to the underlying file by successful writes.
    pub bytes_flushed: u64,
    /// Writes that failed and whose bytes were dropped.
    pub flush_failures: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    records: AtomicU64,
    flushes: AtomicU64,
    bytes_flushed: AtomicU64,
    flush_failures: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn record(&self) {
        self.records.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn flushed(&self, bytes: usize) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        self.bytes_flushed.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn failed(&self) {
        self.flush_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> SinkStats {
        SinkStats {
            records: self.records.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            bytes_flushed: self.bytes_flushed.load(Ordering::Relaxed),
            flush_failures: self.flush_failures.load(Ordering::Relaxed),
        }
    }
}

/// The byte sink handed to the log encoder.
pub enum LogSink {
    Direct(DirectSink),
    Buffered(BufferedWriter),
}

impl LogSink {
    /// Open the rotating file described by `options` and wrap it in the
    /// configured sink variant.
    pub fn open(options: &LogOptions) -> Result<Self, SinkError> {
        let file = RollingFile::open(RollingFileConfig::from(options)).map_err(SinkError::Open)?;
        Self::from_writer(options.sink, file, &options.buffer)
    }

    /// Wrap an arbitrary writer. The writer is moved into the sink and is
    /// never touched by anything else while the sink runs.
    pub fn from_writer<W>(mode: SinkMode, writer: W, buffer: &BufferConfig) -> Result<Self, SinkError>
    where
        W: Write + Send + 'static,
    {
        Ok(match mode {
            SinkMode::Direct => LogSink::Direct(DirectSink::new(writer)),
            SinkMode::Buffered => LogSink::Buffered(BufferedWriter::spawn(writer, buffer)?),
        })
    }

    pub fn mode(&self) -> SinkMode {
        match self {
            LogSink::Direct(_) => SinkMode::Direct,
            LogSink::Buffered(_) => SinkMode::Buffered,
        }
    }

    /// Hand one encoded record to the sink. Returns the number of bytes
    /// accepted. See [`BufferedWriter::enqueue`] for the blocking policy.
    #[inline]
    pub fn enqueue(&self, bytes: &[u8]) -> Result<usize, SinkError> {
        match self {
            LogSink::Direct(s) => s.enqueue(bytes),
            LogSink::Buffered(s) => s.enqueue(bytes),
        }
    }

    /// Push everything accepted so far to the file.
    pub fn sync(&self) -> Result<(), SinkError> {
        match self {
            LogSink::Direct(s) => s.sync(),
            LogSink::Buffered(s) => s.sync(),
        }
    }

    /// Final flush; afterwards `enqueue` fails with [`SinkError::Stopped`].
    pub fn stop(&self) {
        match self {
            LogSink::Direct(s) => s.stop(),
            LogSink::Buffered(s) => s.stop(),
        }
    }

    pub fn is_stopped(&self) -> bool {
        match self {
            LogSink::Direct(s) => s.is_stopped(),
            LogSink::Buffered(s) => s.is_stopped(),
        }
    }

    pub fn stats(&self) -> SinkStats {
        match self {
            LogSink::Direct(s) => s.stats(),
            LogSink::Buffered(s) => s.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_selects_variant_from_options() {
        let tmp = tempfile::tempdir().unwrap();
        let base = LogOptions::default().with_log_path(tmp.path()).with_project_name("svc");

        let direct = LogSink::open(&base.clone().with_sink(SinkMode::Direct)).unwrap();
        assert_eq!(direct.mode(), SinkMode::Direct);
        direct.stop();

        let buffered = LogSink::open(&base.with_sink(SinkMode::Buffered)).unwrap();
        assert_eq!(buffered.mode(), SinkMode::Buffered);
        buffered.stop();
        assert!(buffered.is_stopped());
    }

    #[test]
    fn buffered_sink_reaches_file_on_stop() {
        let tmp = tempfile::tempdir().unwrap();
        let opts = LogOptions::default().with_log_path(tmp.path()).with_project_name("svc");
        let sink = LogSink::open(&opts).unwrap();

        assert_eq!(sink.enqueue(b"{\"msg\":\"one\"}\n").unwrap(), 14);
        assert_eq!(sink.enqueue(b"{\"msg\":\"two\"}\n").unwrap(), 14);
        sink.stop();

        let content = std::fs::read_to_string(tmp.path().join("svc.log")).unwrap();
        assert_eq!(content, "{\"msg\":\"one\"}\n{\"msg\":\"two\"}\n");
        assert_eq!(sink.stats().records, 2);
        assert!(matches!(sink.enqueue(b"late"), Err(SinkError::Stopped)));
    }
}
