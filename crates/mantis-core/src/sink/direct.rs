//! Synchronous pass-through sink.
//!
//! Every `enqueue` writes on the caller's thread under a mutex. Latency is
//! that of the disk, but nothing is buffered in memory and write errors reach
//! the caller.

use std::{
    io::Write,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use super::{SinkStats, StatsCounters};
use crate::error::SinkError;

pub struct DirectSink {
    inner: Mutex<Box<dyn Write + Send>>,
    stopped: AtomicBool,
    stats: StatsCounters,
}

impl DirectSink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self { inner: Mutex::new(Box::new(writer)), stopped: AtomicBool::new(false), stats: StatsCounters::default() }
    }

    /// Write `bytes` through and return its length.
    pub fn enqueue(&self, bytes: &[u8]) -> Result<usize, SinkError> {
        if self.is_stopped() {
            return Err(SinkError::Stopped);
        }
        self.stats.record();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match inner.write_all(bytes) {
            Ok(()) => {
                self.stats.flushed(bytes.len());
                Ok(bytes.len())
            }
            Err(e) => {
                self.stats.failed();
                Err(SinkError::Flush(e))
            }
        }
    }

    pub fn sync(&self) -> Result<(), SinkError> {
        if self.is_stopped() {
            return Err(SinkError::Stopped);
        }
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).flush()?;
        Ok(())
    }

    /// Flush the file and refuse further records. Repeated calls are no-ops.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Err(e) = self.inner.lock().unwrap_or_else(PoisonError::into_inner).flush() {
            eprintln!("mantis-log: final flush failed: {e}");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> SinkStats {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use super::*;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_through_immediately() {
        let out = Shared::default();
        let sink = DirectSink::new(out.clone());
        assert_eq!(sink.enqueue(b"abc").unwrap(), 3);
        assert_eq!(out.0.lock().unwrap().as_slice(), b"abc");
        assert_eq!(sink.stats().flushes, 1);
        assert_eq!(sink.stats().bytes_flushed, 3);
    }

    #[test]
    fn write_errors_reach_the_caller() {
        let sink = DirectSink::new(Broken);
        let err = sink.enqueue(b"abc").unwrap_err();
        assert!(matches!(err, SinkError::Flush(ref e) if e.kind() == io::ErrorKind::PermissionDenied));
        assert_eq!(sink.stats().flush_failures, 1);
    }

    #[test]
    fn stopped_sink_rejects_records() {
        let sink = DirectSink::new(Shared::default());
        sink.stop();
        sink.stop();
        assert!(matches!(sink.enqueue(b"x"), Err(SinkError::Stopped)));
        assert!(matches!(sink.sync(), Err(SinkError::Stopped)));
    }
}
