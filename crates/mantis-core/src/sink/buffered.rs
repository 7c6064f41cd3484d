//! Asynchronous buffered writer.
//!
//! Producers copy each encoded record onto a bounded crossbeam channel and
//! return. One dedicated thread owns the accumulation buffer and the file; it
//! appends queued records to the buffer and writes the buffer out when
//!
//! - the periodic tick fires and the buffer is non-empty,
//! - the buffer grows beyond `flush_threshold`,
//! - a `sync` request arrives (the queue is drained first), or
//! - the writer is stopped (the queue is drained first).
//!
//! A failed write drops the buffered bytes and the worker carries on: disk
//! trouble must never stall or crash the producers.
//!
//! ```text
//! Running ──stop()──► Stopping (drain + final flush) ──► Stopped
//! ```

use std::{
    io::{self, Write},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, select};

use super::{SinkStats, StatsCounters};
use crate::{config::BufferConfig, cpu_affinity, error::SinkError};

const WORKER_THREAD_NAME: &str = "mantis-log-writer";

/// Out-of-band requests to the worker.
enum Control {
    Sync(Sender<io::Result<()>>),
    Stop,
}

struct Shared {
    stopped: AtomicBool,
    stats: StatsCounters,
}

/// Byte sink that never performs disk I/O on the caller's thread.
pub struct BufferedWriter {
    tx: Sender<Vec<u8>>,
    control: Sender<Control>,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl BufferedWriter {
    /// Start the worker thread. `sink` is moved into it and written by it
    /// alone from now on.
    pub fn spawn<W>(sink: W, config: &BufferConfig) -> Result<Self, SinkError>
    where
        W: Write + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded::<Vec<u8>>(config.queue_capacity.max(1));
        let (control, control_rx) = crossbeam_channel::unbounded::<Control>();
        let shared = Arc::new(Shared { stopped: AtomicBool::new(false), stats: StatsCounters::default() });

        let state = FlushState {
            sink,
            buf: Vec::with_capacity(config.flush_threshold.saturating_mul(2)),
            threshold: config.flush_threshold,
            shared: Arc::clone(&shared),
        };
        let tick = config.tick_interval().max(Duration::from_millis(1));
        let cpu_core = config.worker_cpu_core;

        let worker = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || {
                if let Err(e) = cpu_affinity::maybe_bind(cpu_core) {
                    eprintln!("mantis-log: {e}");
                }
                run_writer_loop(rx, control_rx, tick, state);
            })
            .map_err(SinkError::Spawn)?;

        Ok(Self { tx, control, shared, worker: Mutex::new(Some(worker)) })
    }

    /// Queue a copy of `bytes` for the worker and return `bytes.len()`.
    ///
    /// Never touches the disk. When the queue is full this call **blocks**
    /// until the worker makes room: under sustained overload producers slow
    /// down to the worker's pace instead of losing records. Fails only once
    /// the writer has been stopped.
    ///
    /// A send that races with `stop` is reported as `Stopped` even when the
    /// final drain still picks the record up: `Ok` always means the record
    /// was queued before the worker's last drain.
    #[inline]
    pub fn enqueue(&self, bytes: &[u8]) -> Result<usize, SinkError> {
        if self.is_stopped() {
            return Err(SinkError::Stopped);
        }
        self.tx.send(bytes.to_vec()).map_err(|_| SinkError::Stopped)?;
        if self.is_stopped() {
            return Err(SinkError::Stopped);
        }
        self.shared.stats.record();
        Ok(bytes.len())
    }

    /// Ask the worker to flush now and wait until it has.
    ///
    /// Everything enqueued before this call is written by the time it
    /// returns. The write result is reported here, unlike background flushes.
    pub fn sync(&self) -> Result<(), SinkError> {
        if self.is_stopped() {
            return Err(SinkError::Stopped);
        }
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        self.control.send(Control::Sync(ack_tx)).map_err(|_| SinkError::Stopped)?;
        ack_rx.recv().map_err(|_| SinkError::Stopped)??;
        Ok(())
    }

    /// Drain the queue, flush once more and join the worker.
    ///
    /// Later calls return immediately. The final flush has no deadline.
    pub fn stop(&self) {
        if self.shared.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.control.send(Control::Stop);
        let handle = self.worker.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            eprintln!("mantis-log: writer thread panicked");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> SinkStats {
        self.shared.stats.snapshot()
    }
}

impl Drop for BufferedWriter {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker-owned state. Only the writer thread ever touches it.
struct FlushState<W> {
    sink: W,
    buf: Vec<u8>,
    threshold: usize,
    shared: Arc<Shared>,
}

impl<W: Write> FlushState<W> {
    fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        if self.buf.len() > self.threshold {
            let _ = self.flush();
        }
    }

    /// Move everything currently queued into the buffer.
    fn drain(&mut self, rx: &Receiver<Vec<u8>>) {
        while let Ok(bytes) = rx.try_recv() {
            self.push(&bytes);
        }
    }

    /// Write the whole buffer in one call, then clear it whatever happened.
    fn flush(&mut self) -> io::Result<()> {
        let result = if self.buf.is_empty() {
            self.sink.flush()
        } else {
            self.sink.write_all(&self.buf).and_then(|()| self.sink.flush())
        };
        match &result {
            Ok(()) if !self.buf.is_empty() => self.shared.stats.flushed(self.buf.len()),
            Ok(()) => {}
            Err(e) => {
                self.shared.stats.failed();
                eprintln!("mantis-log: dropped {} buffered bytes, write failed: {e}", self.buf.len());
            }
        }
        self.buf.clear();
        result
    }
}

fn run_writer_loop<W: Write>(
    rx: Receiver<Vec<u8>>,
    control: Receiver<Control>,
    tick: Duration,
    mut state: FlushState<W>,
) {
    let ticker = crossbeam_channel::tick(tick);

    loop {
        select! {
            recv(ticker) -> _ => {
                if !state.buf.is_empty() {
                    let _ = state.flush();
                }
            }
            recv(rx) -> msg => match msg {
                Ok(bytes) => state.push(&bytes),
                // Every producer handle is gone; nothing more can arrive.
                Err(_) => {
                    let _ = state.flush();
                    return;
                }
            },
            recv(control) -> ctrl => match ctrl {
                Ok(Control::Sync(ack)) => {
                    state.drain(&rx);
                    let _ = ack.send(state.flush());
                }
                Ok(Control::Stop) | Err(_) => {
                    state.drain(&rx);
                    let _ = state.flush();
                    return;
                }
            },
        }
    }
}
