//! Bridges `tracing-subscriber`'s writer API to a [`LogSink`].
//!
//! The fmt layer encodes each event into one buffer and hands it over with a
//! single `write_all`, so every `write` here carries exactly one record.

use std::{io, sync::Arc};

use mantis_core::{LogSink, SinkError};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone)]
pub struct SinkMakeWriter {
    sink: Arc<LogSink>,
}

impl SinkMakeWriter {
    pub fn new(sink: Arc<LogSink>) -> Self {
        Self { sink }
    }
}

impl<'a> MakeWriter<'a> for SinkMakeWriter {
    type Writer = SinkWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter { sink: &self.sink }
    }
}

pub struct SinkWriter<'a> {
    sink: &'a LogSink,
}

impl io::Write for SinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.enqueue(buf).map_err(SinkError::into_io)
    }

    // Durability is the sink's business; `Logger::sync` is the explicit path.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
