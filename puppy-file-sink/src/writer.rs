//! `std::io::Write` adapter so a sink can back a `tracing` subscriber.
//!
//! ```no_run
//! use std::sync::Arc;
//! use puppy_file_sink::{FileSink, MakeSinkWriter};
//!
//! let sink = Arc::new(FileSink::open("logs/app.log")?);
//! tracing_subscriber::fmt()
//!     .with_writer(MakeSinkWriter::new(sink))
//!     .with_ansi(false)
//!     .init();
//! # Ok::<(), puppy_file_sink::FileSinkError>(())
//! ```

use crate::sink::LogSink;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Splits written bytes into lines and hands each one to a [`LogSink`].
///
/// The trailing `\n` (and a `\r` before it) is stripped because the sink adds
/// its own terminator. Bytes after the last newline are held until the next
/// newline, an explicit flush, or drop. Invalid UTF-8 is replaced lossily.
pub struct SinkWriter<S: LogSink + ?Sized> {
    sink: Arc<S>,
    pending: Vec<u8>,
}

impl<S: LogSink + ?Sized> SinkWriter<S> {
    pub fn new(sink: Arc<S>) -> Self {
        Self {
            sink,
            pending: Vec::new(),
        }
    }

    fn emit(&self, mut line: &[u8]) {
        if let [rest @ .., b'\r'] = line {
            line = rest;
        }
        self.sink.write(&String::from_utf8_lossy(line));
    }

    fn emit_pending(&mut self) {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.emit(&rest);
        }
    }
}

impl<S: LogSink + ?Sized> io::Write for SinkWriter<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.emit(&line[..pos]);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit_pending();
        self.sink.flush();
        Ok(())
    }
}

impl<S: LogSink + ?Sized> Drop for SinkWriter<S> {
    fn drop(&mut self) {
        self.emit_pending();
    }
}

/// Hands out a [`SinkWriter`] per event for `tracing_subscriber::fmt`.
pub struct MakeSinkWriter<S: LogSink + ?Sized> {
    sink: Arc<S>,
}

impl<S: LogSink + ?Sized> MakeSinkWriter<S> {
    pub fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }
}

impl<S: LogSink + ?Sized> Clone for MakeSinkWriter<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<'a, S: LogSink + ?Sized> MakeWriter<'a> for MakeSinkWriter<S> {
    type Writer = SinkWriter<S>;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter::new(Arc::clone(&self.sink))
    }
}
