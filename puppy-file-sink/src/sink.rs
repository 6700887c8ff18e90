//! The `LogSink` capability and its file-backed implementation.
//!
//! A [`FileSink`] owns exactly one write handle to one file. Every operation
//! on the sink goes through a single mutex, so the seek-to-end and append
//! performed by [`FileSink::write`] can never interleave with another write,
//! a flush, a delete or a re-open on the same sink.
//!
//! Writes are best effort. A missing handle, a failed seek or a failed append
//! is reported through `tracing` and the line is dropped; nothing is returned
//! to the caller and nothing is retried.

use crate::error::{FileSinkError, Result};
use crate::flush::FlushMode;
use crate::handle::{AppendError, Handle};
use std::cell::Cell;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// A backend that records already formatted log lines.
///
/// Level filtering and formatting happen upstream in the logging facade.
pub trait LogSink: Send + Sync {
    /// Record one line. Must not panic or report failure to the caller.
    fn write(&self, line: &str);

    /// Push anything buffered to durable storage.
    fn flush(&self) {}
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn write(&self, line: &str) {
        (**self).write(line)
    }

    fn flush(&self) {
        (**self).flush()
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn write(&self, line: &str) {
        (**self).write(line)
    }

    fn flush(&self) {
        (**self).flush()
    }
}

thread_local! {
    static EMITTING_DIAGNOSTIC: Cell<bool> = const { Cell::new(false) };
}

/// Emit an internal diagnostic unless this thread is already emitting one.
///
/// A sink may itself be the writer behind the active `tracing` subscriber.
/// The guard keeps a failing sink from logging about its own failure forever.
fn diagnostic(emit: impl FnOnce()) {
    if EMITTING_DIAGNOSTIC.with(|flag| flag.replace(true)) {
        return;
    }
    let _reset = DiagnosticReset;
    emit();
}

/// Clears the diagnostic flag on scope exit, including when `emit` panics.
struct DiagnosticReset;

impl Drop for DiagnosticReset {
    fn drop(&mut self) {
        EMITTING_DIAGNOSTIC.with(|flag| flag.set(false));
    }
}

#[derive(Debug)]
struct SinkState {
    handle: Handle,
    flush_mode: FlushMode,
}

/// Appends CRLF-terminated lines to a single file.
///
/// # Examples
///
/// ```no_run
/// use puppy_file_sink::{FileSink, FlushMode};
///
/// let sink = FileSink::new("logs/app.log", FlushMode::Manual)?;
/// sink.write("hello");
/// sink.write("world");
/// sink.flush();
/// # Ok::<(), puppy_file_sink::FileSinkError>(())
/// ```
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    state: Mutex<SinkState>,
    dropped: AtomicU64,
}

impl FileSink {
    /// Open a sink on `path` with the default [`FlushMode::Always`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(path, FlushMode::default())
    }

    /// Open a sink on `path`, creating missing parent directories and the
    /// file itself. Existing content is kept.
    ///
    /// # Errors
    ///
    /// - `NotAFile` if `path` is or names a directory. Nothing is created.
    /// - `DirectoryCreationFailed` if a parent directory cannot be created.
    /// - `FileCreationFailed` if the file is absent and cannot be created.
    /// - `OpenFailed` if the file cannot be opened for writing.
    pub fn new(path: impl Into<PathBuf>, flush_mode: FlushMode) -> Result<Self> {
        let path = path.into();
        validate_file_path(&path)?;
        let path = std::path::absolute(&path).map_err(|e| FileSinkError::open(&path, e))?;

        let sink = Self {
            path,
            state: Mutex::new(SinkState {
                handle: Handle::Closed,
                flush_mode,
            }),
            dropped: AtomicU64::new(0),
        };
        sink.reopen()?;
        Ok(sink)
    }

    /// The absolute path this sink writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush_mode(&self) -> FlushMode {
        self.lock().flush_mode
    }

    pub fn set_flush_mode(&self, flush_mode: FlushMode) {
        self.lock().flush_mode = flush_mode;
    }

    /// Whether the sink currently holds a live handle.
    pub fn is_open(&self) -> bool {
        self.lock().handle.is_open()
    }

    /// Number of lines dropped because they could not be appended.
    pub fn dropped_writes(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Append `line` plus CRLF at the current end of the file.
    ///
    /// In [`FlushMode::Always`] the file is synced before returning. Failures
    /// are logged and the line is dropped.
    pub fn write(&self, line: &str) {
        let outcome = {
            let mut state = self.lock();
            let sync = state.flush_mode.syncs_each_write();
            state.handle.append_line(line, sync)
        };

        let Err(error) = outcome else {
            return;
        };
        let path = self.path.display();
        match error {
            AppendError::Closed => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                diagnostic(|| debug!(path = %path, "could not log: no file handle"));
            }
            AppendError::Seek(e) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                diagnostic(|| warn!(path = %path, error = %e, "seek to end failed, dropping line"));
            }
            AppendError::Write(e) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                diagnostic(|| warn!(path = %path, error = %e, "append failed, dropping line"));
            }
            AppendError::Sync(e) => {
                diagnostic(|| warn!(path = %path, error = %e, "line written but sync failed"));
            }
        }
    }

    /// Force everything written so far to stable storage. No-op when closed.
    pub fn flush(&self) {
        let result = self.lock().handle.sync();
        if let Err(e) = result {
            diagnostic(|| warn!(path = %self.path.display(), error = %e, "flush failed"));
        }
    }

    /// Remove the file at `path`.
    ///
    /// The path does not have to be the one this sink writes to. Removing the
    /// sink's own file leaves the handle pointing at the unlinked file until
    /// [`FileSink::reopen`] is called.
    pub fn delete(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let result = {
            let _state = self.lock();
            fs::remove_file(path)
        };
        result.map_err(|e| FileSinkError::delete(path, e))?;
        debug!(path = %path.display(), "deleted log file");
        Ok(())
    }

    /// Sync and release the handle. Calling this on a closed sink does nothing.
    pub fn close(&self) {
        let result = self.lock().handle.close();
        match result {
            Ok(true) => diagnostic(|| debug!(path = %self.path.display(), "closed log file")),
            Ok(false) => {}
            Err(e) => diagnostic(|| {
                warn!(path = %self.path.display(), error = %e, "sync on close failed")
            }),
        }
    }

    /// Close any held handle, then make sure the file and its directory exist
    /// and open a fresh handle on it.
    pub fn reopen(&self) -> Result<()> {
        let (closed, opened) = {
            let mut state = self.lock();
            let closed = state.handle.close();
            let opened = match prepare_and_open(&self.path) {
                Ok(file) => {
                    state.handle = Handle::Open(file);
                    Ok(())
                }
                Err(e) => Err(e),
            };
            (closed, opened)
        };

        if let Err(e) = closed {
            diagnostic(|| warn!(path = %self.path.display(), error = %e, "sync on close failed"));
        }
        opened?;
        diagnostic(|| debug!(path = %self.path.display(), "opened log file"));
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for FileSink {
    fn write(&self, line: &str) {
        FileSink::write(self, line)
    }

    fn flush(&self) {
        FileSink::flush(self)
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        self.close();
    }
}

/// Reject paths that are, or are written as, directories.
fn validate_file_path(path: &Path) -> Result<()> {
    let written_as_dir = path
        .as_os_str()
        .to_string_lossy()
        .ends_with(std::path::is_separator);

    if written_as_dir || path.file_name().is_none() || path.is_dir() {
        return Err(FileSinkError::not_a_file(path));
    }
    Ok(())
}

fn prepare_and_open(path: &Path) -> Result<fs::File> {
    validate_file_path(path)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| FileSinkError::directory_creation(parent, e))?;
    }

    // `exists` follows symlinks, so a dangling link gets its target created.
    if !path.exists() {
        OpenOptions::new()
            .write(true)
            .create(true)
            .open(path)
            .map_err(|e| FileSinkError::file_creation(path, e))?;
    }

    OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| FileSinkError::open(path, e))
}
