//! File sink backend for the Puppy logging facade.
//!
//! The facade decides whether and what to log. This crate only decides how
//! the formatted line reaches the file: the file and its parent directories
//! are created on demand, every line is appended at end-of-file with a CRLF
//! terminator, and [`FlushMode`] controls when data is forced to disk.
//!
//! # Overview
//!
//! - [`LogSink`] - the capability a facade dispatches to
//! - [`FileSink`] - the file-backed implementation
//! - [`MakeSinkWriter`] - plugs a sink into `tracing_subscriber::fmt`
//! - [`FileSinkConfig`] - serde settings for building a sink from a config file
//!
//! # Example
//!
//! ```no_run
//! use puppy_file_sink::{FileSink, FlushMode};
//!
//! let sink = FileSink::new("logs/app.log", FlushMode::Always)?;
//! sink.write("hello");
//! sink.write("world");
//!
//! // Missing handles, failed seeks and failed appends never reach the caller.
//! sink.close();
//! sink.write("dropped");
//! assert_eq!(sink.dropped_writes(), 1);
//! # Ok::<(), puppy_file_sink::FileSinkError>(())
//! ```

mod config;
mod error;
mod flush;
mod handle;
mod sink;
mod writer;

// Re-export main types
pub use config::FileSinkConfig;
pub use error::{FileSinkError, Result};
pub use flush::FlushMode;
pub use sink::{FileSink, LogSink};
pub use writer::{MakeSinkWriter, SinkWriter};
