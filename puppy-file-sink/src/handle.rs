//! The sink's write descriptor, modelled as an explicit open/closed state.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};

/// Line terminator appended to every entry.
pub(crate) const LINE_TERMINATOR: &str = "\r\n";

/// The OS write handle owned by a sink.
///
/// Callers match on the variant instead of assuming a live descriptor.
#[derive(Debug, Default)]
pub(crate) enum Handle {
    Open(File),
    #[default]
    Closed,
}

/// Why a single append did not reach the file.
#[derive(Debug)]
pub(crate) enum AppendError {
    Closed,
    Seek(io::Error),
    Write(io::Error),
    Sync(io::Error),
}

impl Handle {
    pub(crate) fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    /// Seek to end-of-file, then write `line` followed by CRLF.
    ///
    /// The seek runs before every append so a file truncated or replaced
    /// underneath us is still written at its current end.
    pub(crate) fn append_line(&mut self, line: &str, sync: bool) -> Result<(), AppendError> {
        let Self::Open(file) = self else {
            return Err(AppendError::Closed);
        };

        file.seek(SeekFrom::End(0)).map_err(AppendError::Seek)?;

        let mut entry = String::with_capacity(line.len() + LINE_TERMINATOR.len());
        entry.push_str(line);
        entry.push_str(LINE_TERMINATOR);
        file.write_all(entry.as_bytes()).map_err(AppendError::Write)?;

        if sync {
            file.flush().map_err(AppendError::Sync)?;
            file.sync_all().map_err(AppendError::Sync)?;
        }

        Ok(())
    }

    /// Force everything written so far to stable storage. No-op when closed.
    pub(crate) fn sync(&mut self) -> io::Result<()> {
        match self {
            Self::Open(file) => {
                file.flush()?;
                file.sync_all()
            }
            Self::Closed => Ok(()),
        }
    }

    /// Sync and release the descriptor, leaving the handle `Closed`.
    ///
    /// Returns `Ok(false)` if there was nothing to close. The descriptor is
    /// released even when the sync fails.
    pub(crate) fn close(&mut self) -> io::Result<bool> {
        match std::mem::take(self) {
            Self::Open(mut file) => {
                file.flush()?;
                file.sync_all()?;
                Ok(true)
            }
            Self::Closed => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, OpenOptions};
    use tempfile::TempDir;

    fn open_handle(path: &std::path::Path) -> Handle {
        fs::write(path, "").unwrap();
        Handle::Open(OpenOptions::new().write(true).open(path).unwrap())
    }

    #[test]
    fn test_append_writes_crlf_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("h.log");
        let mut handle = open_handle(&path);

        handle.append_line("one", true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\r\n");
        handle.append_line("two", false).unwrap();
        handle.sync().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\r\ntwo\r\n");
    }

    #[test]
    fn test_append_follows_external_truncation() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("h.log");
        let mut handle = open_handle(&path);

        handle.append_line("before truncation", true).unwrap();
        fs::write(&path, "").unwrap();
        handle.append_line("after", true).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "after\r\n");
    }

    #[test]
    fn test_closed_handle() {
        let mut handle = Handle::Closed;
        assert!(!handle.is_open());
        assert!(matches!(
            handle.append_line("x", true),
            Err(AppendError::Closed)
        ));
        assert!(handle.sync().is_ok());
        assert!(!handle.close().unwrap());
    }

    #[test]
    fn test_close_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let mut handle = open_handle(&temp.path().join("h.log"));

        assert!(handle.is_open());
        assert!(handle.close().unwrap());
        assert!(!handle.is_open());
        assert!(!handle.close().unwrap());
    }
}
