//! The seam between the Log Core and the files it writes to.

use crate::error::Result;
use crate::error_handling::{FaultReporter, InternalErrorSource};
use crate::roller::RollingFile;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How many times a write is attempted before the entry is given up on.
pub const MAX_WRITE_ATTEMPTS: u32 = 3;
/// Pause between two write attempts.
pub const WRITE_RETRY_DELAY: Duration = Duration::from_millis(10);

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Size and retention limits handed to every sink the core opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
  /// Cap of the active file, in bytes.
  pub max_file_size: u64,
  /// Backups to keep; 0 keeps all of them.
  pub max_backups: u32,
  /// Gzip rolled-out backups.
  pub compress: bool,
}

impl RotationPolicy {
  pub fn from_megabytes(max_size_mb: u64, max_backups: u32, compress: bool) -> Self {
    Self {
      max_file_size: max_size_mb.saturating_mul(BYTES_PER_MB),
      max_backups,
      compress,
    }
  }
}

/// An appendable destination bound to one physical path.
///
/// Implementations serialize concurrent writes themselves.
pub trait Sink: Send + Sync + 'static {
  fn path(&self) -> &Path;
  /// Writes the whole buffer or fails.
  fn write_bytes(&self, buf: &[u8]) -> io::Result<()>;
  fn flush(&self) -> io::Result<()>;
  /// Flushes and releases the underlying file. Later writes fail.
  fn close(&self) -> io::Result<()>;
}

/// Opens sinks for the core. Swappable so tests can inject failures.
pub trait SinkFactory: Send + Sync + 'static {
  fn open(&self, path: &Path, policy: RotationPolicy) -> Result<Arc<dyn Sink>>;
}

/// The default factory: one [`RollingFile`] per path.
#[derive(Debug, Clone, Default)]
pub struct RollingFileFactory {
  faults: FaultReporter,
}

impl RollingFileFactory {
  pub fn new(faults: FaultReporter) -> Self {
    Self { faults }
  }
}

impl SinkFactory for RollingFileFactory {
  fn open(&self, path: &Path, policy: RotationPolicy) -> Result<Arc<dyn Sink>> {
    let file = RollingFile::open_with_reporter(path, policy, self.faults.clone())?;
    Ok(Arc::new(file))
  }
}

/// Writes `buf` to `sink`, retrying up to [`MAX_WRITE_ATTEMPTS`] times.
///
/// Returns whether the bytes made it. A final failure is reported to
/// `faults` and otherwise swallowed.
pub(crate) fn write_with_retry(sink: &dyn Sink, buf: &[u8], faults: &FaultReporter) -> bool {
  let mut last_error = None;
  for attempt in 1..=MAX_WRITE_ATTEMPTS {
    match sink.write_bytes(buf) {
      Ok(()) => return true,
      Err(e) => {
        last_error = Some(e);
        if attempt < MAX_WRITE_ATTEMPTS {
          thread::sleep(WRITE_RETRY_DELAY);
        }
      }
    }
  }

  if let Some(e) = last_error {
    faults.report(
      InternalErrorSource::SinkWrite {
        path: sink.path().display().to_string(),
      },
      e,
      Some(format!(
        "Dropped a {}-byte entry after {} attempts",
        buf.len(),
        MAX_WRITE_ATTEMPTS
      )),
    );
  }
  false
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use parking_lot::Mutex;
  use std::path::PathBuf;
  use std::sync::atomic::{AtomicU32, Ordering};

  /// A sink that fails its first `failures` writes, then records bytes.
  pub(crate) struct FlakySink {
    path: PathBuf,
    failures: AtomicU32,
    pub(crate) attempts: AtomicU32,
    pub(crate) written: Mutex<Vec<u8>>,
  }

  impl FlakySink {
    pub(crate) fn new(failures: u32) -> Self {
      Self {
        path: PathBuf::from("flaky.log"),
        failures: AtomicU32::new(failures),
        attempts: AtomicU32::new(0),
        written: Mutex::new(Vec::new()),
      }
    }
  }

  impl Sink for FlakySink {
    fn path(&self) -> &Path {
      &self.path
    }

    fn write_bytes(&self, buf: &[u8]) -> io::Result<()> {
      self.attempts.fetch_add(1, Ordering::SeqCst);
      let remaining = self.failures.load(Ordering::SeqCst);
      if remaining > 0 {
        self.failures.store(remaining - 1, Ordering::SeqCst);
        return Err(io::Error::new(io::ErrorKind::Other, "simulated write failure"));
      }
      self.written.lock().extend_from_slice(buf);
      Ok(())
    }

    fn flush(&self) -> io::Result<()> {
      Ok(())
    }

    fn close(&self) -> io::Result<()> {
      Ok(())
    }
  }

  #[test]
  fn transient_failures_below_the_bound_are_retried() {
    let (faults, rx) = FaultReporter::channel(4);
    let sink = FlakySink::new(MAX_WRITE_ATTEMPTS - 1);

    assert!(write_with_retry(&sink, b"entry\n", &faults));
    assert_eq!(sink.attempts.load(Ordering::SeqCst), MAX_WRITE_ATTEMPTS);
    assert_eq!(sink.written.lock().as_slice(), b"entry\n");
    assert!(rx.try_recv().is_err());
  }

  #[test]
  fn persistent_failure_is_reported_not_raised() {
    let (faults, rx) = FaultReporter::channel(4);
    let sink = FlakySink::new(MAX_WRITE_ATTEMPTS);

    assert!(!write_with_retry(&sink, b"entry\n", &faults));
    assert_eq!(sink.attempts.load(Ordering::SeqCst), MAX_WRITE_ATTEMPTS);
    assert!(sink.written.lock().is_empty());

    let report = rx.try_recv().unwrap();
    assert_eq!(
      report.source,
      InternalErrorSource::SinkWrite {
        path: "flaky.log".to_string()
      }
    );
    assert_eq!(report.error_message, "simulated write failure");
  }

  #[test]
  fn policy_converts_megabytes() {
    let policy = RotationPolicy::from_megabytes(2, 5, true);
    assert_eq!(policy.max_file_size, 2 * 1024 * 1024);
    assert_eq!(policy.max_backups, 5);
    assert!(policy.compress);
  }
}
