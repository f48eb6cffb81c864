//! The internal fault sink.
//!
//! Degraded-mode notices (repaired configuration, failed probes, dropped
//! writes) never reach the caller of a logging method. They are handed to a
//! [`FaultReporter`], which either prints them to stderr or delivers them as
//! [`InternalErrorReport`]s over a bounded channel.

use fibre::error::TrySendError;
use fibre::mpsc::{self, BoundedReceiver, BoundedSender};
use std::fmt;
use std::sync::Arc;

/// Receiving half of a reporting channel created by [`FaultReporter::channel`].
pub type InternalErrorReceiver = BoundedReceiver<InternalErrorReport>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalErrorSource {
  ConfigRepair { field: String },
  SinkProbe { path: String },
  SinkWrite { path: String },
  FileSetup { directory: String },
  EventFormatting,
  RollerIo { path: String },
}

impl fmt::Display for InternalErrorSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      InternalErrorSource::ConfigRepair { field } => {
        write!(f, "ConfigRepair {{ field: \"{}\" }}", field)
      }
      InternalErrorSource::SinkProbe { path } => write!(f, "SinkProbe {{ path: \"{}\" }}", path),
      InternalErrorSource::SinkWrite { path } => write!(f, "SinkWrite {{ path: \"{}\" }}", path),
      InternalErrorSource::FileSetup { directory } => {
        write!(f, "FileSetup {{ directory: \"{}\" }}", directory)
      }
      InternalErrorSource::EventFormatting => write!(f, "EventFormatting"),
      InternalErrorSource::RollerIo { path } => write!(f, "RollerIo {{ path: \"{}\" }}", path),
    }
  }
}

#[derive(Debug, Clone)]
pub struct InternalErrorReport {
  pub source: InternalErrorSource,
  pub error_message: String,
  pub context: Option<String>,
  pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl InternalErrorReport {
  pub(crate) fn new(
    source: InternalErrorSource,
    error: impl fmt::Display,
    context: Option<String>,
  ) -> Self {
    Self {
      source,
      error_message: error.to_string(),
      context,
      timestamp: chrono::Utc::now(),
    }
  }
}

/// Where internal faults go. Cheap to clone; clones share the same channel.
#[derive(Clone, Default)]
pub struct FaultReporter {
  tx: Option<Arc<BoundedSender<InternalErrorReport>>>,
}

impl fmt::Debug for FaultReporter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FaultReporter")
      .field("channel", &self.tx.is_some())
      .finish()
  }
}

impl FaultReporter {
  /// A reporter that prints every fault to stderr.
  pub fn stderr() -> Self {
    Self { tx: None }
  }

  /// A reporter that delivers faults over a bounded channel of `capacity`.
  pub fn channel(capacity: usize) -> (Self, InternalErrorReceiver) {
    let (tx, rx) = mpsc::bounded::<InternalErrorReport>(capacity);
    (Self { tx: Some(Arc::new(tx)) }, rx)
  }

  pub(crate) fn report(
    &self,
    source: InternalErrorSource,
    error: impl fmt::Display,
    context: Option<String>,
  ) {
    let report = InternalErrorReport::new(source, error, context);
    match &self.tx {
      Some(tx) => {
        if let Err(TrySendError::Full(report)) = tx.try_send(report) {
          eprintln!(
            "[daylog:ERROR] Internal error channel full. Dropping report: {}: {}",
            report.source, report.error_message
          );
        }
      }
      None => match &report.context {
        Some(context) => eprintln!(
          "[daylog:WARN] {}: {} ({})",
          report.source, report.error_message, context
        ),
        None => eprintln!("[daylog:WARN] {}: {}", report.source, report.error_message),
      },
    }
  }
}
