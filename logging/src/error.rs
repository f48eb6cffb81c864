use thiserror::Error;

/// The main error type for the `daylog` library.
#[derive(Debug, Error)]
pub enum Error {
  #[error("Configuration file not found: {0}")]
  ConfigNotFound(String),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(String),

  #[error("Failed to create log directory {path:?}: {reason}")]
  DirectoryCreate { path: String, reason: String },

  #[error("Sink setup failed for {path:?}: {reason}")]
  SinkSetup { path: String, reason: String },

  #[error("Failed to format log entry: {0}")]
  Formatting(String),

  #[error("Failed to install the log bridge: {0}")]
  LogBridgeInit(String),

  #[error("Failed to set global tracing subscriber: {0}")]
  GlobalSubscriberSet(String),

  #[error("Internal library error: {0}")]
  Internal(String),
}

/// A specialized `Result` type for `daylog` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
