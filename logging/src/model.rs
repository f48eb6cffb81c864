use chrono::{DateTime, Local};
use std::fmt;
use std::str::FromStr;

/// Severity of a log entry, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
  Debug,
  Info,
  Warn,
  Error,
  Panic,
  Fatal,
}

impl Level {
  pub fn as_str(&self) -> &'static str {
    match self {
      Level::Debug => "DEBUG",
      Level::Info => "INFO",
      Level::Warn => "WARN",
      Level::Error => "ERROR",
      Level::Panic => "PANIC",
      Level::Fatal => "FATAL",
    }
  }
}

impl fmt::Display for Level {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Level {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "debug" | "trace" => Ok(Level::Debug),
      "info" => Ok(Level::Info),
      "warn" | "warning" => Ok(Level::Warn),
      "error" => Ok(Level::Error),
      "panic" => Ok(Level::Panic),
      "fatal" => Ok(Level::Fatal),
      other => Err(format!(
        "Invalid log level string '{}'. Expected debug, info, warn, error, panic, or fatal.",
        other
      )),
    }
  }
}

/// Represents a loggable value, part of a `LogEvent`'s fields.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
  String(String),
  Int(i64),
  Float(f64),
  Bool(bool),
  Debug(String),
}

impl fmt::Display for LogValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LogValue::String(s) | LogValue::Debug(s) => f.write_str(s),
      LogValue::Int(i) => write!(f, "{}", i),
      LogValue::Float(v) => write!(f, "{}", v),
      LogValue::Bool(b) => write!(f, "{}", b),
    }
  }
}

impl From<&str> for LogValue {
  fn from(value: &str) -> Self {
    LogValue::String(value.to_string())
  }
}

impl From<String> for LogValue {
  fn from(value: String) -> Self {
    LogValue::String(value)
  }
}

impl From<bool> for LogValue {
  fn from(value: bool) -> Self {
    LogValue::Bool(value)
  }
}

impl From<f64> for LogValue {
  fn from(value: f64) -> Self {
    LogValue::Float(value)
  }
}

impl From<u64> for LogValue {
  fn from(value: u64) -> Self {
    if value <= i64::MAX as u64 {
      LogValue::Int(value as i64)
    } else {
      LogValue::String(value.to_string())
    }
  }
}

macro_rules! int_log_value {
  ($($ty:ty),*) => {
    $(
      impl From<$ty> for LogValue {
        fn from(value: $ty) -> Self {
          LogValue::Int(value as i64)
        }
      }
    )*
  };
}

int_log_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for LogValue {
  fn from(value: usize) -> Self {
    LogValue::from(value as u64)
  }
}

/// One structured log entry, as handed to the renderer.
///
/// Fields keep their insertion order; renderers decide how to lay them out.
#[derive(Debug, Clone)]
pub struct LogEvent {
  /// Timestamp of when the entry was emitted.
  pub timestamp: DateTime<Local>,
  /// The severity level of the entry.
  pub level: Level,
  /// The primary message.
  pub message: String,
  /// Key-value pairs of structured data associated with the entry.
  pub fields: Vec<(String, LogValue)>,
}

impl LogEvent {
  pub fn new<S>(level: Level, message: S) -> Self
  where
    S: Into<String>,
  {
    LogEvent {
      timestamp: Local::now(),
      level,
      message: message.into(),
      fields: Vec::new(),
    }
  }

  /// Appends a field, builder style.
  pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
  where
    K: Into<String>,
    V: Into<LogValue>,
  {
    self.fields.push((key.into(), value.into()));
    self
  }
}
