// src/subscriber/log_handler.rs

use crate::{
  error::{Error, Result},
  logger::LogCore,
  model::{Level, LogEvent, LogValue},
  sink::Sink,
};
use log::{LevelFilter, Metadata, Record};
use std::sync::Arc;

/// A `log::Log` implementation that forwards records to a [`LogCore`].
pub struct LogHandler {
  core: Arc<LogCore>,
}

impl LogHandler {
  pub fn new(core: Arc<LogCore>) -> Self {
    Self { core }
  }

  fn map_level(level: log::Level) -> Level {
    match level {
      log::Level::Error => Level::Error,
      log::Level::Warn => Level::Warn,
      log::Level::Info => Level::Info,
      log::Level::Debug | log::Level::Trace => Level::Debug,
    }
  }

  /// Converts a `log::Record` into our internal `LogEvent` format.
  fn build_log_event(&self, record: &Record<'_>) -> LogEvent {
    let mut event = LogEvent::new(Self::map_level(record.level()), record.args().to_string());
    event.timestamp = self.core.now();

    event
      .fields
      .push(("target".to_string(), record.target().into()));
    if let Some(path) = record.module_path() {
      event
        .fields
        .push(("module_path".to_string(), LogValue::String(path.to_string())));
    }
    if let Some(file) = record.file() {
      event
        .fields
        .push(("file".to_string(), LogValue::String(file.to_string())));
    }
    if let Some(line) = record.line() {
      event.fields.push(("line".to_string(), LogValue::from(line)));
    }

    event
  }
}

impl log::Log for LogHandler {
  fn enabled(&self, metadata: &Metadata) -> bool {
    self.core.enabled(Self::map_level(metadata.level()))
  }

  fn log(&self, record: &Record) {
    if !self.enabled(record.metadata()) {
      return;
    }
    self.core.log_or_report(self.build_log_event(record));
  }

  fn flush(&self) {
    if let Some(generation) = self.core.current_generation() {
      let _ = generation.main_sink().flush();
      if let Some(error_sink) = generation.error_sink() {
        let _ = error_sink.flush();
      }
    }
  }
}

/// Installs a [`LogHandler`] for `core` as the global `log` logger.
pub fn init_log_bridge(core: Arc<LogCore>) -> Result<()> {
  let max_level = match core.options().level {
    Level::Debug => LevelFilter::Trace,
    Level::Info => LevelFilter::Info,
    Level::Warn => LevelFilter::Warn,
    _ => LevelFilter::Error,
  };
  log::set_boxed_logger(Box::new(LogHandler::new(core)))
    .map_err(|e| Error::LogBridgeInit(e.to_string()))?;
  log::set_max_level(max_level);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::clock::ManualClock;
  use crate::config::Options;
  use chrono::{Local, TimeZone};
  use log::Log;
  use std::fs;

  #[test]
  fn records_carry_source_location() {
    let dir = tempfile::tempdir().unwrap();
    let core = Arc::new(LogCore::new(Options {
      directory: dir.path().to_path_buf(),
      level: Level::Info,
      ..Options::default()
    }));
    let handler = LogHandler::new(core.clone());

    handler.log(
      &Record::builder()
        .args(format_args!("cache warmed"))
        .level(log::Level::Warn)
        .target("app::cache")
        .file(Some("src/cache.rs"))
        .line(Some(42))
        .build(),
    );
    handler.log(
      &Record::builder()
        .args(format_args!("too chatty"))
        .level(log::Level::Debug)
        .build(),
    );

    let generation = core.current_generation().unwrap();
    let content = fs::read_to_string(generation.main_sink().path()).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("\tWARN\tcache warmed\t{"));
    assert!(content.contains("file=src/cache.rs"));
    assert!(content.contains("line=42"));
    assert!(content.contains("target=app::cache"));
  }

  #[test]
  fn records_use_the_core_clock() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(
      Local.with_ymd_and_hms(2025, 7, 20, 9, 0, 0).unwrap(),
    ));
    let core = Arc::new(
      LogCore::builder(Options {
        directory: dir.path().to_path_buf(),
        time_layout: "%Y-%m-%d %H".to_string(),
        ..Options::default()
      })
      .clock(clock)
      .build(),
    );
    let handler = LogHandler::new(core);

    handler.log(
      &Record::builder()
        .args(format_args!("from the past"))
        .level(log::Level::Error)
        .build(),
    );

    let content = fs::read_to_string(dir.path().join("2025-07-20.log")).unwrap();
    assert!(content.starts_with("2025-07-20 09\tERROR\tfrom the past"));
  }
}
