//! One method per severity, in three calling conventions.

use super::LogCore;
use crate::model::{Level, LogValue};
use std::fmt;

pub(crate) fn collect_fields<I, K, V>(fields: I) -> Vec<(String, LogValue)>
where
  I: IntoIterator<Item = (K, V)>,
  K: Into<String>,
  V: Into<LogValue>,
{
  fields
    .into_iter()
    .map(|(k, v)| (k.into(), v.into()))
    .collect()
}

macro_rules! level_methods {
  ($level:expr, $plain:ident, $template:ident, $pairs:ident, $name:literal) => {
    #[doc = concat!("Writes a ", $name, " entry.")]
    pub fn $plain(&self, message: impl fmt::Display) {
      self.emit_at($level, message.to_string(), Vec::new());
    }

    #[doc = concat!("Writes a ", $name, " entry from `format_args!`.")]
    pub fn $template(&self, args: fmt::Arguments<'_>) {
      self.emit_at($level, args.to_string(), Vec::new());
    }

    #[doc = concat!("Writes a ", $name, " entry with key/value fields.")]
    pub fn $pairs<I, K, V>(&self, message: impl fmt::Display, fields: I)
    where
      I: IntoIterator<Item = (K, V)>,
      K: Into<String>,
      V: Into<LogValue>,
    {
      self.emit_at($level, message.to_string(), collect_fields(fields));
    }
  };
}

impl LogCore {
  level_methods!(Level::Debug, debug, debugf, debugw, "debug");
  level_methods!(Level::Info, info, infof, infow, "info");
  level_methods!(Level::Warn, warn, warnf, warnw, "warn");
  level_methods!(Level::Error, error, errorf, errorw, "error");
  level_methods!(Level::Panic, panic, panicf, panicw, "panic");
  level_methods!(Level::Fatal, fatal, fatalf, fatalw, "fatal");

  /// Writes the entry, then panics for `Panic` and exits for `Fatal`,
  /// whether or not the level is enabled.
  pub(crate) fn emit_at(&self, level: Level, message: String, fields: Vec<(String, LogValue)>) {
    match level {
      Level::Panic => {
        self.emit(level, message.clone(), fields);
        panic!("{}", message);
      }
      Level::Fatal => {
        self.emit(level, message, fields);
        let _ = self.sync();
        std::process::exit(1);
      }
      _ => self.emit(level, message, fields),
    }
  }
}
