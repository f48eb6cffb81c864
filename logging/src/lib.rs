//! `daylog` - a structured logging core that writes leveled entries to
//! date-named, size-capped rotating files.
//!
//! Each calendar day gets its own `<stem>-<date>.log` (or `<date>.log`), with
//! error entries optionally duplicated into a matching `_error` file. Files
//! roll over lazily when the first entry of a new day arrives.
//!
//! The crate-level functions below write through the process-wide default
//! core, which can be swapped at any time with [`registry::replace`].

pub mod clock;
pub mod config;
pub mod encoders;
pub mod error;
pub mod error_handling;
pub mod init;
pub mod logger;
pub mod model;
mod pool;
pub mod registry;
pub mod roller;
pub mod sampling;
pub mod sanitize;
pub mod sink;
pub mod subscriber;

// Re-export key public types for easier use by library consumers.
pub use config::{Format, Options};
pub use error::{Error, Result};
pub use error_handling::{FaultReporter, InternalErrorReceiver, InternalErrorReport, InternalErrorSource};
pub use logger::{Generation, LogCore, LogCoreBuilder};
pub use model::{Level, LogEvent, LogValue};
pub use sanitize::sanitize_file_name;

// Public initialization functions
pub use init::{find_config_file, init_from_file};

use std::fmt;

macro_rules! global_level_fns {
  ($plain:ident, $template:ident, $pairs:ident) => {
    #[doc = concat!("[`LogCore::", stringify!($plain), "`] on the default core.")]
    pub fn $plain(message: impl fmt::Display) {
      registry::current().$plain(message);
    }

    #[doc = concat!("[`LogCore::", stringify!($template), "`] on the default core.")]
    pub fn $template(args: fmt::Arguments<'_>) {
      registry::current().$template(args);
    }

    #[doc = concat!("[`LogCore::", stringify!($pairs), "`] on the default core.")]
    pub fn $pairs<I, K, V>(message: impl fmt::Display, fields: I)
    where
      I: IntoIterator<Item = (K, V)>,
      K: Into<String>,
      V: Into<LogValue>,
    {
      registry::current().$pairs(message, fields);
    }
  };
}

global_level_fns!(debug, debugf, debugw);
global_level_fns!(info, infof, infow);
global_level_fns!(warn, warnf, warnw);
global_level_fns!(error, errorf, errorw);
global_level_fns!(panic, panicf, panicw);
global_level_fns!(fatal, fatalf, fatalw);

/// Flushes and closes the default core's files.
pub fn sync() -> Result<()> {
  registry::current().sync()
}

/// Template-style debug entry on the default core: `debugf!("{} ms", n)`.
#[macro_export]
macro_rules! debugf {
  ($($arg:tt)+) => {
    $crate::debugf(::std::format_args!($($arg)+))
  };
}

/// Template-style info entry on the default core.
#[macro_export]
macro_rules! infof {
  ($($arg:tt)+) => {
    $crate::infof(::std::format_args!($($arg)+))
  };
}

/// Template-style warn entry on the default core.
#[macro_export]
macro_rules! warnf {
  ($($arg:tt)+) => {
    $crate::warnf(::std::format_args!($($arg)+))
  };
}

/// Template-style error entry on the default core.
#[macro_export]
macro_rules! errorf {
  ($($arg:tt)+) => {
    $crate::errorf(::std::format_args!($($arg)+))
  };
}

/// Template-style panic entry on the default core. Panics after writing.
#[macro_export]
macro_rules! panicf {
  ($($arg:tt)+) => {
    $crate::panicf(::std::format_args!($($arg)+))
  };
}

/// Template-style fatal entry on the default core. Exits the process after
/// writing.
#[macro_export]
macro_rules! fatalf {
  ($($arg:tt)+) => {
    $crate::fatalf(::std::format_args!($($arg)+))
  };
}
