// src/encoders/util.rs
// Utility functions for encoders.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use std::fmt::{Display, Write};

/// Layout used when none is configured.
pub const DEFAULT_TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Returns true if chrono can render `layout` without error.
pub fn is_valid_time_layout(layout: &str) -> bool {
  !layout.is_empty() && StrftimeItems::new(layout).all(|item| !matches!(item, Item::Error))
}

/// Formats a timestamp into a string buffer using a strftime layout.
/// An unparsable layout falls back to RFC 3339 with milliseconds.
pub fn write_timestamp_with_format<Tz>(buf: &mut String, timestamp: &DateTime<Tz>, layout: &str)
where
  Tz: TimeZone,
  Tz::Offset: Display,
{
  if is_valid_time_layout(layout) {
    let _ = write!(buf, "{}", timestamp.format(layout));
  } else {
    let _ = write!(
      buf,
      "{}",
      timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    );
  }
}
