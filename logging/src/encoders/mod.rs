// Defines strategies for formatting LogEvents into byte streams.

use crate::config::processed::Format;
use crate::error::Result;
use crate::model::LogEvent;

pub mod json;
pub mod text;
pub mod util;

/// Trait for types that can format a `LogEvent` into a byte vector.
///
/// Implementations are configured once and must not carry state between
/// calls: the same event always renders to the same bytes.
pub trait EventFormatter: Send + Sync + 'static {
  /// Formats the given `LogEvent` into a newline-terminated `Vec<u8>`.
  fn format_event(&self, event: &LogEvent) -> Result<Vec<u8>>;
}

/// Creates the formatter for a wire format and timestamp layout.
pub(crate) fn new_event_formatter(format: Format, time_layout: &str) -> Box<dyn EventFormatter> {
  match format {
    Format::Text => Box::new(text::TextFormatter::new(time_layout)),
    Format::Json => Box::new(json::JsonLinesFormatter::new(time_layout)),
  }
}
