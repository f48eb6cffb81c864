// src/encoders/text.rs
use super::{util, EventFormatter};
use crate::error::Result;
use crate::model::LogEvent;
use std::fmt::Write;

/// Line-oriented, tab-separated rendering:
/// `<time>\t<LEVEL>\t<message>[\t{key=value, ...}]\n`.
pub struct TextFormatter {
  time_layout: String,
}

impl TextFormatter {
  pub fn new(time_layout: &str) -> Self {
    Self {
      time_layout: time_layout.to_string(),
    }
  }

  fn write_fields(buf: &mut String, event: &LogEvent) {
    // Sort keys for consistent output order.
    let mut sorted: Vec<_> = event.fields.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    buf.push_str("\t{");
    for (i, (key, value)) in sorted.iter().enumerate() {
      if i > 0 {
        buf.push_str(", ");
      }
      let _ = write!(buf, "{}={}", key, value);
    }
    buf.push('}');
  }
}

impl EventFormatter for TextFormatter {
  fn format_event(&self, event: &LogEvent) -> Result<Vec<u8>> {
    let mut output = String::with_capacity(128 + event.message.len());

    util::write_timestamp_with_format(&mut output, &event.timestamp, &self.time_layout);
    output.push('\t');
    output.push_str(event.level.as_str());
    output.push('\t');
    output.push_str(&event.message);

    if !event.fields.is_empty() {
      Self::write_fields(&mut output, event);
    }

    if !output.ends_with('\n') {
      output.push('\n');
    }

    Ok(output.into_bytes())
  }
}
