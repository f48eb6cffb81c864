// src/subscriber/visitor.rs
use crate::model::{LogEvent, LogValue};
use tracing_core::field::{Field, Visit};

/// Copies the fields of a `tracing` event into a `LogEvent`. The first
/// `message` field becomes the entry's message.
pub(crate) struct LogEventFieldVisitor<'a> {
  event: &'a mut LogEvent,
  message_seen: bool,
}

impl<'a> LogEventFieldVisitor<'a> {
  pub(crate) fn new(event: &'a mut LogEvent) -> Self {
    Self {
      event,
      message_seen: false,
    }
  }

  fn record_value(&mut self, field: &Field, value: LogValue) {
    if field.name() == "message" && !self.message_seen {
      self.message_seen = true;
      self.event.message = value.to_string();
    } else {
      self.event.fields.push((field.name().to_string(), value));
    }
  }
}

impl Visit for LogEventFieldVisitor<'_> {
  fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
    self.record_value(field, LogValue::Debug(format!("{:?}", value)));
  }

  fn record_str(&mut self, field: &Field, value: &str) {
    self.record_value(field, LogValue::String(value.to_string()));
  }

  fn record_i64(&mut self, field: &Field, value: i64) {
    self.record_value(field, LogValue::Int(value));
  }

  fn record_u64(&mut self, field: &Field, value: u64) {
    self.record_value(field, LogValue::from(value));
  }

  fn record_f64(&mut self, field: &Field, value: f64) {
    self.record_value(field, LogValue::Float(value));
  }

  fn record_bool(&mut self, field: &Field, value: bool) {
    self.record_value(field, LogValue::Bool(value));
  }
}
