// src/subscriber/layer.rs
// A tracing Layer that hands events to a Log Core.

use crate::{
  logger::LogCore,
  model::{Level, LogEvent},
  subscriber::visitor::LogEventFieldVisitor,
};
use std::sync::Arc;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Forwards every `tracing` event to a [`LogCore`]. TRACE and DEBUG both
/// become debug entries; the event target is kept as a `target` field.
pub struct DaylogLayer {
  core: Arc<LogCore>,
}

impl DaylogLayer {
  pub fn new(core: Arc<LogCore>) -> Self {
    Self { core }
  }

  fn map_level(level: &tracing::Level) -> Level {
    match *level {
      tracing::Level::ERROR => Level::Error,
      tracing::Level::WARN => Level::Warn,
      tracing::Level::INFO => Level::Info,
      _ => Level::Debug,
    }
  }

  /// Converts a `tracing::Event` into our internal `LogEvent` format.
  fn build_log_event(&self, event: &Event<'_>) -> LogEvent {
    let metadata = event.metadata();
    let mut log_event = LogEvent::new(Self::map_level(metadata.level()), String::new());
    log_event.timestamp = self.core.now();

    let mut visitor = LogEventFieldVisitor::new(&mut log_event);
    event.record(&mut visitor);

    log_event
      .fields
      .push(("target".to_string(), metadata.target().into()));
    log_event
  }
}

impl<S> Layer<S> for DaylogLayer
where
  S: Subscriber,
{
  fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
    let level = Self::map_level(event.metadata().level());
    if !self.core.enabled(level) {
      return;
    }
    self.core.log_or_report(self.build_log_event(event));
  }
}
