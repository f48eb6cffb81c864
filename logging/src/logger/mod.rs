//! The Log Core: renders entries, keeps the date-named files current and
//! routes bytes to them.

mod files;
mod levels;

pub use files::Generation;

use crate::clock::{self, Clock, SystemClock};
use crate::config::Options;
use crate::encoders::{self, EventFormatter};
use crate::error::{Error, Result};
use crate::error_handling::{FaultReporter, InternalErrorSource};
use crate::model::{Level, LogEvent, LogValue};
use crate::pool::BufferPool;
use crate::sampling::Sampler;
use crate::sink::{self, RollingFileFactory, SinkFactory};
use chrono::{DateTime, Local};
use parking_lot::RwLock;
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Seconds between two unconditional reconfiguration passes.
const FRESHNESS_INTERVAL_SECS: i64 = 60 * 60;

/// Builder for a [`LogCore`] with non-default collaborators.
pub struct LogCoreBuilder {
  options: Options,
  clock: Option<Arc<dyn Clock>>,
  sinks: Option<Arc<dyn SinkFactory>>,
  formatter: Option<Box<dyn EventFormatter>>,
  faults: FaultReporter,
}

impl LogCoreBuilder {
  pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = Some(clock);
    self
  }

  pub fn sink_factory(mut self, sinks: Arc<dyn SinkFactory>) -> Self {
    self.sinks = Some(sinks);
    self
  }

  /// Replaces the formatter chosen from `options.format`.
  pub fn formatter(mut self, formatter: Box<dyn EventFormatter>) -> Self {
    self.formatter = Some(formatter);
    self
  }

  pub fn fault_reporter(mut self, faults: FaultReporter) -> Self {
    self.faults = faults;
    self
  }

  /// Builds the core. Never fails: bad options are repaired. No file is
  /// touched until the first entry arrives.
  pub fn build(self) -> LogCore {
    let options = self.options.repaired(&self.faults);
    let formatter = self
      .formatter
      .unwrap_or_else(|| encoders::new_event_formatter(options.format, &options.time_layout));
    let sinks = self
      .sinks
      .unwrap_or_else(|| Arc::new(RollingFileFactory::new(self.faults.clone())));
    let sampler = options.sampling.map(Sampler::new);

    LogCore {
      stem: options.file_name.clone(),
      options,
      formatter,
      buffers: BufferPool::new(),
      sinks,
      clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
      faults: self.faults,
      sampler,
      generation: RwLock::new(None),
      last_freshness_check: AtomicI64::new(i64::MIN),
    }
  }
}

/// Routes structured entries to `<stem>-<date>.log` (and, with error
/// splitting, `<stem>-<date>_error.log`), reopening them when the date changes.
///
/// Safe to share between threads; usually held in an `Arc`.
pub struct LogCore {
  options: Options,
  stem: Option<String>,
  formatter: Box<dyn EventFormatter>,
  buffers: BufferPool,
  sinks: Arc<dyn SinkFactory>,
  clock: Arc<dyn Clock>,
  faults: FaultReporter,
  sampler: Option<Sampler>,
  generation: RwLock<Option<Arc<Generation>>>,
  last_freshness_check: AtomicI64,
}

impl fmt::Debug for LogCore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LogCore")
      .field("options", &self.options)
      .field("generation", &*self.generation.read())
      .finish()
  }
}

impl Default for LogCore {
  fn default() -> Self {
    Self::new(Options::default())
  }
}

impl LogCore {
  pub fn new(options: Options) -> Self {
    Self::builder(options).build()
  }

  pub fn builder(options: Options) -> LogCoreBuilder {
    LogCoreBuilder {
      options,
      clock: None,
      sinks: None,
      formatter: None,
      faults: FaultReporter::stderr(),
    }
  }

  /// The repaired options this core runs with.
  pub fn options(&self) -> &Options {
    &self.options
  }

  /// The sanitized stem, if one survived validation.
  pub fn stem(&self) -> Option<&str> {
    self.stem.as_deref()
  }

  pub fn enabled(&self, level: Level) -> bool {
    level >= self.options.level
  }

  /// Runs one entry through the pipeline: filter, render, prefix, make sure
  /// today's files are open, then write.
  ///
  /// Rendering and file setup failures are returned; write failures are
  /// retried, then reported to the fault sink and swallowed.
  pub fn log(&self, event: LogEvent) -> Result<()> {
    if !self.enabled(event.level) {
      return Ok(());
    }
    if let Some(sampler) = &self.sampler {
      if !sampler.allow(event.level, &event.message, event.timestamp.timestamp_millis()) {
        return Ok(());
      }
    }

    // 1. Render.
    let mut bytes = self.formatter.format_event(&event)?;

    // 2. Prefix, through a pooled scratch buffer.
    if !self.options.prefix.is_empty() {
      let mut scratch = self.buffers.acquire();
      scratch.extend_from_slice(self.options.prefix.as_bytes());
      scratch.extend_from_slice(&bytes);
      bytes.clear();
      bytes.extend_from_slice(&scratch);
    }

    // 3 + 4. Freshness, reconfiguring if needed.
    let generation = self.fresh_generation()?;

    // 5. Main sink.
    sink::write_with_retry(generation.main_sink().as_ref(), &bytes, &self.faults);

    // 6. Error duplication.
    if event.level == Level::Error && self.options.split_error {
      if let Some(error_sink) = generation.error_sink() {
        sink::write_with_retry(error_sink.as_ref(), &bytes, &self.faults);
      }
    }

    if self.options.stdout {
      let _ = std::io::stdout().lock().write_all(&bytes);
    }
    Ok(())
  }

  /// Returns the generation to write to, reconfiguring when the hourly
  /// check is due or when the installed generation is missing or stale.
  fn fresh_generation(&self) -> Result<Arc<Generation>> {
    let now = self.clock.now();
    let today = clock::date_string(&now);
    let now_secs = now.timestamp();

    let last = self.last_freshness_check.load(Ordering::Acquire);
    if last == i64::MIN || now_secs.saturating_sub(last) > FRESHNESS_INTERVAL_SECS {
      let generation = self.ensure_files_for_date(&today)?;
      self.last_freshness_check.store(now_secs, Ordering::Release);
      return Ok(generation);
    }

    if let Some(current) = self.generation.read().as_ref() {
      if current.date() == today {
        return Ok(Arc::clone(current));
      }
    }
    self.ensure_files_for_date(&today)
  }

  /// The current time by this core's clock.
  pub(crate) fn now(&self) -> DateTime<Local> {
    self.clock.now()
  }

  /// Builds an entry stamped by this core's clock and runs it through
  /// [`LogCore::log`], sending any failure to the fault sink.
  pub(crate) fn emit(&self, level: Level, message: String, fields: Vec<(String, LogValue)>) {
    let mut event = LogEvent::new(level, message);
    event.timestamp = self.now();
    event.fields = fields;
    self.log_or_report(event);
  }

  pub(crate) fn log_or_report(&self, event: LogEvent) {
    if let Err(e) = self.log(event) {
      let source = match e {
        Error::Formatting(_) => InternalErrorSource::EventFormatting,
        _ => InternalErrorSource::FileSetup {
          directory: self.options.directory.display().to_string(),
        },
      };
      self.faults.report(source, e, Some("entry dropped".to_string()));
    }
  }

  /// Flushes and closes the open files. A later entry reopens them.
  pub fn sync(&self) -> Result<()> {
    let generation = self.generation.write().take();
    self
      .last_freshness_check
      .store(i64::MIN, Ordering::Release);

    if let Some(generation) = generation {
      // Both sinks are closed even when the first one fails.
      let main = generation.main_sink().close();
      let error = generation.error_sink().map_or(Ok(()), |sink| sink.close());
      main.and(error)?;
    }
    Ok(())
  }
}
