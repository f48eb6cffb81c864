// src/config/processed.rs
use crate::config::raw::{ConfigRaw, SamplingRaw};
use crate::encoders::util::{is_valid_time_layout, DEFAULT_TIME_LAYOUT};
use crate::error_handling::{FaultReporter, InternalErrorSource};
use crate::model::Level;
use crate::sampling::SamplingOptions;
use crate::sanitize::sanitize_file_name;
use crate::sink::RotationPolicy;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DIRECTORY: &str = "logs";
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;
pub const DEFAULT_MAX_BACKUPS: u32 = 7;

/// Wire format of rendered entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
  #[default]
  Text,
  Json,
}

impl FromStr for Format {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "text" | "console" => Ok(Format::Text),
      "json" => Ok(Format::Json),
      other => Err(format!(
        "Unknown format '{}'. Expected 'text' or 'json'.",
        other
      )),
    }
  }
}

/// Validated configuration of one Log Core.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
  /// Where every file of the core lives.
  pub directory: PathBuf,
  /// Optional stem; files become `<stem>-<date>.log` instead of `<date>.log`.
  pub file_name: Option<String>,
  /// Minimum level written.
  pub level: Level,
  pub format: Format,
  pub time_layout: String,
  /// Bytes placed in front of every rendered entry.
  pub prefix: String,
  pub max_size_mb: u64,
  /// Backups kept per file; 0 keeps all.
  pub max_backups: u32,
  pub compress: bool,
  /// Duplicate error entries into `<date>_error.log`.
  pub split_error: bool,
  pub stdout: bool,
  pub sampling: Option<SamplingOptions>,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      directory: PathBuf::from(DEFAULT_DIRECTORY),
      file_name: None,
      level: Level::Info,
      format: Format::Text,
      time_layout: DEFAULT_TIME_LAYOUT.to_string(),
      prefix: String::new(),
      max_size_mb: DEFAULT_MAX_SIZE_MB,
      max_backups: DEFAULT_MAX_BACKUPS,
      compress: false,
      split_error: false,
      stdout: false,
      sampling: None,
    }
  }
}

impl Options {
  /// Verbose, human-readable, echoed to stdout.
  pub fn development() -> Self {
    Self {
      level: Level::Debug,
      format: Format::Text,
      stdout: true,
      ..Self::default()
    }
  }

  /// JSON, compressed backups, a separate error file and sampling.
  pub fn production() -> Self {
    Self {
      level: Level::Info,
      format: Format::Json,
      compress: true,
      split_error: true,
      sampling: Some(SamplingOptions::default()),
      ..Self::default()
    }
  }

  pub fn rotation_policy(&self) -> RotationPolicy {
    RotationPolicy::from_megabytes(self.max_size_mb, self.max_backups, self.compress)
  }

  /// Replaces unusable values with their defaults, reporting each repair.
  ///
  /// The stem comes back sanitized, or `None` if nothing usable was left.
  pub fn repaired(mut self, faults: &FaultReporter) -> Self {
    if self.directory.as_os_str().is_empty() {
      notice(faults, "directory", "empty directory", DEFAULT_DIRECTORY);
      self.directory = PathBuf::from(DEFAULT_DIRECTORY);
    }

    if self.max_size_mb == 0 {
      notice(faults, "max_size_mb", "0", &DEFAULT_MAX_SIZE_MB.to_string());
      self.max_size_mb = DEFAULT_MAX_SIZE_MB;
    }

    if !is_valid_time_layout(&self.time_layout) {
      notice(faults, "time_layout", &self.time_layout, DEFAULT_TIME_LAYOUT);
      self.time_layout = DEFAULT_TIME_LAYOUT.to_string();
    }

    if let Some(name) = self.file_name.take() {
      let cleaned = sanitize_file_name(&name);
      if cleaned.is_empty() {
        notice(faults, "file_name", &name, "<no stem>");
      } else {
        self.file_name = Some(cleaned);
      }
    }

    if let Some(sampling) = self.sampling.as_mut() {
      if sampling.tick.is_zero() {
        notice(faults, "sampling.tick", "0s", "1s");
        sampling.tick = Duration::from_secs(1);
      }
    }

    self
  }
}

fn notice(faults: &FaultReporter, field: &str, bad: &str, replacement: &str) {
  faults.report(
    InternalErrorSource::ConfigRepair {
      field: field.to_string(),
    },
    format!("invalid value '{}'", bad),
    Some(format!("using '{}' instead", replacement)),
  );
}

// --- Conversion and Validation Logic ---

/// Turns the raw document into validated `Options`. Never fails: every bad
/// value is reported through `faults` and replaced by the preset's value.
pub fn process_raw_config(raw: ConfigRaw, faults: &FaultReporter) -> Options {
  let mut options = match raw.preset.as_deref().map(|p| p.trim().to_lowercase()) {
    None => Options::default(),
    Some(p) if p == "development" || p == "dev" => Options::development(),
    Some(p) if p == "production" || p == "prod" => Options::production(),
    Some(other) => {
      notice(faults, "preset", &other, "<none>");
      Options::default()
    }
  };

  if let Some(directory) = raw.directory {
    options.directory = PathBuf::from(directory);
  }
  if raw.file_name.is_some() {
    options.file_name = raw.file_name;
  }
  if let Some(level) = raw.level {
    match level.parse::<Level>() {
      Ok(parsed) => options.level = parsed,
      Err(_) => notice(faults, "level", &level, options.level.as_str()),
    }
  }
  if let Some(format) = raw.format {
    match format.parse::<Format>() {
      Ok(parsed) => options.format = parsed,
      Err(_) => notice(faults, "format", &format, &format!("{:?}", options.format)),
    }
  }
  if let Some(time_layout) = raw.time_layout {
    options.time_layout = time_layout;
  }
  if let Some(prefix) = raw.prefix {
    options.prefix = prefix;
  }
  if let Some(max_size_mb) = raw.max_size_mb {
    if max_size_mb > 0 {
      options.max_size_mb = max_size_mb as u64;
    } else {
      notice(
        faults,
        "max_size_mb",
        &max_size_mb.to_string(),
        &options.max_size_mb.to_string(),
      );
    }
  }
  if let Some(max_backups) = raw.max_backups {
    match u32::try_from(max_backups) {
      Ok(parsed) => options.max_backups = parsed,
      Err(_) => notice(
        faults,
        "max_backups",
        &max_backups.to_string(),
        &options.max_backups.to_string(),
      ),
    }
  }
  if let Some(compress) = raw.compress {
    options.compress = compress;
  }
  if let Some(split_error) = raw.split_error {
    options.split_error = split_error;
  }
  if let Some(stdout) = raw.stdout {
    options.stdout = stdout;
  }
  if let Some(sampling) = raw.sampling {
    options.sampling = Some(process_sampling(sampling, options.sampling, faults));
  }

  options.repaired(faults)
}

fn process_sampling(
  raw: SamplingRaw,
  base: Option<SamplingOptions>,
  faults: &FaultReporter,
) -> SamplingOptions {
  let mut sampling = base.unwrap_or_default();
  if let Some(initial) = raw.initial {
    sampling.initial = initial;
  }
  if let Some(thereafter) = raw.thereafter {
    sampling.thereafter = thereafter;
  }
  if let Some(tick) = raw.tick {
    match humantime::parse_duration(&tick) {
      Ok(parsed) => sampling.tick = parsed,
      Err(_) => notice(
        faults,
        "sampling.tick",
        &tick,
        &humantime::format_duration(sampling.tick).to_string(),
      ),
    }
  }
  sampling
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error_handling::InternalErrorReceiver;

  fn repaired_fields(rx: &InternalErrorReceiver) -> Vec<String> {
    let mut fields = Vec::new();
    while let Ok(report) = rx.try_recv() {
      if let InternalErrorSource::ConfigRepair { field } = report.source {
        fields.push(field);
      }
    }
    fields
  }

  #[test]
  fn invalid_values_are_repaired_with_notices() {
    let (faults, rx) = FaultReporter::channel(16);
    let raw = ConfigRaw {
      level: Some("loud".to_string()),
      format: Some("xml".to_string()),
      max_size_mb: Some(-5),
      max_backups: Some(-1),
      directory: Some(String::new()),
      ..Default::default()
    };

    let options = process_raw_config(raw, &faults);
    assert_eq!(options.level, Level::Info);
    assert_eq!(options.format, Format::Text);
    assert_eq!(options.max_size_mb, DEFAULT_MAX_SIZE_MB);
    assert_eq!(options.max_backups, DEFAULT_MAX_BACKUPS);
    assert_eq!(options.directory, PathBuf::from(DEFAULT_DIRECTORY));

    assert_eq!(
      repaired_fields(&rx),
      vec!["level", "format", "max_size_mb", "max_backups", "directory"]
    );
  }

  #[test]
  fn valid_values_override_the_preset() {
    let faults = FaultReporter::stderr();
    let raw = ConfigRaw {
      preset: Some("production".to_string()),
      level: Some("debug".to_string()),
      file_name: Some("api".to_string()),
      max_backups: Some(0),
      sampling: Some(SamplingRaw {
        tick: Some("250ms".to_string()),
        ..Default::default()
      }),
      ..Default::default()
    };

    let options = process_raw_config(raw, &faults);
    assert_eq!(options.level, Level::Debug);
    assert_eq!(options.format, Format::Json);
    assert!(options.split_error);
    assert_eq!(options.file_name.as_deref(), Some("api"));
    assert_eq!(options.max_backups, 0);
    let sampling = options.sampling.unwrap();
    assert_eq!(sampling.tick, Duration::from_millis(250));
    assert_eq!(sampling.initial, 100);
  }

  #[test]
  fn stem_is_sanitized_or_dropped() {
    let (faults, rx) = FaultReporter::channel(4);
    let options = Options {
      file_name: Some("a/b:c".to_string()),
      ..Options::default()
    }
    .repaired(&faults);
    assert_eq!(options.file_name.as_deref(), Some("a_b_c"));
    assert!(repaired_fields(&rx).is_empty());

    let options = Options {
      file_name: Some("///".to_string()),
      ..Options::default()
    }
    .repaired(&faults);
    assert_eq!(options.file_name, None);
    assert_eq!(repaired_fields(&rx), vec!["file_name"]);
  }

  #[test]
  fn bad_time_layout_and_zero_size_are_repaired() {
    let (faults, rx) = FaultReporter::channel(4);
    let options = Options {
      time_layout: "%Q".to_string(),
      max_size_mb: 0,
      ..Options::default()
    }
    .repaired(&faults);
    assert_eq!(options.time_layout, DEFAULT_TIME_LAYOUT);
    assert_eq!(options.max_size_mb, DEFAULT_MAX_SIZE_MB);
    assert_eq!(repaired_fields(&rx), vec!["max_size_mb", "time_layout"]);
  }

  #[test]
  fn unknown_preset_falls_back_to_defaults() {
    let (faults, rx) = FaultReporter::channel(4);
    let raw = ConfigRaw {
      preset: Some("staging".to_string()),
      ..Default::default()
    };
    assert_eq!(process_raw_config(raw, &faults), Options::default());
    assert_eq!(repaired_fields(&rx), vec!["preset"]);
  }
}
