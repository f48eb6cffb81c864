use serde::Deserialize;

/// The YAML document as written by the user. Every field is optional;
/// anything missing comes from the preset (or the defaults).
#[derive(Debug, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigRaw {
  /// `development` or `production`; the base the other fields override.
  #[serde(default)]
  pub preset: Option<String>,
  #[serde(default)]
  pub directory: Option<String>,
  /// Stem placed before the date in file names.
  #[serde(default)]
  pub file_name: Option<String>,
  #[serde(default)]
  pub level: Option<String>,
  /// `text` or `json`.
  #[serde(default)]
  pub format: Option<String>,
  /// chrono strftime layout for entry timestamps.
  #[serde(default)]
  pub time_layout: Option<String>,
  #[serde(default)]
  pub prefix: Option<String>,
  #[serde(default)]
  pub max_size_mb: Option<i64>,
  #[serde(default)]
  pub max_backups: Option<i64>,
  #[serde(default)]
  pub compress: Option<bool>,
  /// Duplicate error entries into a parallel `_error` file.
  #[serde(default)]
  pub split_error: Option<bool>,
  /// Echo every entry to standard output as well.
  #[serde(default)]
  pub stdout: Option<bool>,
  #[serde(default)]
  pub sampling: Option<SamplingRaw>,
}

#[derive(Debug, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct SamplingRaw {
  #[serde(default)]
  pub initial: Option<u64>,
  #[serde(default)]
  pub thereafter: Option<u64>,
  /// Window length, e.g. "1s" or "500ms".
  #[serde(default)]
  pub tick: Option<String>,
}
