// Contains the public initialization functions for daylog.

use crate::{
  config::{process_raw_config, raw::ConfigRaw, Options},
  error::{Error, Result},
  error_handling::FaultReporter,
  logger::LogCore,
  registry,
};

use std::{
  env,
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Arc,
};

const DEFAULT_CONFIG_BASE_NAME: &str = "daylog";
const DEFAULT_CONFIG_EXTENSION: &str = "yaml";

/// Finds the configuration file based on common patterns and an optional environment suffix.
///
/// Looks for `daylog.<env>.yaml`, then `daylog.yaml`, in the working
/// directory. `<env>` comes from the argument, `DAYLOG_ENV` or `APP_ENV`.
pub fn find_config_file(environment_suffix: Option<&str>) -> Result<PathBuf> {
  find_config_file_in(Path::new("."), environment_suffix)
}

fn find_config_file_in(dir: &Path, environment_suffix: Option<&str>) -> Result<PathBuf> {
  let base_name = DEFAULT_CONFIG_BASE_NAME;
  let extension = DEFAULT_CONFIG_EXTENSION;

  let env_from_var = environment_suffix
    .map(|s| s.to_string())
    .or_else(|| env::var("DAYLOG_ENV").ok())
    .or_else(|| env::var("APP_ENV").ok());

  let mut files_to_check: Vec<String> = Vec::new();
  if let Some(env_str) = &env_from_var {
    if !env_str.is_empty() {
      files_to_check.push(format!("{}.{}.{}", base_name, env_str, extension));
    }
  }
  files_to_check.push(format!("{}.{}", base_name, extension));

  for file_name in &files_to_check {
    let path = dir.join(file_name);
    if path.is_file() {
      return Ok(path);
    }
  }

  Err(Error::ConfigNotFound(format!(
    "Searched for: {:?} in {:?}. Provide a config file or check DAYLOG_ENV/APP_ENV.",
    files_to_check, dir
  )))
}

/// Reads and repairs the options in a YAML file.
///
/// Only a missing or malformed file is an error; bad values are repaired
/// and reported through `faults`.
pub fn load_options(config_path: &Path, faults: &FaultReporter) -> Result<Options> {
  let file = File::open(config_path)?;
  let reader = io::BufReader::new(file);
  let raw_config: ConfigRaw =
    serde_yaml::from_reader(reader).map_err(|e| Error::ConfigParse(e.to_string()))?;
  Ok(process_raw_config(raw_config, faults))
}

/// Builds a Log Core from a YAML file and installs it as the process default.
pub fn init_from_file(config_path: &Path) -> Result<Arc<LogCore>> {
  let faults = FaultReporter::stderr();
  let options = load_options(config_path, &faults)?;
  let core = Arc::new(LogCore::builder(options).fault_reporter(faults).build());
  registry::replace(Some(Arc::clone(&core)));
  Ok(core)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Format;
  use crate::model::Level;
  use serial_test::serial;
  use std::fs;
  use tempfile::tempdir;

  #[test]
  #[serial]
  fn find_config_prefers_environment_specific_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("daylog.yaml"), "level: info").unwrap();
    fs::write(dir.path().join("daylog.staging.yaml"), "level: warn").unwrap();

    let found = find_config_file_in(dir.path(), Some("staging")).unwrap();
    assert_eq!(found, dir.path().join("daylog.staging.yaml"));

    let found = find_config_file_in(dir.path(), Some("qa")).unwrap();
    assert_eq!(found, dir.path().join("daylog.yaml"));
  }

  #[test]
  #[serial]
  fn find_config_file_not_found() {
    let dir = tempdir().unwrap();
    let result = find_config_file_in(dir.path(), Some("nowhere"));
    assert!(matches!(result, Err(Error::ConfigNotFound(_))));
  }

  #[test]
  fn load_options_repairs_bad_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("daylog.yaml");
    fs::write(
      &path,
      "directory: /tmp/app-logs\nfile_name: a/b:c\nlevel: shouty\nformat: json\nmax_backups: -2\n",
    )
    .unwrap();

    let (faults, rx) = FaultReporter::channel(8);
    let options = load_options(&path, &faults).unwrap();
    assert_eq!(options.directory, PathBuf::from("/tmp/app-logs"));
    assert_eq!(options.file_name.as_deref(), Some("a_b_c"));
    assert_eq!(options.level, Level::Info);
    assert_eq!(options.format, Format::Json);
    assert_eq!(options.max_backups, 7);
    assert_eq!(rx.len(), 2);
  }

  #[test]
  fn load_options_rejects_malformed_yaml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("daylog.yaml");
    fs::write(&path, "level: [unclosed").unwrap();
    let result = load_options(&path, &FaultReporter::stderr());
    assert!(matches!(result, Err(Error::ConfigParse(_))));
  }

  #[test]
  #[serial]
  fn init_from_file_installs_the_default() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("daylog.yaml");
    fs::write(
      &path,
      format!("directory: {:?}\nfile_name: svc\n", dir.path().join("logs")),
    )
    .unwrap();

    let previous = registry::current();
    let core = init_from_file(&path).unwrap();
    assert!(Arc::ptr_eq(&registry::current(), &core));
    assert_eq!(core.stem(), Some("svc"));
    registry::replace(Some(previous));
  }
}
