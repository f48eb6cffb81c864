//! File lifecycle: which files are open for which date, and how they are
//! (re)opened when the date changes.

use super::LogCore;
use crate::error::{Error, Result};
use crate::error_handling::InternalErrorSource;
use crate::sink::Sink;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

const MAIN_SUFFIX: &str = "";
const ERROR_SUFFIX: &str = "_error";
const EXTENSION: &str = "log";

/// The sinks valid for one calendar day. Never mutated; a rollover installs
/// a new generation as a whole.
pub struct Generation {
  date: String,
  main: Arc<dyn Sink>,
  error: Option<Arc<dyn Sink>>,
}

impl Generation {
  pub fn date(&self) -> &str {
    &self.date
  }

  pub fn main_sink(&self) -> &Arc<dyn Sink> {
    &self.main
  }

  pub fn error_sink(&self) -> Option<&Arc<dyn Sink>> {
    self.error.as_ref()
  }

  fn flush(&self) {
    let _ = self.main.flush();
    if let Some(error) = &self.error {
      let _ = error.flush();
    }
  }
}

impl fmt::Debug for Generation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Generation")
      .field("date", &self.date)
      .field("main", &self.main.path())
      .field("error", &self.error.as_ref().map(|s| s.path().to_path_buf()))
      .finish()
  }
}

/// `<stem>-<date><suffix>.log`, or `<date><suffix>.log` without a stem.
pub(crate) fn file_name_for(stem: Option<&str>, date: &str, suffix: &str) -> String {
  match stem {
    Some(stem) => format!("{}-{}{}.{}", stem, date, suffix, EXTENSION),
    None => format!("{}{}.{}", date, suffix, EXTENSION),
  }
}

impl LogCore {
  /// Makes sure the files for `date` are open and returns their generation.
  ///
  /// A no-op returning the current generation when it already matches `date`
  /// and holds every sink the options require.
  pub fn ensure_files_for_date(&self, date: &str) -> Result<Arc<Generation>> {
    let mut slot = self.generation.write();

    if let Some(current) = slot.as_ref() {
      if current.date == date && (!self.options.split_error || current.error.is_some()) {
        return Ok(Arc::clone(current));
      }
    }

    let directory = &self.options.directory;
    if !directory.exists() {
      fs::create_dir_all(directory).map_err(|e| {
        self.faults.report(
          InternalErrorSource::FileSetup {
            directory: directory.display().to_string(),
          },
          &e,
          None,
        );
        Error::DirectoryCreate {
          path: directory.display().to_string(),
          reason: e.to_string(),
        }
      })?;
    }

    // Probe every sink before touching the slot, so a failure leaves the
    // previous generation in place.
    let main = self.open_probed(date, MAIN_SUFFIX)?;
    let error = if self.options.split_error {
      Some(self.open_probed(date, ERROR_SUFFIX)?)
    } else {
      None
    };

    let generation = Arc::new(Generation {
      date: date.to_string(),
      main,
      error,
    });
    let previous = slot.replace(Arc::clone(&generation));
    drop(slot);

    // Writers may still hold the previous generation; it closes when the
    // last of them lets go.
    if let Some(previous) = previous {
      previous.flush();
    }
    Ok(generation)
  }

  /// Opens the stem-based file for `date`, falling back to the unstemmed name.
  fn open_probed(&self, date: &str, suffix: &str) -> Result<Arc<dyn Sink>> {
    let stem = self.stem.as_deref();
    let candidate = self.path_for(stem, date, suffix);

    match self.probe(&candidate) {
      Ok(sink) => Ok(sink),
      Err(e) if stem.is_some() => {
        self.faults.report(
          InternalErrorSource::SinkProbe {
            path: candidate.display().to_string(),
          },
          &e,
          Some("falling back to the unstemmed file name".to_string()),
        );
        let fallback = self.path_for(None, date, suffix);
        self.probe(&fallback)
      }
      Err(e) => Err(e),
    }
  }

  fn probe(&self, path: &std::path::Path) -> Result<Arc<dyn Sink>> {
    let sink = self.sinks.open(path, self.options.rotation_policy())?;
    sink.flush().map_err(|e| Error::SinkSetup {
      path: path.display().to_string(),
      reason: e.to_string(),
    })?;
    Ok(sink)
  }

  fn path_for(&self, stem: Option<&str>, date: &str, suffix: &str) -> PathBuf {
    self
      .options
      .directory
      .join(file_name_for(stem, date, suffix))
  }

  /// The generation currently installed, if any.
  pub fn current_generation(&self) -> Option<Arc<Generation>> {
    self.generation.read().clone()
  }
}
