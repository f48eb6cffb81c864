use crate::error::{Error, Result};
use crate::error_handling::{FaultReporter, InternalErrorSource};
use crate::sink::{RotationPolicy, Sink};

use flate2::write::GzEncoder;
use flate2::Compression;
use parking_lot::Mutex;
use regex::Regex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const COMPRESSED_SUFFIX: &str = ".gz";

/// A backup generation found next to the active file, e.g. `app-2025-07-20.3.log`.
#[derive(Debug, Eq, PartialEq, Clone)]
struct Backup {
  sequence: u32,
  path: PathBuf,
  is_compressed: bool,
}

impl Ord for Backup {
  fn cmp(&self, other: &Self) -> std::cmp::Ordering {
    // Newest (highest sequence) first, so retention keeps the most recent files.
    other.sequence.cmp(&self.sequence)
  }
}

impl PartialOrd for Backup {
  fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
    Some(self.cmp(other))
  }
}

struct RollerState {
  /// `None` after a failed roll; the next write reopens the file.
  writer: Option<BufWriter<File>>,
  current_size: u64,
  closed: bool,
}

/// A size-capped append file. When a write would push the active file past
/// the cap it is renamed to `<stem>.<n>.<ext>` and a fresh file takes its
/// place; old backups are pruned and optionally gzip-compressed.
///
/// Writes from any number of threads are serialized internally.
pub struct RollingFile {
  path: PathBuf,
  policy: RotationPolicy,
  backup_pattern: Regex,
  faults: FaultReporter,
  state: Mutex<RollerState>,
}

impl RollingFile {
  pub fn open(path: &Path, policy: RotationPolicy) -> Result<Self> {
    Self::open_with_reporter(path, policy, FaultReporter::stderr())
  }

  pub(crate) fn open_with_reporter(
    path: &Path,
    policy: RotationPolicy,
    faults: FaultReporter,
  ) -> Result<Self> {
    let (stem, extension) = split_file_name(path)?;
    let backup_pattern = Regex::new(&format!(
      r"^{}\.(\d+)\.{}(?:{})?$",
      regex::escape(&stem),
      regex::escape(&extension),
      regex::escape(COMPRESSED_SUFFIX)
    ))
    .map_err(|e| Error::Internal(format!("Backup pattern for {:?}: {}", path, e)))?;

    let (writer, current_size) = Self::open_file(path)?;
    Ok(Self {
      path: path.to_path_buf(),
      policy,
      backup_pattern,
      faults,
      state: Mutex::new(RollerState {
        writer: Some(writer),
        current_size,
        closed: false,
      }),
    })
  }

  /// Opens the active log file, creating it if necessary.
  fn open_file(path: &Path) -> Result<(BufWriter<File>, u64)> {
    let file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)
      .map_err(|e| Error::SinkSetup {
        path: path.display().to_string(),
        reason: format!("Failed to open log file: {}", e),
      })?;
    let current_size = file.metadata()?.len();
    Ok((BufWriter::new(file), current_size))
  }

  fn directory(&self) -> &Path {
    self
      .path
      .parent()
      .filter(|p| !p.as_os_str().is_empty())
      .unwrap_or_else(|| Path::new("."))
  }

  fn backup_path(&self, sequence: u32) -> PathBuf {
    let (stem, extension) = split_file_name(&self.path).unwrap_or_default();
    self
      .directory()
      .join(format!("{}.{}.{}", stem, sequence, extension))
  }

  /// Renames the active file to the next backup sequence and reopens it.
  fn roll(&self, state: &mut RollerState) -> Result<()> {
    // 1. Close the current writer.
    if let Some(mut old_writer) = state.writer.take() {
      old_writer.flush()?;
    }

    // 2. Discover existing backups and pick the next sequence.
    let backups = self.find_backups()?;
    let next_sequence = backups.iter().map(|b| b.sequence).max().unwrap_or(0) + 1;

    // 3. Rename the active file out of the way.
    let rolled_path = self.backup_path(next_sequence);
    if self.path.exists() {
      fs::rename(&self.path, &rolled_path)?;
    }

    // 4. Reopen the active file and reset state.
    let (writer, size) = Self::open_file(&self.path)?;
    state.writer = Some(writer);
    state.current_size = size;

    // 5. Prune and compress.
    let mut all_backups = backups;
    all_backups.push(Backup {
      sequence: next_sequence,
      path: rolled_path,
      is_compressed: false,
    });
    all_backups.sort();
    self.cleanup(all_backups);
    Ok(())
  }

  /// Finds and sorts (newest first) all backups of this file.
  fn find_backups(&self) -> Result<Vec<Backup>> {
    let mut backups = Vec::new();
    let directory = self.directory();
    if !directory.exists() {
      return Ok(backups);
    }

    for entry in fs::read_dir(directory)? {
      let path = entry?.path();
      if !path.is_file() {
        continue;
      }
      let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        continue;
      };
      if let Some(caps) = self.backup_pattern.captures(file_name) {
        if let Ok(sequence) = caps[1].parse::<u32>() {
          backups.push(Backup {
            sequence,
            is_compressed: file_name.ends_with(COMPRESSED_SUFFIX),
            path,
          });
        }
      }
    }
    backups.sort();
    Ok(backups)
  }

  /// Deletes backups beyond the retention limit, then compresses the rest.
  fn cleanup(&self, mut sorted_backups: Vec<Backup>) {
    if self.policy.max_backups > 0 {
      let retained = self.policy.max_backups as usize;
      for old in sorted_backups.iter().skip(retained) {
        if let Err(e) = fs::remove_file(&old.path) {
          self.report_io(&old.path, e, "delete old backup");
        }
      }
      sorted_backups.truncate(retained);
    }

    if self.policy.compress {
      for backup in sorted_backups.iter().filter(|b| !b.is_compressed) {
        if let Err(e) = compress_file(&backup.path) {
          self.report_io(&backup.path, e, "compress backup");
        }
      }
    }
  }

  fn report_io(&self, path: &Path, error: impl std::fmt::Display, action: &str) {
    self.faults.report(
      InternalErrorSource::RollerIo {
        path: path.display().to_string(),
      },
      error,
      Some(format!("Failed to {}", action)),
    );
  }

  fn write_internal(&self, buf: &[u8]) -> io::Result<()> {
    let to_io_error = |e: Error| io::Error::new(io::ErrorKind::Other, e.to_string());
    let mut state = self.state.lock();

    if state.closed {
      return Err(io::Error::new(
        io::ErrorKind::Other,
        format!("log file {:?} is closed", self.path),
      ));
    }
    if state.writer.is_none() {
      let (writer, size) = Self::open_file(&self.path).map_err(to_io_error)?;
      state.writer = Some(writer);
      state.current_size = size;
    }

    let incoming = buf.len() as u64;
    if state.current_size > 0 && state.current_size + incoming > self.policy.max_file_size {
      self.roll(&mut state).map_err(to_io_error)?;
    }

    let writer = state.writer.as_mut().ok_or_else(|| {
      io::Error::new(io::ErrorKind::Other, "log file unavailable after roll")
    })?;
    writer.write_all(buf)?;
    writer.flush()?;
    state.current_size += incoming;
    Ok(())
  }
}

impl Sink for RollingFile {
  fn path(&self) -> &Path {
    &self.path
  }

  fn write_bytes(&self, buf: &[u8]) -> io::Result<()> {
    self.write_internal(buf)
  }

  fn flush(&self) -> io::Result<()> {
    match self.state.lock().writer.as_mut() {
      Some(writer) => writer.flush(),
      None => Ok(()),
    }
  }

  fn close(&self) -> io::Result<()> {
    let mut state = self.state.lock();
    state.closed = true;
    match state.writer.take() {
      Some(mut writer) => writer.flush(),
      None => Ok(()),
    }
  }
}

impl Drop for RollingFile {
  fn drop(&mut self) {
    if let Some(writer) = self.state.get_mut().writer.as_mut() {
      let _ = writer.flush();
    }
  }
}

/// Splits `dir/app-2025-07-20.log` into (`app-2025-07-20`, `log`).
fn split_file_name(path: &Path) -> Result<(String, String)> {
  let stem = path
    .file_stem()
    .and_then(|s| s.to_str())
    .filter(|s| !s.is_empty())
    .ok_or_else(|| Error::SinkSetup {
      path: path.display().to_string(),
      reason: "Path has no usable file name".to_string(),
    })?;
  let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("log");
  Ok((stem.to_string(), extension.to_string()))
}

/// Compress a backup using gzip, then remove the original.
fn compress_file(source_path: &Path) -> io::Result<()> {
  let compressed_path = PathBuf::from(format!("{}{}", source_path.display(), COMPRESSED_SUFFIX));

  let input = fs::read(source_path)?;
  let output_file = File::create(&compressed_path)?;
  let mut encoder = GzEncoder::new(output_file, Compression::default());
  encoder.write_all(&input)?;
  encoder.finish()?;

  fs::remove_file(source_path)
}

// ===================================================================================
//
//                              TESTS
//
// ===================================================================================
#[cfg(test)]
mod tests {
  use super::*;
  use flate2::read::GzDecoder;
  use std::io::Read;
  use tempfile::{tempdir, TempDir};

  struct TestSetup {
    temp_dir: TempDir,
    path: PathBuf,
  }

  fn setup() -> TestSetup {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("app-2025-07-20.log");
    TestSetup { temp_dir, path }
  }

  fn policy(max_file_size: u64, max_backups: u32, compress: bool) -> RotationPolicy {
    RotationPolicy {
      max_file_size,
      max_backups,
      compress,
    }
  }

  fn list_files(dir: &Path) -> Vec<String> {
    let mut files = fs::read_dir(dir)
      .unwrap()
      .map(|res| res.unwrap().file_name().into_string().unwrap())
      .collect::<Vec<String>>();
    files.sort();
    files
  }

  #[test]
  fn writes_are_flushed_immediately() {
    let setup = setup();
    let roller = RollingFile::open(&setup.path, policy(1024, 0, false)).unwrap();

    roller.write_bytes(b"single message\n").unwrap();
    assert_eq!(fs::read_to_string(&setup.path).unwrap(), "single message\n");
    assert_eq!(list_files(setup.temp_dir.path()), vec!["app-2025-07-20.log"]);
  }

  #[test]
  fn appends_to_existing_file() {
    let setup = setup();
    fs::write(&setup.path, b"earlier\n").unwrap();
    let roller = RollingFile::open(&setup.path, policy(1024, 0, false)).unwrap();

    roller.write_bytes(b"later\n").unwrap();
    assert_eq!(fs::read_to_string(&setup.path).unwrap(), "earlier\nlater\n");
  }

  #[test]
  fn size_based_roll_moves_old_content_to_backup() {
    let setup = setup();
    let roller = RollingFile::open(&setup.path, policy(10, 0, false)).unwrap();

    roller.write_bytes(b"12345678").unwrap();
    assert_eq!(list_files(setup.temp_dir.path()).len(), 1);

    // 8 + 8 > 10, so the active file rolls before this write.
    roller.write_bytes(b"abcdefgh").unwrap();

    assert_eq!(
      list_files(setup.temp_dir.path()),
      vec!["app-2025-07-20.1.log", "app-2025-07-20.log"]
    );
    let backup = setup.temp_dir.path().join("app-2025-07-20.1.log");
    assert_eq!(fs::read_to_string(backup).unwrap(), "12345678");
    assert_eq!(fs::read_to_string(&setup.path).unwrap(), "abcdefgh");
  }

  #[test]
  fn oversized_entry_into_empty_file_does_not_roll() {
    let setup = setup();
    let roller = RollingFile::open(&setup.path, policy(4, 0, false)).unwrap();
    roller.write_bytes(b"much longer than four bytes").unwrap();
    assert_eq!(list_files(setup.temp_dir.path()).len(), 1);
  }

  #[test]
  fn retention_keeps_newest_backups() {
    let setup = setup();
    let roller = RollingFile::open(&setup.path, policy(10, 2, false)).unwrap();

    for i in 0..5 {
      roller
        .write_bytes(format!("Log message {}", i).as_bytes())
        .unwrap();
    }

    let files = list_files(setup.temp_dir.path());
    assert_eq!(
      files,
      vec![
        "app-2025-07-20.3.log",
        "app-2025-07-20.4.log",
        "app-2025-07-20.log"
      ]
    );
    assert_eq!(fs::read_to_string(&setup.path).unwrap(), "Log message 4");
  }

  #[test]
  fn backups_of_other_files_are_ignored() {
    let setup = setup();
    let error_backup = setup.temp_dir.path().join("app-2025-07-20_error.1.log");
    fs::write(&error_backup, b"error backup").unwrap();

    let roller = RollingFile::open(&setup.path, policy(4, 1, false)).unwrap();
    roller.write_bytes(b"aaaa").unwrap();
    roller.write_bytes(b"bbbb").unwrap();
    roller.write_bytes(b"cccc").unwrap();

    assert!(error_backup.exists());
    assert!(setup.temp_dir.path().join("app-2025-07-20.2.log").exists());
    assert!(!setup.temp_dir.path().join("app-2025-07-20.1.log").exists());
  }

  #[test]
  fn compression_gzips_rolled_backups() {
    let setup = setup();
    let roller = RollingFile::open(&setup.path, policy(6, 0, true)).unwrap();

    roller.write_bytes(b"first\n").unwrap();
    roller.write_bytes(b"second\n").unwrap();

    let files = list_files(setup.temp_dir.path());
    assert_eq!(files, vec!["app-2025-07-20.1.log.gz", "app-2025-07-20.log"]);

    let compressed = File::open(setup.temp_dir.path().join("app-2025-07-20.1.log.gz")).unwrap();
    let mut decoded = String::new();
    GzDecoder::new(compressed)
      .read_to_string(&mut decoded)
      .unwrap();
    assert_eq!(decoded, "first\n");
  }

  #[test]
  fn compressed_backups_count_toward_sequence_and_retention() {
    let setup = setup();
    let roller = RollingFile::open(&setup.path, policy(2, 2, true)).unwrap();
    for chunk in [b"aa", b"bb", b"cc", b"dd"] {
      roller.write_bytes(chunk).unwrap();
    }

    assert_eq!(
      list_files(setup.temp_dir.path()),
      vec![
        "app-2025-07-20.2.log.gz",
        "app-2025-07-20.3.log.gz",
        "app-2025-07-20.log"
      ]
    );
  }

  #[test]
  fn writes_after_close_fail() {
    let setup = setup();
    let roller = RollingFile::open(&setup.path, policy(1024, 0, false)).unwrap();
    roller.write_bytes(b"before close\n").unwrap();
    roller.close().unwrap();

    assert!(roller.write_bytes(b"after close\n").is_err());
    assert_eq!(fs::read_to_string(&setup.path).unwrap(), "before close\n");
  }

  #[test]
  fn write_after_failed_roll_reopens_the_file() {
    let temp_dir = tempdir().unwrap();
    let logs = temp_dir.path().join("logs");
    fs::create_dir(&logs).unwrap();
    let path = logs.join("app-2025-07-20.log");
    let roller = RollingFile::open(&path, policy(8, 0, false)).unwrap();

    roller.write_bytes(b"12345678").unwrap();
    fs::remove_dir_all(&logs).unwrap();
    assert!(roller.write_bytes(b"abcdefgh").is_err());

    fs::create_dir(&logs).unwrap();
    roller.write_bytes(b"recovered\n").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "recovered\n");
  }

  #[test]
  fn opening_a_directory_fails() {
    let setup = setup();
    fs::create_dir(&setup.path).unwrap();
    let result = RollingFile::open(&setup.path, policy(1024, 0, false));
    assert!(matches!(result, Err(Error::SinkSetup { .. })));
  }
}
