//! Per-tick sampling of repetitive entries.

use crate::model::Level;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// Within each `tick`, the first `initial` entries with the same level and
/// message are kept, then every `thereafter`-th one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingOptions {
  pub initial: u64,
  pub thereafter: u64,
  pub tick: Duration,
}

impl Default for SamplingOptions {
  fn default() -> Self {
    Self {
      initial: 100,
      thereafter: 100,
      tick: Duration::from_secs(1),
    }
  }
}

struct Window {
  started_ms: i64,
  count: u64,
}

pub(crate) struct Sampler {
  options: SamplingOptions,
  windows: Mutex<HashMap<u64, Window>>,
}

impl Sampler {
  pub(crate) fn new(options: SamplingOptions) -> Self {
    Self {
      options,
      windows: Mutex::new(HashMap::new()),
    }
  }

  /// Decides whether an entry observed at `now_ms` (unix millis) is kept.
  pub(crate) fn allow(&self, level: Level, message: &str, now_ms: i64) -> bool {
    if level >= Level::Panic {
      return true;
    }

    let mut hasher = DefaultHasher::new();
    level.hash(&mut hasher);
    message.hash(&mut hasher);
    let key = hasher.finish();

    let tick_ms = (self.options.tick.as_millis() as i64).max(1);
    let mut windows = self.windows.lock();
    // Drop windows that can no longer matter so the map stays small.
    if windows.len() > 4096 {
      windows.retain(|_, w| now_ms - w.started_ms < tick_ms);
    }

    let window = windows.entry(key).or_insert(Window {
      started_ms: now_ms,
      count: 0,
    });
    if now_ms - window.started_ms >= tick_ms {
      window.started_ms = now_ms;
      window.count = 0;
    }
    window.count += 1;

    let n = window.count;
    if n <= self.options.initial {
      return true;
    }
    self.options.thereafter > 0 && (n - self.options.initial) % self.options.thereafter == 0
  }
}
