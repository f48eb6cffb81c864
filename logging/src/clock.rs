//! Wall-clock access, injectable so date rollover can be driven in tests.

use chrono::{DateTime, Duration, Local};
use parking_lot::Mutex;

/// Layout of the date component in file names.
pub const DATE_LAYOUT: &str = "%Y-%m-%d";

pub trait Clock: Send + Sync + 'static {
  fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Local> {
    Local::now()
  }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
  now: Mutex<DateTime<Local>>,
}

impl ManualClock {
  pub fn new(start: DateTime<Local>) -> Self {
    Self {
      now: Mutex::new(start),
    }
  }

  pub fn set(&self, now: DateTime<Local>) {
    *self.now.lock() = now;
  }

  pub fn advance(&self, by: Duration) {
    let mut now = self.now.lock();
    *now += by;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Local> {
    *self.now.lock()
  }
}

pub(crate) fn date_string(now: &DateTime<Local>) -> String {
  now.format(DATE_LAYOUT).to_string()
}
