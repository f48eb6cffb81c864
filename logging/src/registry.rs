//! The process-wide default Log Core used by the crate-level functions.

use crate::logger::LogCore;
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use std::sync::Arc;

static DEFAULT_CORE: Lazy<ArcSwap<LogCore>> =
  Lazy::new(|| ArcSwap::from_pointee(LogCore::default()));

/// The current default core. The first call builds one from default options;
/// later calls are a lock-free pointer load.
pub fn current() -> Arc<LogCore> {
  DEFAULT_CORE.load_full()
}

/// Installs `core` as the default. `None` leaves the current core in place.
///
/// Returns the core that was replaced, if any.
pub fn replace(core: Option<Arc<LogCore>>) -> Option<Arc<LogCore>> {
  core.map(|core| DEFAULT_CORE.swap(core))
}
