// demos/daily_usage.rs

use daylog::subscriber::{init_log_bridge, DaylogLayer};
use std::path::Path;
use std::thread;
use tracing_subscriber::prelude::*;

fn main() -> daylog::Result<()> {
  // 1. Build the default core from a configuration file.
  let config_path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/daylog.yaml"));
  let core = daylog::init_from_file(config_path)?;
  println!("Writing to {:?}", core.options().directory);

  // 2. Route `log` and `tracing` through the same core.
  init_log_bridge(core.clone())?;
  let subscriber = tracing_subscriber::registry().with(DaylogLayer::new(core.clone()));
  tracing::subscriber::set_global_default(subscriber)
    .map_err(|e| daylog::Error::GlobalSubscriberSet(e.to_string()))?;

  // 3. The three calling conventions on the default core.
  daylog::info("service starting");
  daylog::infof!("listening on port {}", 8080);
  daylog::warnw("config reloaded", [("changed", 2)]);

  let handles: Vec<_> = (0..4)
    .map(|worker| {
      thread::spawn(move || {
        for job in 0..25 {
          daylog::debugw("job done", [("worker", worker), ("job", job)]);
          if job % 10 == 9 {
            daylog::errorf!("worker {} saw a failure on job {}", worker, job);
          }
        }
      })
    })
    .collect();
  for handle in handles {
    let _ = handle.join();
  }

  log::warn!("bridged from the log crate");
  tracing::info!(user = "demo", "bridged from tracing");

  // 4. Flush before exit.
  daylog::sync()
}
