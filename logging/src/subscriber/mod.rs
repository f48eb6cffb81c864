// Bridges from the `tracing` and `log` ecosystems into a Log Core.

mod layer;
mod log_handler;
mod visitor;

pub use layer::DaylogLayer;
pub use log_handler::{init_log_bridge, LogHandler};
