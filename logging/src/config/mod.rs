// src/config/mod.rs
// This module handles configuration parsing, validation and repair.

pub mod processed; // Validated options consumed by the Log Core
pub mod raw; // Structs directly mapping to the YAML structure

pub use processed::{process_raw_config, Format, Options};
