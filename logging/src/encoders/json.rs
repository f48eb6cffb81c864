// src/encoders/json.rs
use super::{util, EventFormatter};
use crate::error::{Error, Result};
use crate::model::{LogEvent, LogValue};
use serde_json::{Map, Value};

const RESERVED_KEYS: [&str; 3] = ["time", "level", "msg"];

/// One JSON object per line. Fields are flattened into the top-level object;
/// a field named like a reserved key (`time`, `level`, `msg`) is dropped.
pub struct JsonLinesFormatter {
  time_layout: String,
}

impl JsonLinesFormatter {
  pub fn new(time_layout: &str) -> Self {
    Self {
      time_layout: time_layout.to_string(),
    }
  }
}

fn to_json_value(log_value: &LogValue) -> Value {
  match log_value {
    LogValue::String(s) | LogValue::Debug(s) => Value::String(s.clone()),
    LogValue::Int(i) => Value::Number((*i).into()),
    LogValue::Float(f) => serde_json::Number::from_f64(*f)
      .map(Value::Number)
      .unwrap_or(Value::Null),
    LogValue::Bool(b) => Value::Bool(*b),
  }
}

impl EventFormatter for JsonLinesFormatter {
  fn format_event(&self, event: &LogEvent) -> Result<Vec<u8>> {
    let mut json_map = Map::new();

    let mut ts_buf = String::new();
    util::write_timestamp_with_format(&mut ts_buf, &event.timestamp, &self.time_layout);
    json_map.insert("time".to_string(), Value::String(ts_buf));
    json_map.insert(
      "level".to_string(),
      Value::String(event.level.as_str().to_lowercase()),
    );
    json_map.insert("msg".to_string(), Value::String(event.message.clone()));

    for (key, value) in &event.fields {
      if RESERVED_KEYS.contains(&key.as_str()) {
        continue;
      }
      json_map.insert(key.clone(), to_json_value(value));
    }

    let mut bytes = serde_json::to_vec(&Value::Object(json_map))
      .map_err(|e| Error::Formatting(format!("JSON serialization failed: {}", e)))?;
    bytes.push(b'\n');
    Ok(bytes)
  }
}
