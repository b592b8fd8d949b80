use crate::bus::EventMultiplexer;
use crate::error::{MonitorError, Result};

use sentinel_model::Event;
use serde_json::Value;

/// Parse one feed object into an [`Event`].
pub fn decode_payload(raw: &str) -> Result<Event> {
    serde_json::from_str(raw.trim()).map_err(MonitorError::from)
}

/// Parse a frame that may hold a single object or a JSON array of them.
///
/// Array elements are decoded independently; a bad element does not take
/// its siblings down with it.
pub fn decode_frame(raw: &str) -> Vec<Result<Event>> {
    let value: Value = match serde_json::from_str(raw.trim()) {
        Ok(value) => value,
        Err(err) => return vec![Err(err.into())],
    };

    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(MonitorError::from))
            .collect(),
        Value::Object(_) => {
            vec![serde_json::from_value(value).map_err(MonitorError::from)]
        }
        other => vec![Err(MonitorError::Protocol(format!(
            "expected an event object, got {}",
            json_kind(&other)
        )))],
    }
}

/// Decode a frame and publish every well-formed event in it. Malformed
/// events are logged and dropped here so they never reach a subscriber.
pub fn publish_frame(sink: &EventMultiplexer, source: &str, raw: &str) -> usize {
    let mut published = 0;
    for decoded in decode_frame(raw) {
        match decoded {
            Ok(event) => {
                sink.publish(&event);
                published += 1;
            }
            Err(err) => {
                tracing::warn!(
                    source,
                    error = %err,
                    payload = %truncate(raw, 256),
                    "dropping malformed event"
                );
            }
        }
    }
    published
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn truncate(raw: &str, max: usize) -> &str {
    if raw.len() <= max {
        return raw;
    }
    let mut end = max;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    &raw[..end]
}
