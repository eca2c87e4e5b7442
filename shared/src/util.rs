use serde_json::Value;

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Parse a loosely-typed identifier: a JSON integer or a decimal string.
///
/// Only the shape is checked. Zero and negative ids are returned as-is so the
/// caller's lookup rejects them; floats, non-numeric text and objects yield
/// `None`.
pub fn parse_loose_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => parse_id_str(s),
        _ => None,
    }
}

/// String form of [`parse_loose_id`]
pub fn parse_id_str(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}
