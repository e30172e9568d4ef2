pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Flatten nested objects into dotted keys, skipping the schedule array.
pub(crate) fn flatten_result(value: &Value) -> Vec<(String, Value)> {
    let mut fields = Vec::new();
    if let Value::Object(map) = value {
        flatten_into("", map, &mut fields);
    }
    fields
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, out),
            Value::Array(_) if key == "schedule" => {}
            _ => out.push((name, val.clone())),
        }
    }
}

/// Locate the payment schedule and its totals anywhere in the result.
pub(crate) fn find_schedule(value: &Value) -> Option<(&Vec<Value>, Option<&Value>)> {
    let map = value.as_object()?;
    if let Some(Value::Array(rows)) = map.get("schedule") {
        return Some((rows, map.get("totals")));
    }
    map.values().find_map(find_schedule)
}

/// Render a scalar for people: money to cents, rates and ratios to six places.
pub(crate) fn format_scalar(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) => match Decimal::from_str(s) {
            Ok(d) if is_rate_field(key) => d.round_dp(6).normalize().to_string(),
            Ok(d) => format!("{:.2}", d.round_dp(2)),
            Err(_) => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

fn is_rate_field(key: &str) -> bool {
    let last = key.rsplit('.').next().unwrap_or(key);
    last.contains("rate") || last.contains("ratio")
}
