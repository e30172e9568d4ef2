use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{find_schedule, flatten_result, format_scalar};

const SCHEDULE_COLUMNS: [(&str, &str); 6] = [
    ("period", "#"),
    ("date", "Date"),
    ("payment", "Payment"),
    ("principal", "Principal"),
    ("interest", "Interest"),
    ("balance", "Balance"),
];

/// Format output as tables using the tabled crate.
///
/// Scalar result fields go into a Field/Value table; a payment schedule, when
/// present, is printed as its own table closed by a Total row.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_fields(value);
            }
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    print_fields(result);

    if let Some((rows, totals)) = find_schedule(result) {
        println!();
        print_schedule(rows, totals);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(value: &Value) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten_result(value) {
        let shown = format_scalar(&key, &val);
        builder.push_record([key, shown]);
    }
    println!("{}", Table::from(builder));
}

fn print_schedule(rows: &[Value], totals: Option<&Value>) {
    if rows.is_empty() {
        println!("(empty schedule)");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(SCHEDULE_COLUMNS.iter().map(|(_, title)| title.to_string()));

    for row in rows {
        builder.push_record(
            SCHEDULE_COLUMNS
                .iter()
                .map(|(key, _)| row.get(*key).map(|v| format_scalar(key, v)).unwrap_or_default()),
        );
    }

    if let Some(totals) = totals {
        let total = |key: &str| {
            totals
                .get(key)
                .map(|v| format_scalar(key, v))
                .unwrap_or_default()
        };
        builder.push_record([
            "Total".to_string(),
            String::new(),
            total("total_cost"),
            total("total_principal"),
            total("total_interest"),
            "-".to_string(),
        ]);
    }

    println!("{}", Table::from(builder));
}
