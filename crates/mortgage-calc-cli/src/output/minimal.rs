use serde_json::Value;

use super::{flatten_result, format_scalar};

/// Print just the headline figure from the output.
///
/// Looks for the periodic payment first, then the down payment, then falls
/// back to the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "periodic_payment",
        "amortization.periodic_payment",
        "down_payment",
        "down_payment.down_payment",
    ];

    let fields = flatten_result(result_obj);

    for key in &priority_keys {
        if let Some((name, val)) = fields.iter().find(|(k, _)| k == key) {
            if !val.is_null() {
                println!("{}", format_scalar(name, val));
                return;
            }
        }
    }

    if let Some((key, val)) = fields.first() {
        println!("{}: {}", key, format_scalar(key, val));
        return;
    }

    println!("{}", format_scalar("", result_obj));
}
