use serde_json::Value;
use std::io;

use super::{find_schedule, flatten_result, format_scalar};

/// Write output as CSV to stdout.
///
/// A payment schedule is written one row per payment, followed by a blank
/// line and the remaining figures as field/value pairs. Any other result is
/// written as field/value pairs only.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        log::warn!("csv output failed: {e}");
    }
}

fn write_csv<W: io::Write>(out: W, value: &Value) -> Result<(), csv::Error> {
    let mut builder = csv::WriterBuilder::new();
    builder.flexible(true);
    let mut wtr = builder.from_writer(out);

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some((rows, _)) = find_schedule(result) {
        write_schedule_csv(&mut wtr, rows)?;
        wtr.flush()?;
        let mut out = wtr.into_inner().map_err(|e| e.into_error())?;
        out.write_all(b"\n")?;
        wtr = builder.from_writer(out);
    }

    wtr.write_record(["field", "value"])?;
    for (key, val) in flatten_result(result) {
        wtr.write_record([key.as_str(), &format_scalar(&key, &val)])?;
    }

    wtr.flush()?;
    Ok(())
}

fn write_schedule_csv<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    rows: &[Value],
) -> Result<(), csv::Error> {
    let Some(Value::Object(first)) = rows.first() else {
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    wtr.write_record(&headers)?;

    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(|v| format_scalar(h, v)).unwrap_or_default())
                .collect();
            wtr.write_record(&row)?;
        }
    }
    Ok(())
}
