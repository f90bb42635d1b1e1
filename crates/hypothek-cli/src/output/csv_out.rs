use serde_json::Value;
use std::io;

/// Write output as CSV to stdout. Nested result sections flatten into
/// dotted field paths (e.g. `mix.blended_rate`).
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(_) => {
            let _ = wtr.write_record(["field", "value"]);
            let mut rows = Vec::new();
            flatten("", result, &mut rows);
            for (path, val) in rows {
                let _ = wtr.write_record([path.as_str(), val.as_str()]);
            }
        }
        Value::Array(arr) => write_rows(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([format_csv_value(result)]);
        }
    }

    let _ = wtr.flush();
}

fn flatten(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, val, rows);
            }
        }
        Value::Array(arr) => {
            for (idx, val) in arr.iter().enumerate() {
                flatten(&format!("{prefix}[{idx}]"), val, rows);
            }
        }
        other => rows.push((prefix.to_string(), format_csv_value(other))),
    }
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let _ = wtr.write_record(&headers);
        for item in arr {
            if let Value::Object(obj) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| obj.get(h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
