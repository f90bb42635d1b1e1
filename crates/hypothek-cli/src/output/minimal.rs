use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Heuristic: look for the headline figures of each analysis in priority
/// order, then fall back to the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // The single figure each command is usually run for.
    let priority_keys = [
        "mortgage_amount",
        "burden_ratio",
        "blended_rate",
        "monthly_total",
        "loan_to_value",
        "minimum_required_income",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        // Nested reports (e.g. {mix, costs}): try one level down.
        for section in map.values() {
            if let Value::Object(inner) = section {
                for key in &priority_keys {
                    if let Some(val) = inner.get(*key) {
                        if !val.is_null() {
                            println!("{}", format_minimal(val));
                            return;
                        }
                    }
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
