pub mod file;
pub mod stdin;

use std::collections::HashMap;

use chrono::Local;
use hypothek_core::snapshot::InputSnapshot;

/// Resolve the snapshot from the common input channels, in precedence
/// order: a typed `--input` file, a flat `--form` field map run through
/// the tolerant field reader, then piped stdin. None when nothing was
/// supplied, so commands can fall back to their flags.
pub fn load_snapshot(
    input: &Option<String>,
    form: &Option<String>,
) -> Result<Option<InputSnapshot>, Box<dyn std::error::Error>> {
    let today = Local::now().date_naive();

    let mut snapshot = if let Some(path) = input {
        Some(file::read_input::<InputSnapshot>(path)?)
    } else if let Some(path) = form {
        let fields: HashMap<String, String> = file::read_input(path)?;
        Some(InputSnapshot::from_fields(&fields, today))
    } else if let Some(value) = stdin::read_stdin()? {
        Some(serde_json::from_value(value)?)
    } else {
        None
    };

    // Age derivation needs a reference date; files rarely carry one.
    if let Some(s) = snapshot.as_mut() {
        s.valuation_date.get_or_insert(today);
    }
    Ok(snapshot)
}
