//! Row-to-document flattening.

/// Flatten one table row into a single indexable line.
///
/// Output shape: `Table: {table} | {col}: {val}; {col}: {val}; ...`
/// NULL and empty values are skipped so sparse rows stay readable.
pub fn flatten_row(table: &str, columns: &[String], values: &[Option<String>]) -> String {
    let fields: Vec<String> = columns
        .iter()
        .zip(values.iter())
        .filter_map(|(col, val)| match val {
            Some(v) if !v.trim().is_empty() => Some(format!("{}: {}", col, v)),
            _ => None,
        })
        .collect();

    format!("Table: {} | {}", table, fields.join("; "))
}
