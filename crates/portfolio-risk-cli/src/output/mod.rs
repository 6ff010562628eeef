pub mod csv_out;
pub mod minimal;
pub mod table;

use std::io::{self, Write};

use serde_json::{Map, Value};

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn print_json(value: &Value) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = serde_json::to_writer_pretty(&mut out, value)
        .map_err(io::Error::from)
        .and_then(|_| writeln!(out));
    if let Err(e) = written {
        eprintln!("JSON output error: {e}");
    }
}

/// The parts of a `ComputationOutput` envelope the text formatters print.
pub struct Envelope<'a> {
    pub result: &'a Value,
    pub methodology: Option<&'a str>,
    pub warnings: Vec<&'a str>,
}

impl<'a> Envelope<'a> {
    /// Bare values (no `result` key) are treated as the result itself.
    pub fn parse(value: &'a Value) -> Self {
        let map = value.as_object();
        Self {
            result: map.and_then(|m| m.get("result")).unwrap_or(value),
            methodology: map
                .and_then(|m| m.get("methodology"))
                .and_then(Value::as_str),
            warnings: map
                .and_then(|m| m.get("warnings"))
                .and_then(Value::as_array)
                .map(|w| w.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default(),
        }
    }
}

/// A named block of rows, e.g. per-asset VaR contributions or stress results.
#[derive(Debug, PartialEq)]
pub struct RowSet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A result split into scalar fields and row sets.
///
/// Nested objects are flattened into dotted field names
/// (`portfolio.statistics.mean`). Arrays of objects and numeric matrices
/// become their own [`RowSet`]; plain number lists such as weights stay a
/// single comma-joined field.
#[derive(Debug, Default, PartialEq)]
pub struct ResultLayout {
    pub fields: Vec<(String, String)>,
    pub sections: Vec<RowSet>,
}

impl ResultLayout {
    pub fn from_result(result: &Value) -> Self {
        let mut layout = Self::default();
        match result {
            Value::Object(map) => layout.collect("", map),
            Value::Array(items) if is_row_set(items) || is_matrix(items) => {
                layout.push_array("result", items)
            }
            other => layout.fields.push(("result".to_string(), cell(other))),
        }
        layout
    }

    fn collect(&mut self, prefix: &str, map: &Map<String, Value>) {
        for (key, val) in map {
            // Top-level warnings are printed from the envelope.
            if prefix.is_empty() && key == "warnings" {
                continue;
            }
            let name = dotted(prefix, key);
            match val {
                Value::Object(inner) => self.collect(&name, inner),
                Value::Array(items) if is_row_set(items) || is_matrix(items) => {
                    self.push_array(&name, items)
                }
                _ => self.fields.push((name, cell(val))),
            }
        }
    }

    fn push_array(&mut self, name: &str, items: &[Value]) {
        let section = if is_matrix(items) {
            matrix_rows(name, items)
        } else {
            object_rows(name, items)
        };
        self.sections.push(section);
    }
}

fn matrix_rows(name: &str, items: &[Value]) -> RowSet {
    let width = items
        .iter()
        .filter_map(Value::as_array)
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    let mut headers = vec![String::new()];
    headers.extend((0..width).map(|j| j.to_string()));
    let rows = items
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut cells = vec![i.to_string()];
            cells.extend(row.as_array().into_iter().flatten().map(cell));
            cells
        })
        .collect();
    RowSet {
        name: name.to_string(),
        headers,
        rows,
    }
}

fn object_rows(name: &str, items: &[Value]) -> RowSet {
    let flat: Vec<Vec<(String, String)>> = items
        .iter()
        .map(|item| {
            let mut cells = Vec::new();
            flatten_row("", item, &mut cells);
            cells
        })
        .collect();

    // Union of columns in first-seen order; optional fields may be absent.
    let mut headers: Vec<String> = Vec::new();
    for row in &flat {
        for (h, _) in row {
            if !headers.contains(h) {
                headers.push(h.clone());
            }
        }
    }
    let rows = flat
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| {
                    row.iter()
                        .find(|(k, _)| k == h)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();
    RowSet {
        name: name.to_string(),
        headers,
        rows,
    }
}

fn flatten_row(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                flatten_row(&dotted(prefix, key), val, out);
            }
        }
        other => out.push((prefix.to_string(), cell(other))),
    }
}

fn dotted(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn is_row_set(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(Value::is_object)
}

fn is_matrix(items: &[Value]) -> bool {
    !items.is_empty()
        && items.iter().all(|row| {
            row.as_array()
                .is_some_and(|cells| cells.iter().all(Value::is_number))
        })
}

/// Render one value as a single text cell.
pub fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
