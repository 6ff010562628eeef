use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{Envelope, ResultLayout, RowSet};

/// Row sets longer than this are cut in table mode (Monte-Carlo traces).
const MAX_TABLE_ROWS: usize = 50;

/// Format output as tables: one Field/Value table, then one per row set.
pub fn print_table(value: &Value) {
    print!("{}", render_table(value));
}

pub fn render_table(value: &Value) -> String {
    let envelope = Envelope::parse(value);
    let layout = ResultLayout::from_result(envelope.result);
    let mut out = String::new();

    if !layout.fields.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in &layout.fields {
            builder.push_record([key.as_str(), val.as_str()]);
        }
        out.push_str(&format!("{}\n", Table::from(builder)));
    }

    for section in &layout.sections {
        out.push_str(&render_section(section));
    }

    if !envelope.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for w in &envelope.warnings {
            out.push_str(&format!("  - {w}\n"));
        }
    }
    if let Some(meth) = envelope.methodology {
        out.push_str(&format!("\nMethodology: {meth}\n"));
    }
    out
}

fn render_section(section: &RowSet) -> String {
    let total = section.rows.len();
    let mut builder = Builder::default();
    builder.push_record(section.headers.clone());
    for row in section.rows.iter().take(MAX_TABLE_ROWS) {
        builder.push_record(row.clone());
    }

    let mut out = format!(
        "\n{} ({total} rows)\n{}\n",
        section.name,
        Table::from(builder)
    );
    if total > MAX_TABLE_ROWS {
        out.push_str(&format!(
            "... {} more rows (use --output csv or json for all)\n",
            total - MAX_TABLE_ROWS
        ));
    }
    out
}
