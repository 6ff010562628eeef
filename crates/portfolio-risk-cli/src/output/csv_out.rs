use std::io::{self, Write};

use serde_json::Value;

use super::{Envelope, ResultLayout};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(value, stdout.lock()) {
        eprintln!("CSV output error: {e}");
    }
}

/// Scalar fields as a `field,value` block, then each row set as a block
/// whose first column names the set (`section,asset,weight,...`).
pub fn write_csv<W: Write>(value: &Value, writer: W) -> csv::Result<()> {
    let layout = ResultLayout::from_result(Envelope::parse(value).result);
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    if !layout.fields.is_empty() {
        wtr.write_record(["field", "value"])?;
        for (key, val) in &layout.fields {
            wtr.write_record([key.as_str(), val.as_str()])?;
        }
    }

    for section in &layout.sections {
        let mut header = vec!["section"];
        header.extend(section.headers.iter().map(String::as_str));
        wtr.write_record(&header)?;
        for row in &section.rows {
            let mut record = vec![section.name.as_str()];
            record.extend(row.iter().map(String::as_str));
            wtr.write_record(&record)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_breaches_written_as_row_block() {
        let value = json!({
            "result": {
                "exceedances": 2,
                "passed": true,
                "breaches": [
                    { "period": 3, "label": "day-3", "loss": 0.031, "threshold": 0.02 },
                    { "period": 9, "label": "day-9", "loss": 0.025, "threshold": 0.02 }
                ],
                "warnings": []
            }
        });
        let mut buf = Vec::new();
        write_csv(&value, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "field,value",
                "exceedances,2",
                "passed,true",
                "section,label,loss,period,threshold",
                "breaches,day-3,0.031,3,0.02",
                "breaches,day-9,0.025,9,0.02",
            ]
        );
    }

    #[test]
    fn test_array_result_without_fields() {
        let value = json!({ "result": [{ "volatility": 0.1, "expected_return": 0.05 }] });
        let mut buf = Vec::new();
        write_csv(&value, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("section,expected_return,volatility\n"));
        assert!(text.contains("result,0.05,0.1"));
    }
}
