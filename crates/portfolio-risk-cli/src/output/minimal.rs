use serde_json::Value;

use super::{cell, Envelope};

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = Envelope::parse(value).result;

    // Priority list of key output fields
    let priority_keys = [
        "var",
        "weights",
        "risky_weight",
        "statistic",
        "kupiec_statistic",
        "beta",
        "worst_scenario",
        "sharpe_ratio",
        "volatility",
        "expected_return",
    ];

    if let Value::Object(map) = result_obj {
        // Portfolio VaR nests the headline figure
        if let Some(var) = map.get("portfolio").and_then(|p| p.get("var")) {
            println!("{}", cell(var));
            return;
        }

        // Try priority keys first (skip null values)
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", cell(val));
                    return;
                }
            }
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, cell(val));
            return;
        }
    }

    // Not an object, just print directly
    println!("{}", cell(result_obj));
}
