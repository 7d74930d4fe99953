pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::OutputFormat;

/// Decimal places for printed amounts.
const DISPLAY_DP: u32 = 2;

/// Dispatch output to the appropriate formatter.
///
/// Decimal strings in the result are rounded to cents first; assumptions
/// and metadata are printed as computed.
pub fn format_output(format: &OutputFormat, value: &Value) {
    let value = round_for_display(value);
    match format {
        OutputFormat::Json => json::print_json(&value),
        OutputFormat::Table => table::print_table(&value),
        OutputFormat::Csv => csv_out::print_csv(&value),
        OutputFormat::Minimal => minimal::print_minimal(&value),
    }
}

fn round_for_display(value: &Value) -> Value {
    let mut value = value.clone();
    match &mut value {
        Value::Object(map) => {
            if let Some(result) = map.get_mut("result") {
                round_decimals(result);
            }
        }
        Value::Array(_) => round_decimals(&mut value),
        _ => {}
    }
    value
}

fn round_decimals(value: &mut Value) {
    match value {
        Value::String(s) => {
            if let Ok(d) = Decimal::from_str(s) {
                if d.scale() > DISPLAY_DP {
                    *s = d.round_dp(DISPLAY_DP).to_string();
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(round_decimals),
        Value::Object(map) => map.values_mut().for_each(round_decimals),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schedule_rows_rounded_to_cents() {
        let rows = json!([{
            "month": 1,
            "payment": "2937.4999608162209477024677335",
            "interest": "1500.00",
            "remaining_balance": "98562.5",
        }]);
        let out = round_for_display(&rows);
        assert_eq!(out[0]["payment"], "2937.50");
        assert_eq!(out[0]["interest"], "1500.00");
        assert_eq!(out[0]["remaining_balance"], "98562.5");
        assert_eq!(out[0]["month"], 1);
    }

    #[test]
    fn test_envelope_rounds_result_only() {
        let envelope = json!({
            "result": {
                "monthly_payment": "1141.4634253386",
                "risk": { "severity": "low", "risk_score": "12.345" },
                "tips": [{ "message": "Debt free in 36 months" }],
            },
            "assumptions": { "annual_rate_pct": "6.125" },
            "metadata": { "version": "0.1.0" },
        });
        let out = round_for_display(&envelope);
        assert_eq!(out["result"]["monthly_payment"], "1141.46");
        assert_eq!(out["result"]["risk"]["risk_score"], "12.34");
        assert_eq!(out["result"]["risk"]["severity"], "low");
        assert_eq!(out["result"]["tips"][0]["message"], "Debt free in 36 months");
        assert_eq!(out["assumptions"]["annual_rate_pct"], "6.125");
        assert_eq!(out["metadata"]["version"], "0.1.0");
    }
}
