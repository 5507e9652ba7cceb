// SPDX-License-Identifier: MIT

//! Canonical numeric `Value` construction shared by the parser (number
//! literals) and the evaluator (arithmetic results), so whole-valued
//! results print the same way JS numbers do (`1`, not `1.0`).

use serde_json::Value;

pub fn canonical_number(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        return Value::from(value as i64);
    }
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
