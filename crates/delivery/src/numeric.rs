//! Float to exact-decimal conversion for validation

use serde_json::{Number, Value};

/// Walk the given document and rewrite every binary floating-point leaf into
/// its shortest exact decimal form (recursively over nested structures).
///
/// Precision-sensitive checks such as `multipleOf` then see the decimal value
/// the producer wrote rather than a binary approximation of it. Integer
/// leaves are left untouched.
pub fn float_to_decimal(value: Value) -> Value {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.is_finite() => {
                Value::Number(Number::from_string_unchecked(format!("{f}")))
            }
            _ => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(float_to_decimal).collect()),
        Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, child)| (key, float_to_decimal(child)))
                .collect(),
        ),
        other => other,
    }
}
