//! Type-tag coercions applied to raw values.

use bind_primitives::Value;

// Largest integer an f64 holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Coerces a raw value to a number.
///
/// Strings are trimmed; a blank string is `0`. Decimal, exponent and
/// `0x`/`0o`/`0b` integer forms are accepted. Booleans map to `1`/`0`.
/// Returns `None` when the value is not numeric or not finite. Integral
/// results are stored as integers.
#[must_use]
pub fn to_number(raw: &Value) -> Option<Value> {
    let number = match raw {
        Value::Number(n) => return Some(Value::Number(n.clone())),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => parse_number(s)?,
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    number_value(number)
}

/// Coerces a raw value to a boolean.
///
/// `false`, `0`, `null` and strings trimming to `""`, `"0"` or `"false"` are
/// false; everything else is true.
#[must_use]
pub fn to_boolean(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !matches!(s.trim(), "" | "0" | "false"),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }

    if let Some(radix_value) = parse_prefixed(text) {
        return radix_value;
    }

    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    text.parse::<f64>().ok()
}

// `Some(None)` means a recognised prefix with invalid digits. Literals wider
// than 53 bits round to the nearest float.
#[allow(clippy::option_option)]
fn parse_prefixed(text: &str) -> Option<Option<f64>> {
    let (radix, digits) = match text.get(..2)? {
        "0x" | "0X" => (16, &text[2..]),
        "0o" | "0O" => (8, &text[2..]),
        "0b" | "0B" => (2, &text[2..]),
        _ => return None,
    };
    if digits.is_empty() {
        return Some(None);
    }
    Some(digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix)
            .map(|digit| acc * f64::from(radix) + f64::from(digit))
    }))
}

#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
fn number_value(number: f64) -> Option<Value> {
    if !number.is_finite() {
        return None;
    }
    if number.trunc() == number && number.abs() <= MAX_SAFE_INTEGER {
        return Some(Value::from(number as i64));
    }
    serde_json::Number::from_f64(number).map(Value::Number)
}
