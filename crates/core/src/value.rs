use std::fmt;

use crate::errors::{BasicError, BasicResult};

/// Epsilon used for `=`/`<>` comparison and FOR/NEXT limit tests on doubles.
pub const EPSILON: f64 = 1e-9;

/// A BASIC runtime value: either a double-precision number or a string.
///
/// There is no separate boolean case — comparisons and logical operators
/// produce `Number(-1.0)` for true and `Number(0.0)` for false, per classic
/// Microsoft BASIC.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Value {
    pub fn is_string(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// `AsNumber`: parses text with invariant, period-decimal conventions.
    /// Unparseable text yields 0, not an error — BASIC never raises on this
    /// coercion.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Text(s) => parse_leading_number(s).unwrap_or(0.0),
        }
    }

    /// `AsString`: culture-invariant decimal, up to 15 fractional digits,
    /// trailing zeros trimmed. Used for string concatenation and `STR$`-like
    /// coercions (not `PRINT` formatting — see [`Value::to_print_string`]).
    pub fn as_string(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_number_plain(*n),
        }
    }

    /// `AsInt32`: rounds half-away-from-zero.
    pub fn as_int32(&self) -> i32 {
        let n = self.as_number();
        n.round() as i32
    }

    /// Text the `PRINT`/`PRINT #` formatter emits for this value: numbers
    /// use up to 12 significant digits, switching to scientific notation
    /// for magnitudes `>= 1e10` or `(0, 1e-3)`.
    pub fn to_print_string(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_number_print(*n),
        }
    }

    pub fn negate(&self) -> Value {
        Value::Number(-self.as_number())
    }

    /// `+`: string concatenation if either side is text, else numeric add.
    pub fn add(&self, other: &Value) -> Value {
        if self.is_string() || other.is_string() {
            Value::Text(format!("{}{}", self.as_string(), other.as_string()))
        } else {
            Value::Number(self.as_number() + other.as_number())
        }
    }

    pub fn sub(&self, other: &Value) -> Value {
        Value::Number(self.as_number() - other.as_number())
    }

    pub fn mul(&self, other: &Value) -> Value {
        Value::Number(self.as_number() * other.as_number())
    }

    pub fn div(&self, other: &Value, line: usize) -> BasicResult<Value> {
        let divisor = other.as_number();
        if divisor == 0.0 {
            return Err(BasicError::runtime("Division by zero", line));
        }
        Ok(Value::Number(self.as_number() / divisor))
    }

    pub fn pow(&self, other: &Value) -> Value {
        Value::Number(self.as_number().powf(other.as_number()))
    }

    pub fn compare(&self, other: &Value, op: CompareOp) -> Value {
        let truth = if self.is_string() || other.is_string() {
            let (a, b) = (self.as_string(), other.as_string());
            match op {
                CompareOp::Eq => a == b,
                CompareOp::Ne => a != b,
                CompareOp::Lt => a < b,
                CompareOp::Le => a <= b,
                CompareOp::Gt => a > b,
                CompareOp::Ge => a >= b,
            }
        } else {
            let (a, b) = (self.as_number(), other.as_number());
            match op {
                CompareOp::Eq => (a - b).abs() < EPSILON,
                CompareOp::Ne => (a - b).abs() >= EPSILON,
                CompareOp::Lt => a < b,
                CompareOp::Le => a <= b,
                CompareOp::Gt => a > b,
                CompareOp::Ge => a >= b,
            }
        };
        Value::from_bool(truth)
    }

    /// Logical/bitwise ops operate on 32-bit integer truncations, classic
    /// BASIC style: true is the all-ones pattern `-1`.
    pub fn logical_and(&self, other: &Value) -> Value {
        Value::Number((self.as_int32() & other.as_int32()) as f64)
    }

    pub fn logical_or(&self, other: &Value) -> Value {
        Value::Number((self.as_int32() | other.as_int32()) as f64)
    }

    pub fn logical_not(&self) -> Value {
        Value::Number((!self.as_int32()) as f64)
    }

    pub fn from_bool(b: bool) -> Value {
        Value::Number(if b { -1.0 } else { 0.0 })
    }

    pub fn is_truthy(&self) -> bool {
        self.as_number() != 0.0
    }

    /// The zero value for a variable of this sigil (`true` = string sigil).
    pub fn default_for(is_string: bool) -> Value {
        if is_string {
            Value::Text(String::new())
        } else {
            Value::Number(0.0)
        }
    }

    /// Coerces `self` to match the sigil of the target it is being stored
    /// into. Numeric targets coerce text via `AsNumber`; string targets
    /// coerce numbers via `AsString`.
    pub fn coerce_to(&self, is_string_target: bool) -> Value {
        match (self, is_string_target) {
            (Value::Text(_), true) | (Value::Number(_), false) => self.clone(),
            (Value::Number(_), true) => Value::Text(self.as_string()),
            (Value::Text(_), false) => Value::Number(self.as_number()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_print_string())
    }
}

/// Parses the longest numeric prefix of `s` (optional sign, digits,
/// decimal point, `E`/`D` exponent), matching classic `VAL`/`AsNumber`
/// semantics: stops at the first character that cannot extend the number
/// rather than failing outright.
fn parse_leading_number(s: &str) -> Option<f64> {
    let trimmed = s.trim_start();
    let bytes = trimmed.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i == digits_start || (i == digits_start + 1 && bytes[digits_start] == b'.') {
        return None;
    }
    let mantissa_end = i;
    if i < bytes.len() && matches!(bytes[i], b'E' | b'e' | b'D' | b'd') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_digits_start {
            i = j;
        }
    }
    if i == digits_start {
        return None;
    }
    let _ = mantissa_end;
    let normalized: String = trimmed[..i]
        .chars()
        .map(|c| if c == 'D' || c == 'd' { 'E' } else { c })
        .collect();
    normalized.parse::<f64>().ok()
}

fn format_number_plain(n: f64) -> String {
    if n.is_nan() {
        return "NAN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "INF".to_string() } else { "-INF".to_string() };
    }
    if n == n.trunc() && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    let s = format!("{:.15}", n);
    trim_trailing_zeros(&s)
}

fn trim_trailing_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    let trimmed = s.trim_end_matches('0');
    trimmed.trim_end_matches('.').to_string()
}

fn format_number_print(n: f64) -> String {
    if n.is_nan() {
        return "NAN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if abs >= 1e10 || abs < 1e-3 {
        format_scientific(n)
    } else if n == n.trunc() && abs < 1e12 {
        format!("{}", n as i64)
    } else {
        let s = format!("{:.12}", n);
        let trimmed = trim_trailing_zeros(&s);
        truncate_significant(&trimmed, 12)
    }
}

fn truncate_significant(s: &str, max_digits: usize) -> String {
    let digit_count = s.chars().filter(|c| c.is_ascii_digit()).count();
    if digit_count <= max_digits {
        return s.to_string();
    }
    let mut out = String::new();
    let mut digits = 0;
    for c in s.chars() {
        if digits >= max_digits && c.is_ascii_digit() {
            break;
        }
        if c.is_ascii_digit() {
            digits += 1;
        }
        out.push(c);
    }
    trim_trailing_zeros(&out)
}

fn format_scientific(n: f64) -> String {
    let exponent = n.abs().log10().floor() as i32;
    let mantissa = n / 10f64.powi(exponent);
    let mantissa_str = trim_trailing_zeros(&format!("{:.6}", mantissa));
    let sign = if exponent >= 0 { "+" } else { "-" };
    format!("{}E{}{:02}", mantissa_str, sign, exponent.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_number_parses_leading_digits() {
        assert_eq!(Value::Text("42".into()).as_number(), 42.0);
        assert_eq!(Value::Text("3.14abc".into()).as_number(), 3.14);
        assert_eq!(Value::Text("abc".into()).as_number(), 0.0);
        assert_eq!(Value::Text("".into()).as_number(), 0.0);
    }

    #[test]
    fn as_int32_rounds_half_away_from_zero() {
        assert_eq!(Value::Number(2.5).as_int32(), 3);
        assert_eq!(Value::Number(-2.5).as_int32(), -3);
        assert_eq!(Value::Number(2.4).as_int32(), 2);
    }

    #[test]
    fn add_concatenates_when_either_side_is_text() {
        let result = Value::Text("AB".into()).add(&Value::Number(5.0));
        assert_eq!(result, Value::Text("AB5".into()));
    }

    #[test]
    fn compare_numbers_uses_epsilon() {
        let a = Value::Number(0.1 + 0.2);
        let b = Value::Number(0.3);
        assert_eq!(a.compare(&b, CompareOp::Eq), Value::Number(-1.0));
    }

    #[test]
    fn compare_strings_is_lexicographic() {
        let a = Value::Text("APPLE".into());
        let b = Value::Text("BANANA".into());
        assert_eq!(a.compare(&b, CompareOp::Lt), Value::Number(-1.0));
    }

    #[test]
    fn print_string_switches_to_scientific_for_large_magnitudes() {
        let s = Value::Number(12_345_678_901.0).to_print_string();
        assert!(s.contains('E'), "expected scientific notation, got {s}");
    }

    #[test]
    fn print_string_keeps_small_integers_plain() {
        assert_eq!(Value::Number(15.0).to_print_string(), "15");
        assert_eq!(Value::Number(-3.0).to_print_string(), "-3");
    }

    #[test]
    fn logical_and_or_not_use_32_bit_bitwise_semantics() {
        assert_eq!(Value::Number(-1.0).logical_and(&Value::Number(-1.0)), Value::Number(-1.0));
        assert_eq!(Value::Number(0.0).logical_or(&Value::Number(-1.0)), Value::Number(-1.0));
        assert_eq!(Value::Number(0.0).logical_not(), Value::Number(-1.0));
    }
}
