//=====================================================
// File: value.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Dynamic HyperTalk value model
// Objective: Represent every runtime datum as canonical text with lazily
//            computed numeric and boolean interpretations, plus the arithmetic,
//            comparison, and logical operators defined over them
//=====================================================

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::interpreter::errors::{HtError, HtResult};

//=====================================================
// Section 1.0 - Representation
//=====================================================

/// Numeric interpretation of a value's text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Integer(i64),
    Real(f64),
}

impl Numeric {
    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Integer(n) => n as f64,
            Numeric::Real(r) => r,
        }
    }

    fn as_integer(self) -> Option<i64> {
        match self {
            Numeric::Integer(n) => Some(n),
            Numeric::Real(r) if r.fract() == 0.0 && r.abs() < 9.2e18 => Some(r as i64),
            Numeric::Real(_) => None,
        }
    }
}

/// How a value came to exist. Informational only: identity is always the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Number,
    Boolean,
    List,
}

/// An immutable HyperTalk value. "Changing" a variable or property always
/// binds a new `Value`; nothing mutates one in place.
#[derive(Clone)]
pub struct Value {
    text: String,
    kind: ValueKind,
    quoted: bool,
    numeric: OnceCell<Option<Numeric>>,
}

impl Value {
    /// The empty value.
    pub fn empty() -> Self {
        Self::text("")
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ValueKind::Text,
            quoted: false,
            numeric: OnceCell::new(),
        }
    }

    /// A string literal that appeared in quotes in the source. Never treated
    /// as an ordinal when it names a part, even if it looks numeric.
    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            quoted: true,
            ..Self::text(text)
        }
    }

    pub fn integer(n: i64) -> Self {
        Self::from_numeric(Numeric::Integer(n))
    }

    pub fn real(r: f64) -> Self {
        Self::from_numeric(Numeric::Real(r))
    }

    pub fn boolean(b: bool) -> Self {
        Self {
            text: if b { "true" } else { "false" }.to_string(),
            kind: ValueKind::Boolean,
            quoted: false,
            numeric: OnceCell::with_value(None),
        }
    }

    /// Joins `items` with the default item delimiter.
    pub fn of_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self::joined(items, ",")
    }

    pub fn of_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self::joined(lines, "\n")
    }

    fn joined<I>(items: I, delimiter: &str) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let parts: Vec<String> = items.into_iter().map(|value| value.text).collect();
        Self {
            text: parts.join(delimiter),
            kind: ValueKind::List,
            quoted: false,
            numeric: OnceCell::new(),
        }
    }

    fn from_numeric(numeric: Numeric) -> Self {
        Self {
            text: format_numeric(numeric),
            kind: ValueKind::Number,
            quoted: false,
            numeric: OnceCell::with_value(Some(numeric)),
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_quoted_literal(&self) -> bool {
        self.quoted
    }

    //=====================================================
    // Section 2.0 - Coercions
    //=====================================================

    /// Parsed once and cached; the same text always yields the same answer.
    pub fn numeric(&self) -> Option<Numeric> {
        *self.numeric.get_or_init(|| parse_numeric(&self.text))
    }

    pub fn is_number(&self) -> bool {
        self.numeric().is_some()
    }

    pub fn is_integer(&self) -> bool {
        self.numeric().and_then(Numeric::as_integer).is_some()
    }

    pub fn is_boolean(&self) -> bool {
        parse_boolean(&self.text).is_some()
    }

    pub fn integer_value(&self) -> HtResult<i64> {
        self.numeric()
            .and_then(Numeric::as_integer)
            .ok_or_else(|| HtError::semantic(format!("Expected integer here but found \"{}\".", self.text)))
    }

    pub fn real_value(&self) -> HtResult<f64> {
        self.numeric()
            .map(Numeric::as_f64)
            .ok_or_else(|| HtError::semantic(format!("Expected number here but found \"{}\".", self.text)))
    }

    pub fn boolean_value(&self) -> HtResult<bool> {
        parse_boolean(&self.text).ok_or_else(|| {
            HtError::semantic(format!("Expected true or false here but found \"{}\".", self.text))
        })
    }

    pub fn string_value(&self) -> String {
        self.text.clone()
    }

    /// The value split on `delimiter`. A trailing delimiter does not start a
    /// new empty item.
    pub fn items(&self, delimiter: &str) -> Vec<Value> {
        split_list(&self.text, delimiter)
            .into_iter()
            .map(Value::text)
            .collect()
    }

    pub fn lines(&self) -> Vec<Value> {
        self.items("\n")
    }

    pub fn words(&self) -> Vec<Value> {
        self.text.split_whitespace().map(Value::text).collect()
    }

    //=====================================================
    // Section 3.0 - Arithmetic
    //=====================================================

    pub fn add(&self, other: &Value) -> HtResult<Value> {
        arithmetic("add", self, other, i64::checked_add, |a, b| a + b)
    }

    pub fn subtract(&self, other: &Value) -> HtResult<Value> {
        arithmetic("subtract", self, other, i64::checked_sub, |a, b| a - b)
    }

    pub fn multiply(&self, other: &Value) -> HtResult<Value> {
        arithmetic("multiply", self, other, i64::checked_mul, |a, b| a * b)
    }

    pub fn divide(&self, other: &Value) -> HtResult<Value> {
        let (lhs, rhs) = operands("divide", self, other)?;
        if rhs.as_f64() == 0.0 {
            return Err(HtError::semantic("Can't divide by zero."));
        }
        if let (Numeric::Integer(a), Numeric::Integer(b)) = (lhs, rhs) {
            if a.checked_rem(b) == Some(0) {
                if let Some(quotient) = a.checked_div(b) {
                    return Ok(Value::integer(quotient));
                }
            }
        }
        finite("divide", lhs.as_f64() / rhs.as_f64())
    }

    /// Integer division (`div`), truncating toward zero.
    pub fn div(&self, other: &Value) -> HtResult<Value> {
        let (lhs, rhs) = operands("div", self, other)?;
        if rhs.as_f64() == 0.0 {
            return Err(HtError::semantic("Can't divide by zero."));
        }
        if let (Numeric::Integer(a), Numeric::Integer(b)) = (lhs, rhs) {
            if let Some(quotient) = a.checked_div(b) {
                return Ok(Value::integer(quotient));
            }
        }
        finite("div", (lhs.as_f64() / rhs.as_f64()).trunc())
    }

    pub fn modulo(&self, other: &Value) -> HtResult<Value> {
        let (lhs, rhs) = operands("mod", self, other)?;
        if rhs.as_f64() == 0.0 {
            return Err(HtError::semantic("Can't divide by zero."));
        }
        if let (Numeric::Integer(a), Numeric::Integer(b)) = (lhs, rhs) {
            if let Some(remainder) = a.checked_rem(b) {
                return Ok(Value::integer(remainder));
            }
        }
        finite("mod", lhs.as_f64() % rhs.as_f64())
    }

    pub fn power(&self, other: &Value) -> HtResult<Value> {
        let (lhs, rhs) = operands("^", self, other)?;
        finite("^", lhs.as_f64().powf(rhs.as_f64()))
    }

    pub fn negate(&self) -> HtResult<Value> {
        match arithmetic_operand("negate", "", self)? {
            Numeric::Integer(n) => Ok(n
                .checked_neg()
                .map(Value::integer)
                .unwrap_or_else(|| Value::real(-(n as f64)))),
            Numeric::Real(r) => Ok(Value::real(-r)),
        }
    }

    //=====================================================
    // Section 4.0 - Comparison & Logic
    //=====================================================

    pub fn equals(&self, other: &Value) -> Value {
        Value::boolean(self.compare(other) == Ordering::Equal)
    }

    pub fn not_equals(&self, other: &Value) -> Value {
        Value::boolean(self.compare(other) != Ordering::Equal)
    }

    pub fn greater_than(&self, other: &Value) -> Value {
        Value::boolean(self.compare(other) == Ordering::Greater)
    }

    pub fn greater_than_or_equal(&self, other: &Value) -> Value {
        Value::boolean(self.compare(other) != Ordering::Less)
    }

    pub fn less_than(&self, other: &Value) -> Value {
        Value::boolean(self.compare(other) == Ordering::Less)
    }

    pub fn less_than_or_equal(&self, other: &Value) -> Value {
        Value::boolean(self.compare(other) != Ordering::Greater)
    }

    /// Numeric when both sides are numbers, otherwise case-insensitive text.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(Numeric::Integer(a)), Some(Numeric::Integer(b))) => a.cmp(&b),
            (Some(a), Some(b)) => a
                .as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(Ordering::Equal),
            _ => self.text.to_lowercase().cmp(&other.text.to_lowercase()),
        }
    }

    pub fn contains(&self, other: &Value) -> Value {
        Value::boolean(
            self.text
                .to_lowercase()
                .contains(&other.text.to_lowercase()),
        )
    }

    pub fn is_in(&self, other: &Value) -> Value {
        other.contains(self)
    }

    pub fn not(&self) -> HtResult<Value> {
        Ok(Value::boolean(!self.boolean_value()?))
    }

    pub fn and(&self, other: &Value) -> HtResult<Value> {
        Ok(Value::boolean(self.boolean_value()? && other.boolean_value()?))
    }

    pub fn or(&self, other: &Value) -> HtResult<Value> {
        Ok(Value::boolean(self.boolean_value()? || other.boolean_value()?))
    }

    pub fn concat(&self, other: &Value) -> Value {
        Value::text(format!("{}{}", self.text, other.text))
    }

    pub fn concat_spaced(&self, other: &Value) -> Value {
        Value::text(format!("{} {}", self.text, other.text))
    }
}

//=====================================================
// Section 5.0 - Helpers
//=====================================================

fn parse_numeric(text: &str) -> Option<Numeric> {
    let trimmed = text.trim();
    if trimmed.is_empty()
        || !trimmed.bytes().any(|b| b.is_ascii_digit())
        || !trimmed
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(Numeric::Integer(n));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite())
        .map(Numeric::Real)
}

fn parse_boolean(text: &str) -> Option<bool> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Integral reals print without a fractional part; other reals use the
/// shortest text that parses back to the same `f64`.
fn format_numeric(numeric: Numeric) -> String {
    match numeric {
        Numeric::Integer(n) => n.to_string(),
        Numeric::Real(r) if r == 0.0 => "0".to_string(),
        Numeric::Real(r) if r.fract() == 0.0 && r.abs() < 1e15 => (r as i64).to_string(),
        Numeric::Real(r) => r.to_string(),
    }
}

pub(crate) fn split_list(text: &str, delimiter: &str) -> Vec<String> {
    if text.is_empty() || delimiter.is_empty() {
        return if text.is_empty() {
            Vec::new()
        } else {
            vec![text.to_string()]
        };
    }
    let body = text.strip_suffix(delimiter).unwrap_or(text);
    body.split(delimiter).map(str::to_string).collect()
}

/// Arithmetic treats the empty value as zero.
fn arithmetic_operand(op: &str, side: &str, value: &Value) -> HtResult<Numeric> {
    if value.text.trim().is_empty() {
        return Ok(Numeric::Integer(0));
    }
    value.numeric().ok_or_else(|| {
        let position = if side.is_empty() {
            String::new()
        } else {
            format!(" {side}")
        };
        HtError::semantic(format!(
            "Expected a number as the{position} operand of \"{op}\" but found \"{}\".",
            value.text
        ))
    })
}

fn operands(op: &str, lhs: &Value, rhs: &Value) -> HtResult<(Numeric, Numeric)> {
    Ok((
        arithmetic_operand(op, "left", lhs)?,
        arithmetic_operand(op, "right", rhs)?,
    ))
}

fn arithmetic(
    op: &str,
    lhs: &Value,
    rhs: &Value,
    integer_op: fn(i64, i64) -> Option<i64>,
    real_op: fn(f64, f64) -> f64,
) -> HtResult<Value> {
    let (a, b) = operands(op, lhs, rhs)?;
    if let (Numeric::Integer(x), Numeric::Integer(y)) = (a, b) {
        if let Some(result) = integer_op(x, y) {
            return Ok(Value::integer(result));
        }
    }
    finite(op, real_op(a.as_f64(), b.as_f64()))
}

fn finite(op: &str, result: f64) -> HtResult<Value> {
    if result.is_finite() {
        Ok(Value::real(result))
    } else {
        Err(HtError::semantic(format!(
            "The result of \"{op}\" is too large to represent."
        )))
    }
}

//=====================================================
// Section 6.0 - Trait Implementations
//=====================================================

impl Default for Value {
    fn default() -> Self {
        Value::empty()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "Value(\"{}\" quoted)", self.text)
        } else {
            write!(f, "Value({:?})", self.text)
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::text(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::integer(i64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        i64::try_from(value)
            .map(Value::integer)
            .unwrap_or_else(|_| Value::real(value as f64))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::boolean(value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Value::text)
    }
}

//=====================================================
// Section 7.0 - Tests
//=====================================================


//=====================================================
// End of file
//=====================================================
