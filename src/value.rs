//! The VM's value representation and its coercion/comparison rules.

use crate::object::StringHandle;

/// A runtime value: a tagged union over the scalar primitives plus a handle
/// into the string arena.
///
/// `Value` is `Copy` — the `Object` variant holds a non-owning
/// [`StringHandle`], not the string's bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// A signed 64-bit integer.
    Int(i64),
    /// A 64-bit IEEE-754 double.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// The null value.
    Null,
    /// A handle to an interned string.
    Object(StringHandle),
}

impl Value {
    /// Coerce to `i64`: `Int` passes through, `Float` truncates toward zero,
    /// `Bool` is 0/1, `Null` is 0.
    ///
    /// Panics if called on `Object` — callers must check [`Value::is_integral`]
    /// or [`Value::is_numeric`] first, exactly as the source's `toInt` is only
    /// ever called on numeric-shaped values.
    pub fn to_int(self) -> i64 {
        match self {
            Value::Int(i) => i,
            Value::Float(f) => f as i64,
            Value::Bool(b) => b as i64,
            Value::Null => 0,
            Value::Object(_) => unreachable!("to_int called on a non-numeric value"),
        }
    }

    /// Coerce to `f64`: mirrors [`Value::to_int`] for the non-float variants.
    pub fn to_float(self) -> f64 {
        match self {
            Value::Int(i) => i as f64,
            Value::Float(f) => f,
            Value::Bool(b) => b as u8 as f64,
            Value::Null => 0.0,
            Value::Object(_) => unreachable!("to_float called on a non-numeric value"),
        }
    }

    /// True if this value participates in numeric coercion (`Int`, `Float`,
    /// `Bool`, `Null`).
    pub fn is_numeric(self) -> bool {
        self.is_integral() || matches!(self, Value::Float(_))
    }

    /// True if this value coerces to an integer without going through a
    /// float (`Int`, `Bool`, `Null`).
    pub fn is_integral(self) -> bool {
        matches!(self, Value::Int(_) | Value::Bool(_) | Value::Null)
    }

    /// True if this value is a string object.
    pub fn is_string(self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// The handle this value carries, if any.
    pub fn as_string_handle(self) -> Option<StringHandle> {
        match self {
            Value::Object(handle) => Some(handle),
            _ => None,
        }
    }

    /// Boolean projection used by conditional jumps and `OP_NOT`/`OP_AND`/`OP_OR`.
    pub fn truth(self, strings: &crate::object::StringArena) -> bool {
        match self {
            Value::Int(i) => i != 0,
            Value::Float(f) => f != 0.0,
            Value::Bool(b) => b,
            Value::Null => false,
            Value::Object(handle) => !strings.get(handle).is_empty(),
        }
    }

    /// Equality as defined by the source language: integral values compare
    /// as `i64`, any numeric pair involving a float compares as `f64`, `Null`
    /// equals `Null`, strings compare by content, and any other
    /// tag mismatch is `false`.
    pub fn equals(self, other: Value, strings: &crate::object::StringArena) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Object(a), Value::Object(b)) => strings.get(a) == strings.get(b),
            (a, b) if a.is_integral() && b.is_integral() => a.to_int() == b.to_int(),
            (a, b) if a.is_numeric() && b.is_numeric() => a.to_float() == b.to_float(),
            _ => false,
        }
    }

    /// Numeric projection used by ordering comparisons: `to_float` for
    /// numeric values, byte length for strings, `0.0` for anything else.
    ///
    /// The `0.0` fallback is intentional fidelity to the source's `asNumber`
    /// — ordering on non-numeric, non-string values is defined but not
    /// meaningful (see `SPEC_FULL.md` §9).
    pub fn as_number(self, strings: &crate::object::StringArena) -> f64 {
        if self.is_numeric() {
            self.to_float()
        } else if let Value::Object(handle) = self {
            strings.get(handle).len() as f64
        } else {
            0.0
        }
    }

    /// Ordering comparison via [`Value::as_number`].
    pub fn less_than(self, other: Value, strings: &crate::object::StringArena) -> bool {
        self.as_number(strings) < other.as_number(strings)
    }

    /// Ordering comparison via [`Value::as_number`].
    pub fn greater_than(self, other: Value, strings: &crate::object::StringArena) -> bool {
        self.as_number(strings) > other.as_number(strings)
    }

    /// Render this value the way `OP_PRINT`/string-coercion do: numerics with
    /// their shortest decimal form, `Bool` as `tru`/`fls`, `Null` as `nul`,
    /// strings verbatim.
    pub fn display(self, strings: &crate::object::StringArena) -> String {
        match self {
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format!("{f}"),
            Value::Bool(true) => "tru".to_string(),
            Value::Bool(false) => "fls".to_string(),
            Value::Null => "nul".to_string(),
            Value::Object(handle) => String::from_utf8_lossy(strings.get(handle)).into_owned(),
        }
    }
}
