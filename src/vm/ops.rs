//! Arithmetic and comparison helpers factored out of the dispatch loop, one
//! free function per opcode family, mirroring how ALU-style ops are kept
//! separate from instruction decoding.

use crate::error::RuntimeError;
use crate::object::StringArena;
use crate::value::Value;

/// Numeric unary minus; `Bool`/`Null` negate as their `Int` coercion.
pub fn negate(value: Value) -> Result<Value, RuntimeError> {
    match value {
        Value::Float(f) => Ok(Value::Float(-f)),
        v if v.is_integral() => Ok(Value::Int(-v.to_int())),
        _ => Err(RuntimeError::type_error("operand to unary '-' must be numeric")),
    }
}

/// Logical negation of `truth(value)`.
pub fn not(value: Value, strings: &StringArena) -> Value {
    Value::Bool(!value.truth(strings))
}

/// Iterative factorial over an integral top-of-stack value.
pub fn factorial(value: Value) -> Result<Value, RuntimeError> {
    if !value.is_integral() {
        return Err(RuntimeError::type_error("operand to '!' must be an integer"));
    }
    let n = value.to_int();
    if n < 0 {
        return Err(RuntimeError::NegativeFactorial(n));
    }
    let mut product: i64 = 1;
    for i in 1..=n {
        product = product.wrapping_mul(i);
    }
    Ok(Value::Int(product))
}

/// `a + b`: numeric addition under the usual int/float coercion rule, or
/// string concatenation if either operand is a string (the non-string
/// operand is stringified first).
pub fn add(a: Value, b: Value, strings: &mut StringArena) -> Result<Value, RuntimeError> {
    if a.is_string() || b.is_string() {
        return Ok(concat(a, b, strings));
    }
    if a.is_numeric() && b.is_numeric() {
        return Ok(numeric_binary(a, b, |x, y| x + y, |x, y| x.wrapping_add(y)));
    }
    Err(RuntimeError::type_error("operands to '+' must be numeric or string"))
}

fn concat(a: Value, b: Value, strings: &mut StringArena) -> Value {
    let mut bytes = stringify_bytes(a, strings);
    bytes.extend(stringify_bytes(b, strings));
    Value::Object(strings.make_string(bytes))
}

fn stringify_bytes(value: Value, strings: &StringArena) -> Vec<u8> {
    match value {
        Value::Object(handle) => strings.get(handle).to_vec(),
        other => other.display(strings).into_bytes(),
    }
}

/// `a - b`.
pub fn sub(a: Value, b: Value) -> Result<Value, RuntimeError> {
    numeric(a, b, "-", |x, y| x - y, |x, y| x.wrapping_sub(y))
}

/// `a * b`, or string repetition when one operand is a string and the other
/// an integer.
pub fn mul(a: Value, b: Value, strings: &mut StringArena) -> Result<Value, RuntimeError> {
    match (a, b) {
        (Value::Object(handle), n) | (n, Value::Object(handle)) if n.is_integral() => {
            Ok(repeat(handle, n.to_int(), strings))
        }
        _ if a.is_numeric() && b.is_numeric() => {
            Ok(numeric_binary(a, b, |x, y| x * y, |x, y| x.wrapping_mul(y)))
        }
        _ => Err(RuntimeError::type_error("operands to '*' must be numeric, or string and int")),
    }
}

fn repeat(handle: crate::object::StringHandle, count: i64, strings: &mut StringArena) -> Value {
    if count <= 0 {
        return Value::Object(strings.make_string(Vec::new()));
    }
    let source = strings.get(handle).to_vec();
    let mut bytes = Vec::with_capacity(source.len() * count as usize);
    for _ in 0..count {
        bytes.extend_from_slice(&source);
    }
    Value::Object(strings.make_string(bytes))
}

/// `a / b`; errors on a zero divisor.
pub fn div(a: Value, b: Value) -> Result<Value, RuntimeError> {
    if !a.is_numeric() || !b.is_numeric() {
        return Err(RuntimeError::type_error("operands to '/' must be numeric"));
    }
    if both_integral(a, b) {
        let divisor = b.to_int();
        if divisor == 0 {
            return Err(RuntimeError::DivisionByZero);
        }
        Ok(Value::Int(a.to_int().wrapping_div(divisor)))
    } else {
        let divisor = b.to_float();
        if divisor == 0.0 {
            return Err(RuntimeError::DivisionByZero);
        }
        Ok(Value::Float(a.to_float() / divisor))
    }
}

/// `a % b`; errors on a zero divisor.
pub fn rem(a: Value, b: Value) -> Result<Value, RuntimeError> {
    if !a.is_numeric() || !b.is_numeric() {
        return Err(RuntimeError::type_error("operands to '%' must be numeric"));
    }
    if both_integral(a, b) {
        let divisor = b.to_int();
        if divisor == 0 {
            return Err(RuntimeError::DivisionByZero);
        }
        Ok(Value::Int(a.to_int().wrapping_rem(divisor)))
    } else {
        let divisor = b.to_float();
        if divisor == 0.0 {
            return Err(RuntimeError::DivisionByZero);
        }
        Ok(Value::Float(a.to_float() % divisor))
    }
}

/// `a ** b`; `0 ** 0` is undefined rather than `1`.
pub fn pow(a: Value, b: Value) -> Result<Value, RuntimeError> {
    if !a.is_numeric() || !b.is_numeric() {
        return Err(RuntimeError::type_error("operands to '**' must be numeric"));
    }
    if a.to_float() == 0.0 && b.to_float() == 0.0 {
        return Err(RuntimeError::ZeroToZero);
    }
    let result = a.to_float().powf(b.to_float());
    if both_integral(a, b) {
        Ok(Value::Int(result as i64))
    } else {
        Ok(Value::Float(result))
    }
}

fn both_integral(a: Value, b: Value) -> bool {
    a.is_integral() && b.is_integral()
}

fn numeric(
    a: Value,
    b: Value,
    symbol: &str,
    on_float: impl Fn(f64, f64) -> f64,
    on_int: impl Fn(i64, i64) -> i64,
) -> Result<Value, RuntimeError> {
    if !a.is_numeric() || !b.is_numeric() {
        return Err(RuntimeError::type_error(format!(
            "operands to '{symbol}' must be numeric"
        )));
    }
    Ok(numeric_binary(a, b, on_float, on_int))
}

fn numeric_binary(
    a: Value,
    b: Value,
    on_float: impl Fn(f64, f64) -> f64,
    on_int: impl Fn(i64, i64) -> i64,
) -> Value {
    if both_integral(a, b) {
        Value::Int(on_int(a.to_int(), b.to_int()))
    } else {
        Value::Float(on_float(a.to_float(), b.to_float()))
    }
}

/// Bounds-checked, negative-wrapping single-byte subscript of a string.
pub fn subscript(iterable: Value, index: Value, strings: &mut StringArena) -> Result<Value, RuntimeError> {
    let (Value::Object(handle), idx) = (iterable, index) else {
        return Err(RuntimeError::type_error("subscript target must be a string, index an int"));
    };
    if !idx.is_integral() {
        return Err(RuntimeError::type_error("subscript target must be a string, index an int"));
    }

    let bytes = strings.get(handle);
    let len = bytes.len() as i64;
    let mut i = idx.to_int();
    while i < 0 {
        i += len;
    }
    if i >= len {
        return Err(RuntimeError::IndexOutOfBounds);
    }
    Ok(Value::Object(strings.make_string(vec![bytes[i as usize]])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_int_when_both_integral() {
        let mut strings = StringArena::new();
        assert_eq!(
            add(Value::Int(1), Value::Bool(true), &mut strings).unwrap(),
            Value::Int(2)
        );
    }

    #[test]
    fn add_promotes_to_float_when_either_operand_is() {
        let mut strings = StringArena::new();
        assert_eq!(
            add(Value::Int(1), Value::Float(0.5), &mut strings).unwrap(),
            Value::Float(1.5)
        );
    }

    #[test]
    fn add_concatenates_strings_stringifying_the_other_operand() {
        let mut strings = StringArena::new();
        let hello = strings.make_string(b"n=".to_vec());
        let result = add(Value::Object(hello), Value::Int(5), &mut strings).unwrap();
        let Value::Object(handle) = result else { panic!("expected a string") };
        assert_eq!(strings.get(handle), b"n=5");
    }

    #[test]
    fn div_by_zero_errors() {
        assert_eq!(div(Value::Int(1), Value::Int(0)), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn pow_zero_to_zero_errors() {
        assert_eq!(pow(Value::Int(0), Value::Int(0)), Err(RuntimeError::ZeroToZero));
    }

    #[test]
    fn pow_of_two_integrals_with_a_negative_exponent_still_yields_int() {
        assert_eq!(pow(Value::Int(2), Value::Int(-1)).unwrap(), Value::Int(0));
    }

    #[test]
    fn factorial_of_negative_errors() {
        assert_eq!(factorial(Value::Int(-1)), Err(RuntimeError::NegativeFactorial(-1)));
    }

    #[test]
    fn factorial_of_five_is_120() {
        assert_eq!(factorial(Value::Int(5)).unwrap(), Value::Int(120));
    }

    #[test]
    fn string_multiplication_repeats_bytes() {
        let mut strings = StringArena::new();
        let handle = strings.make_string(b"ab".to_vec());
        let result = mul(Value::Object(handle), Value::Int(3), &mut strings).unwrap();
        let Value::Object(h) = result else { panic!("expected a string") };
        assert_eq!(strings.get(h), b"ababab");
    }

    #[test]
    fn string_multiplication_by_nonpositive_count_is_empty() {
        let mut strings = StringArena::new();
        let handle = strings.make_string(b"ab".to_vec());
        let result = mul(Value::Int(0), Value::Object(handle), &mut strings).unwrap();
        let Value::Object(h) = result else { panic!("expected a string") };
        assert_eq!(strings.get(h), b"");
    }

    #[test]
    fn subscript_wraps_negative_indices() {
        let mut strings = StringArena::new();
        let handle = strings.make_string(b"abc".to_vec());
        let result = subscript(Value::Object(handle), Value::Int(-1), &mut strings).unwrap();
        let Value::Object(h) = result else { panic!("expected a string") };
        assert_eq!(strings.get(h), b"c");
    }

    #[test]
    fn subscript_out_of_bounds_errors() {
        let mut strings = StringArena::new();
        let handle = strings.make_string(b"abc".to_vec());
        assert_eq!(
            subscript(Value::Object(handle), Value::Int(3), &mut strings),
            Err(RuntimeError::IndexOutOfBounds)
        );
    }
}
