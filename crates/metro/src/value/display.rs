//! Display implementation for Value

use std::fmt;
use std::sync::Arc;

use super::*;

/// Render a float with six fractional digits, then drop trailing zeros
/// while keeping at least one digit after the point.
pub fn format_float(value: f32) -> String {
    let mut s = format!("{:.6}", value);

    if s.contains('.') {
        while s.ends_with('0') && !s.ends_with(".0") {
            s.pop();
        }
    }

    s
}

fn write_seq(
    f: &mut fmt::Formatter<'_>,
    open: char,
    items: &[ObjectRef],
    close: char,
) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => f.write_str(&format_float(*n)),
            Value::Char(c) => write!(f, "{}", c),
            Value::String(s) => {
                for c in s {
                    write!(f, "{}", c)?;
                }
                Ok(())
            }
            Value::Tuple(items) => write_seq(f, '(', items, ')'),
            Value::Vector(items) => write_seq(f, '[', items, ']'),
            Value::Range(r) => write!(f, "range({}, {})", r.begin, r.end),
            Value::Function(FunctionValue::User(decl)) => {
                write!(f, "<func 0x{:X}>", Arc::as_ptr(decl) as usize)
            }
            Value::Function(FunctionValue::Builtin(b)) => write!(f, "<builtin-func {}>", b.name),
        }
    }
}
