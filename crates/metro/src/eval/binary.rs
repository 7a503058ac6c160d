//! Binary operation evaluation
//!
//! Operands are evaluated left to right, then type-adjusted: an int paired
//! with a float is promoted. After that both sides must share a kind,
//! except for string repetition (`int * string` either way).

use crate::ast::{BinaryExpr, BinaryOp, Span};
use crate::error::{ErrorKind, EvalError, Result};
use crate::gc::Heap;
use crate::types::TypeKind;
use crate::value::{ObjectRef, Value, MAX_SEQUENCE_LEN};

use super::{Evaluate, Evaluator};

impl Evaluate for BinaryExpr {
    fn eval(&self, ev: &mut Evaluator, span: Option<Span>) -> Result<ObjectRef> {
        // No short-circuit: logical operators see both operands evaluated.
        let lhs = ev.eval_node(&self.lhs)?;
        let rhs = ev.eval_node(&self.rhs)?;

        let value = compute(self.op, &lhs.read(), &rhs.read(), span, &ev.heap)?;
        Ok(ev.alloc(value))
    }
}

/// Apply `op` to two values.
///
/// # Errors
///
/// - `ValueOutOfRange` on integer overflow
/// - `DivisionByZero` for an integer or float-modulo zero divisor
/// - `MultiplyStringByNegative` for a negative repeat count
/// - `TypeMismatch` when a bit, shift or logical operator gets the wrong kind
/// - `InvalidOperator` for any other unsupported pairing
pub fn compute(
    op: BinaryOp,
    lhs: &Value,
    rhs: &Value,
    span: Option<Span>,
    heap: &Heap,
) -> Result<Value> {
    match (lhs, rhs) {
        // Type adjustment
        (Value::Int(a), Value::Float(b)) => eval_float(op, *a as f32, *b, span),
        (Value::Float(a), Value::Int(b)) => eval_float(op, *a, *b as f32, span),

        (Value::Int(a), Value::Int(b)) => eval_int(op, *a, *b, span),
        (Value::Float(a), Value::Float(b)) => eval_float(op, *a, *b, span),

        // String repetition
        (Value::String(s), Value::Int(n)) | (Value::Int(n), Value::String(s))
            if op == BinaryOp::Mul =>
        {
            repeat(s, *n, span)
        }

        (Value::String(a), Value::String(b)) => match op {
            BinaryOp::Add => {
                let mut out = Vec::with_capacity(a.len() + b.len());
                out.extend_from_slice(a);
                out.extend_from_slice(b);
                Ok(Value::String(out))
            }
            _ => Err(unsupported(op, TypeKind::String, span)),
        },

        (Value::Vector(a), Value::Vector(b)) => match op {
            BinaryOp::Add => Ok(Value::Vector(
                a.iter().chain(b.iter()).map(|x| x.clone_in(heap)).collect(),
            )),
            _ => Err(unsupported(op, TypeKind::Vector, span)),
        },

        (Value::Bool(a), Value::Bool(b)) => match op {
            BinaryOp::LogAnd => Ok(Value::Bool(*a && *b)),
            BinaryOp::LogOr => Ok(Value::Bool(*a || *b)),
            _ => Err(unsupported(op, TypeKind::Bool, span)),
        },

        (l, r) if l.kind() != r.kind() => Err(EvalError::new(ErrorKind::InvalidOperator, span)
            .suggest(
                span,
                format!(
                    "no `{}` between `{}` and `{}`",
                    op.symbol(),
                    l.kind(),
                    r.kind()
                ),
            )),

        (l, _) => Err(unsupported(op, l.kind(), span)),
    }
}

fn is_integral(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::LShift
            | BinaryOp::RShift
            | BinaryOp::BitAnd
            | BinaryOp::BitXor
            | BinaryOp::BitOr
    )
}

fn is_logical(op: BinaryOp) -> bool {
    matches!(op, BinaryOp::LogAnd | BinaryOp::LogOr)
}

/// Error for `op` applied to two values of `kind`.
fn unsupported(op: BinaryOp, kind: TypeKind, span: Option<Span>) -> EvalError {
    if is_integral(op) {
        EvalError::new(ErrorKind::TypeMismatch, span)
            .suggest(span, format!("`{}` needs `int`, found `{}`", op.symbol(), kind))
    } else if is_logical(op) {
        EvalError::new(ErrorKind::TypeMismatch, span)
            .suggest(span, format!("`{}` needs `bool`, found `{}`", op.symbol(), kind))
    } else {
        EvalError::new(ErrorKind::InvalidOperator, span)
            .suggest(span, format!("`{}` is not defined for `{}`", op.symbol(), kind))
    }
}

fn overflow(span: Option<Span>) -> EvalError {
    EvalError::new(ErrorKind::ValueOutOfRange, span)
}

// ═══════════════════════════════════════════════════════════════════════
// Integer Operations
// ═══════════════════════════════════════════════════════════════════════

fn eval_int(op: BinaryOp, a: i64, b: i64, span: Option<Span>) -> Result<Value> {
    let n = match op {
        BinaryOp::Add => a.checked_add(b).ok_or_else(|| overflow(span))?,
        BinaryOp::Sub => a.checked_sub(b).ok_or_else(|| overflow(span))?,
        BinaryOp::Mul => a.checked_mul(b).ok_or_else(|| overflow(span))?,

        BinaryOp::Div | BinaryOp::Mod if b == 0 => {
            return Err(EvalError::new(ErrorKind::DivisionByZero, span))
        }
        BinaryOp::Div => a.checked_div(b).ok_or_else(|| overflow(span))?,
        BinaryOp::Mod => a.checked_rem(b).ok_or_else(|| overflow(span))?,

        BinaryOp::LShift | BinaryOp::RShift => {
            let shift = u32::try_from(b)
                .ok()
                .filter(|&s| s < i64::BITS)
                .ok_or_else(|| {
                    overflow(span).suggest(span, format!("shift by {} is outside 0..64", b))
                })?;
            if op == BinaryOp::LShift {
                a << shift
            } else {
                a >> shift
            }
        }

        BinaryOp::BitAnd => a & b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::BitOr => a | b,

        BinaryOp::LogAnd | BinaryOp::LogOr => return Err(unsupported(op, TypeKind::Int, span)),
    };

    Ok(Value::Int(n))
}

// ═══════════════════════════════════════════════════════════════════════
// Float Operations
// ═══════════════════════════════════════════════════════════════════════

fn eval_float(op: BinaryOp, a: f32, b: f32, span: Option<Span>) -> Result<Value> {
    let n = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => float_mod(a, b, span)?,
        _ => return Err(unsupported(op, TypeKind::Float, span)),
    };

    Ok(Value::Float(n))
}

/// Modulo by repeated subtraction. A negative dividend is returned as is.
fn float_mod(mut a: f32, b: f32, span: Option<Span>) -> Result<f32> {
    if b == 0.0 {
        return Err(EvalError::new(ErrorKind::DivisionByZero, span));
    }

    if b < 0.0 || !b.is_finite() || !a.is_finite() {
        return Err(overflow(span).suggest(span, "float modulo needs a finite positive divisor"));
    }

    while a >= b {
        let next = a - b;
        if next == a {
            return Err(overflow(span).suggest(span, "float modulo cannot make progress"));
        }
        a = next;
    }

    Ok(a)
}

// ═══════════════════════════════════════════════════════════════════════
// String Repetition
// ═══════════════════════════════════════════════════════════════════════

fn repeat(s: &[char], count: i64, span: Option<Span>) -> Result<Value> {
    let count = usize::try_from(count).map_err(|_| {
        EvalError::new(ErrorKind::MultiplyStringByNegative, span)
            .suggest(span, format!("repeat count is {}", count))
    })?;

    s.len()
        .checked_mul(count)
        .filter(|&n| n <= MAX_SEQUENCE_LEN)
        .ok_or_else(|| {
            overflow(span).suggest(
                span,
                format!("repeated string would exceed {} chars", MAX_SEQUENCE_LEN),
            )
        })?;
    Ok(Value::String(s.repeat(count)))
}
