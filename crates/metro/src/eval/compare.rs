//! Chained comparison evaluation
//!
//! `a < b < c` parses as `(a < b) < c`. The chain is flattened so that it
//! means `a < b && b < c`, with `b` evaluated once.

use std::cmp::Ordering;

use crate::ast::{CompareExpr, CompareOp, NodeKind, Span};
use crate::error::{ErrorKind, EvalError, Result};
use crate::value::{ObjectRef, Value};

use super::{Evaluate, Evaluator};

impl Evaluate for CompareExpr {
    fn eval(&self, ev: &mut Evaluator, span: Option<Span>) -> Result<ObjectRef> {
        let mut chain = vec![self];
        let mut leftmost = &*self.lhs;
        while let NodeKind::Compare(inner) = &leftmost.kind {
            chain.push(inner);
            leftmost = &*inner.lhs;
        }
        chain.reverse();

        let mut lhs = ev.eval_node(leftmost)?;

        for link in chain {
            let rhs = ev.eval_node(&link.rhs)?;
            let holds = compare(link.op, &lhs.read(), &rhs.read(), span)?;
            if !holds {
                return Ok(ev.alloc(Value::Bool(false)));
            }
            lhs = rhs;
        }

        Ok(ev.alloc(Value::Bool(true)))
    }
}

/// Compare two values after int/float adjustment.
///
/// # Errors
///
/// - `TypeMismatch` when the kinds differ
/// - `InvalidOperator` when ordering kinds that have no order
pub fn compare(op: CompareOp, lhs: &Value, rhs: &Value, span: Option<Span>) -> Result<bool> {
    let ordering = match (lhs, rhs) {
        (Value::Int(a), Value::Float(b)) => (*a as f32).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f32)),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),

        (l, r) if l.kind() != r.kind() => {
            return Err(EvalError::new(ErrorKind::TypeMismatch, span).suggest(
                span,
                format!("cannot compare `{}` with `{}`", l.kind(), r.kind()),
            ))
        }

        (l, r) => {
            return match op {
                CompareOp::Equal => Ok(l == r),
                CompareOp::NotEqual => Ok(l != r),
                _ => Err(EvalError::new(ErrorKind::InvalidOperator, span).suggest(
                    span,
                    format!("`{}` has no ordering", l.kind()),
                )),
            }
        }
    };

    // NaN compares false to everything, unequal included.
    let Some(ordering) = ordering else {
        return Ok(op == CompareOp::NotEqual);
    };

    Ok(match op {
        CompareOp::Bigger => ordering == Ordering::Greater,
        CompareOp::BiggerOrEqual => ordering != Ordering::Less,
        CompareOp::Less => ordering == Ordering::Less,
        CompareOp::LessOrEqual => ordering != Ordering::Greater,
        CompareOp::Equal => ordering == Ordering::Equal,
        CompareOp::NotEqual => ordering != Ordering::Equal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_numeric() {
        assert!(compare(CompareOp::Less, &Value::Int(1), &Value::Float(1.5), None).unwrap());
        assert!(compare(CompareOp::Equal, &Value::Float(2.0), &Value::Int(2), None).unwrap());
    }

    #[test]
    fn test_strings_and_chars_order() {
        assert!(compare(
            CompareOp::Less,
            &Value::string("abc"),
            &Value::string("abd"),
            None
        )
        .unwrap());
        assert!(compare(CompareOp::BiggerOrEqual, &Value::Char('b'), &Value::Char('b'), None)
            .unwrap());
    }

    #[test]
    fn test_kind_mismatch() {
        let err = compare(CompareOp::Equal, &Value::Int(1), &Value::string("1"), None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_equality_for_unordered_kinds() {
        assert!(compare(CompareOp::Equal, &Value::None, &Value::None, None).unwrap());
        assert!(compare(CompareOp::NotEqual, &Value::Bool(true), &Value::Bool(false), None).unwrap());
        let err = compare(CompareOp::Bigger, &Value::Bool(true), &Value::Bool(false), None)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidOperator);
    }

    #[test]
    fn test_nan() {
        let nan = Value::Float(f32::NAN);
        assert!(!compare(CompareOp::Equal, &nan, &nan, None).unwrap());
        assert!(compare(CompareOp::NotEqual, &nan, &nan, None).unwrap());
        assert!(!compare(CompareOp::Less, &nan, &Value::Float(1.0), None).unwrap());
    }
}
