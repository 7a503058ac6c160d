//! Literal, list, tuple and range evaluation

use crate::ast::{Literal, Node, RangeExpr, Span};
use crate::error::{ErrorKind, EvalError, Result};
use crate::value::{ObjectRef, Range, Value};

use super::{Evaluate, Evaluator};

impl Evaluate for Literal {
    fn eval(&self, ev: &mut Evaluator, _span: Option<Span>) -> Result<ObjectRef> {
        // Literals live in the tree as plain data; every evaluation builds a
        // fresh object.
        let value = match self {
            Literal::Int(n) => Value::Int(*n),
            Literal::Float(n) => Value::Float(*n),
            Literal::Char(c) => Value::Char(*c),
            Literal::String(s) => Value::string(s),
        };
        Ok(ev.alloc(value))
    }
}

fn eval_items(ev: &mut Evaluator, items: &[Node]) -> Result<Vec<ObjectRef>> {
    items.iter().map(|item| ev.eval_node(item)).collect()
}

/// `[a, b, ...]`
pub fn eval_list(ev: &mut Evaluator, items: &[Node]) -> Result<ObjectRef> {
    let elements = eval_items(ev, items)?;
    Ok(ev.alloc(Value::Vector(elements)))
}

/// `(a, b, ...)`
pub fn eval_tuple(ev: &mut Evaluator, items: &[Node]) -> Result<ObjectRef> {
    let elements = eval_items(ev, items)?;
    Ok(ev.alloc(Value::Tuple(elements)))
}

fn expect_int(object: &ObjectRef, node: &Node) -> Result<i64> {
    object.read().as_int().ok_or_else(|| {
        EvalError::new(ErrorKind::TypeMismatch, node.span).suggest(node.span, "expected integer")
    })
}

impl Evaluate for RangeExpr {
    fn eval(&self, ev: &mut Evaluator, _span: Option<Span>) -> Result<ObjectRef> {
        let begin = ev.eval_node(&self.begin)?;
        let end = ev.eval_node(&self.end)?;

        let begin = expect_int(&begin, &self.begin)?;
        let end = expect_int(&end, &self.end)?;

        Ok(ev.alloc(Value::Range(Range::new(begin, end))))
    }
}
