//! Loop evaluation
//!
//! A loop opens one scope that its body reuses on every iteration, and
//! pushes a [`LoopContext`]. `break` and `continue` mark the loop scope and
//! everything above it as skipped; `break` also flags the context so the
//! driver stops before the next iteration.

use crate::ast::{ForLoop, Node, NodeKind, Span, WhileLoop};
use crate::environment::{LoopContext, ScopeKind};
use crate::error::{ErrorKind, EvalError, Result};
use crate::value::{ObjectRef, Range, Value};

use super::place::Place;
use super::scope::{body_statements, declared_functions, eval_statements};
use super::{Evaluate, Evaluator};

/// What a `for` walks over, fixed at loop entry.
enum Iteration {
    Range(Range),
    Elements(Vec<ObjectRef>),
}

impl Evaluate for ForLoop {
    fn eval(&self, ev: &mut Evaluator, _span: Option<Span>) -> Result<ObjectRef> {
        let iterable = ev.eval_node(&self.iterable)?;
        let iteration = match &*iterable.read() {
            Value::Range(r) => Iteration::Range(*r),
            Value::Vector(elements) => Iteration::Elements(elements.clone()),
            other => {
                return Err(
                    EvalError::new(ErrorKind::TypeMismatch, self.iterable.span).suggest(
                        self.iterable.span,
                        format!("`{}` is not iterable", other.type_of()),
                    ),
                )
            }
        };

        let statements = body_statements(&self.body);
        let scope_index = ev
            .env
            .enter_scope(ScopeKind::Loop, declared_functions(statements));
        ev.env.push_loop(LoopContext::new(scope_index));

        // A bare name declares a fresh loop variable; anything else is an
        // lvalue resolved again on every iteration.
        let fresh = match &self.iterator.kind {
            NodeKind::Variable(ident) => {
                let (scope, index) = ev.env.declare(&ident.name);
                Some(Place::Variable { scope, index })
            }
            _ => None,
        };

        match iteration {
            Iteration::Range(range) => {
                for n in range.begin..range.end {
                    let item = ev.alloc(Value::Int(n));
                    if !iterate(ev, self, fresh.as_ref(), item, statements)? {
                        break;
                    }
                }
            }
            Iteration::Elements(elements) => {
                for element in elements {
                    let item = element.clone_in(&ev.heap);
                    if !iterate(ev, self, fresh.as_ref(), item, statements)? {
                        break;
                    }
                }
            }
        }

        finish_loop(ev)
    }
}

/// Bind the iterator and run the body once. Returns whether to go on.
fn iterate(
    ev: &mut Evaluator,
    for_loop: &ForLoop,
    fresh: Option<&Place>,
    item: ObjectRef,
    statements: &[Node],
) -> Result<bool> {
    if is_broken(ev) {
        return Ok(false);
    }
    ev.check_interrupt(for_loop.body.span)?;

    let place = match fresh {
        Some(place) => place.clone(),
        None => ev.eval_place(&for_loop.iterator)?,
    };
    ev.store(&place, item, for_loop.iterator.span)?;

    eval_statements(ev, statements)?;
    Ok(!is_broken(ev))
}

impl Evaluate for WhileLoop {
    fn eval(&self, ev: &mut Evaluator, _span: Option<Span>) -> Result<ObjectRef> {
        let statements = body_statements(&self.body);
        let scope_index = ev
            .env
            .enter_scope(ScopeKind::Loop, declared_functions(statements));
        ev.env.push_loop(LoopContext::new(scope_index));

        while !is_broken(ev) {
            ev.check_interrupt(self.body.span)?;
            let cond = ev.eval_node(&self.cond)?;
            if !ev.expect_bool(&cond, self.cond.span, "condition must be boolean")? {
                break;
            }
            eval_statements(ev, statements)?;
        }

        finish_loop(ev)
    }
}

fn is_broken(ev: &Evaluator) -> bool {
    ev.env.current_loop().map_or(true, |l| l.is_breaked)
}

/// Pop the loop context and scope; the loop's value is its break value.
fn finish_loop(ev: &mut Evaluator) -> Result<ObjectRef> {
    let context = ev.env.pop_loop();
    ev.env.leave_scope();

    Ok(match context.and_then(|c| c.result) {
        Some(result) => result,
        None => ev.none(),
    })
}

/// `break [value]`
pub fn eval_break(ev: &mut Evaluator, value: Option<&Node>, span: Option<Span>) -> Result<ObjectRef> {
    if ev.env.current_loop().is_none() {
        return Err(not_in_loop("break", span));
    }

    let result = match value {
        Some(node) => Some(ev.eval_node(node)?),
        None => None,
    };

    let scope_index = match ev.env.current_loop_mut() {
        Some(context) => {
            context.is_breaked = true;
            context.result = result;
            context.scope_index
        }
        None => return Err(not_in_loop("break", span)),
    };
    ev.env.skip_from(scope_index);

    Ok(ev.none())
}

/// `continue`
pub fn eval_continue(ev: &mut Evaluator, span: Option<Span>) -> Result<ObjectRef> {
    let scope_index = ev
        .env
        .current_loop()
        .map(|context| context.scope_index)
        .ok_or_else(|| not_in_loop("continue", span))?;
    ev.env.skip_from(scope_index);

    Ok(ev.none())
}

fn not_in_loop(what: &str, span: Option<Span>) -> EvalError {
    EvalError::new(ErrorKind::HereIsNotInsideOfLoop, span)
        .suggest(span, format!("`{}` outside of a loop", what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::context::GcConfig;
    use crate::EvalContext;

    fn evaluator() -> Evaluator {
        Evaluator::new(EvalContext::new().with_gc(GcConfig::default().with_background(false)))
    }

    #[test]
    fn test_for_over_non_iterable() {
        let mut ev = evaluator();
        let node = for_(var("i"), int(3), block(vec![]));
        let err = ev.eval(&node).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert_eq!(err.suggestions[0].message, "`int` is not iterable");
        assert_eq!(ev.env().depth(), 1);
    }

    #[test]
    fn test_break_outside_loop() {
        let mut ev = evaluator();
        let err = ev.eval(&break_(None)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::HereIsNotInsideOfLoop);
        let err = ev.eval(&continue_()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::HereIsNotInsideOfLoop);
    }

    #[test]
    fn test_for_over_empty_range() {
        let mut ev = evaluator();
        let node = for_(var("i"), range(int(3), int(0)), block(vec![int(1)]));
        assert_eq!(ev.eval(&node).unwrap(), Value::None);
    }

    #[test]
    fn test_while_counts() {
        let mut ev = evaluator();
        let program = block(vec![
            let_("n", int(0)),
            while_(
                lt(var("n"), int(5)),
                block(vec![assign(var("n"), add(var("n"), int(1)))]),
            ),
            var("n"),
        ]);
        assert_eq!(ev.eval(&program).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_while_condition_must_be_bool() {
        let mut ev = evaluator();
        let err = ev.eval(&while_(int(1), block(vec![]))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }
}
