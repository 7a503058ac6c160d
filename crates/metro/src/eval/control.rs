//! Conditionals, `return` and `@`
//!
//! Control flow never unwinds through `Err`. `return` records its value on
//! the call frame and marks every scope and loop of the running function as
//! finished; each of them then stops at its next check.

use crate::ast::{IfExpr, Node, Span};
use crate::error::{ErrorKind, EvalError, Result};
use crate::value::ObjectRef;

use super::{Evaluate, Evaluator};

impl Evaluate for IfExpr {
    fn eval(&self, ev: &mut Evaluator, _span: Option<Span>) -> Result<ObjectRef> {
        let cond = ev.eval_node(&self.cond)?;
        let taken = ev.expect_bool(&cond, self.cond.span, "condition must be boolean")?;

        if taken {
            ev.eval_node(&self.then_branch)
        } else if let Some(otherwise) = &self.else_branch {
            ev.eval_node(otherwise)
        } else {
            Ok(ev.none())
        }
    }
}

/// `return [value]`
pub fn eval_return(ev: &mut Evaluator, value: Option<&Node>, span: Option<Span>) -> Result<ObjectRef> {
    if ev.env.current_frame().is_none() {
        return Err(EvalError::new(ErrorKind::HereIsNotInsideOfFunc, span)
            .suggest(span, "`return` outside of a function"));
    }

    let result = match value {
        Some(node) => ev.eval_node(node)?,
        None => ev.none(),
    };

    let (scope_depth, loop_depth) = match ev.env.current_frame_mut() {
        Some(frame) => {
            frame.result = Some(result);
            frame.is_returned = true;
            (frame.scope_depth, frame.loop_depth)
        }
        None => return Err(EvalError::new(ErrorKind::HereIsNotInsideOfFunc, span)),
    };

    ev.env.skip_from(scope_depth);
    ev.env.break_loops_from(loop_depth);

    Ok(ev.none())
}

/// `@`: the function currently executing.
pub fn eval_self_func(ev: &mut Evaluator, span: Option<Span>) -> Result<ObjectRef> {
    let decl = ev
        .env
        .current_frame()
        .map(|frame| frame.func.clone())
        .ok_or_else(|| {
            EvalError::new(ErrorKind::HereIsNotInsideOfFunc, span)
                .suggest(span, "`@` outside of a function")
        })?;

    Ok(ev.function_object(&decl))
}
