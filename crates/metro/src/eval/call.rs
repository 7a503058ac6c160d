//! Function call evaluation

use std::sync::Arc;

use crate::ast::{CallExpr, FunctionDecl, Node, NodeKind, Span};
use crate::environment::ScopeKind;
use crate::error::{ErrorKind, EvalError, Result};
use crate::value::{BuiltinFn, CallSite, FunctionValue, ObjectRef, Value};

use super::{Evaluate, Evaluator};

impl Evaluate for CallExpr {
    fn eval(&self, ev: &mut Evaluator, span: Option<Span>) -> Result<ObjectRef> {
        let functor = eval_functor(ev, &self.functor)?;

        let function = match &*functor.read() {
            Value::Function(f) => f.clone(),
            other => {
                return Err(EvalError::new(ErrorKind::TypeMismatch, self.functor.span).suggest(
                    self.functor.span,
                    format!("`{}` is not callable", other.type_of()),
                ))
            }
        };

        match function {
            FunctionValue::Builtin(builtin) => call_builtin(ev, &builtin, &self.args, span),
            FunctionValue::User(decl) => call_function(ev, &decl, &self.args, span),
        }
    }
}

/// A bare name that resolves to nothing is an unknown function, not an
/// unknown variable.
fn eval_functor(ev: &mut Evaluator, functor: &Node) -> Result<ObjectRef> {
    if let NodeKind::Variable(ident) = &functor.kind {
        let known = ev.builtins.contains(&ident.name)
            || ev.env.contains(&ident.name)
            || ev.env.find_function(&ident.name).is_some();
        if !known {
            return Err(EvalError::new(ErrorKind::UndefinedFunction, ident.span.or(functor.span))
                .suggest(functor.span, format!("no function named `{}`", ident.name)));
        }
    }

    ev.eval_node(functor)
}

/// Builtins see the caller's objects themselves, so `append(v, x)` can
/// grow `v` in place.
fn call_builtin(
    ev: &mut Evaluator,
    builtin: &BuiltinFn,
    args: &[Node],
    span: Option<Span>,
) -> Result<ObjectRef> {
    let args = args
        .iter()
        .map(|arg| ev.eval_ref(arg))
        .collect::<Result<Vec<_>>>()?;

    let mut site = CallSite {
        span,
        heap: &ev.heap,
        out: &mut *ev.output,
    };
    builtin.call(&mut site, &args)
}

/// Call a user-defined function.
///
/// # Errors
///
/// - `TooFewArguments` / `TooManyArguments` on an arity mismatch
/// - `StackOverflow` past the configured call depth
/// - anything the body raises
pub fn call_function(
    ev: &mut Evaluator,
    decl: &Arc<FunctionDecl>,
    args: &[Node],
    span: Option<Span>,
) -> Result<ObjectRef> {
    // Reads already produce copies.
    let mut args = args
        .iter()
        .map(|arg| ev.eval_node(arg))
        .collect::<Result<Vec<_>>>()?;

    let (fixed, rest) = match decl.params.split_last() {
        Some((last, fixed)) if last.variadic => (fixed, Some(last)),
        _ => (&decl.params[..], None),
    };

    if args.len() < fixed.len() {
        return Err(arity_error(ErrorKind::TooFewArguments, decl, fixed.len(), args.len(), span));
    }
    if args.len() > fixed.len() && rest.is_none() {
        return Err(arity_error(ErrorKind::TooManyArguments, decl, fixed.len(), args.len(), span));
    }

    ev.env.enter_scope(ScopeKind::Function, Vec::new());
    if let Err(e) = ev.env.push_frame(decl.clone(), span) {
        ev.env.leave_scope();
        return Err(e);
    }

    let extra = args.split_off(fixed.len());
    for (param, arg) in fixed.iter().zip(args) {
        ev.env.define(&param.name.name, arg);
    }
    if let Some(rest) = rest {
        let collected = ev.alloc(Value::Vector(extra));
        ev.env.define(&rest.name.name, collected);
    }

    let value = ev.eval_node(&decl.body)?;

    let frame = ev.env.pop_frame();
    ev.env.leave_scope();

    Ok(match frame {
        Some(frame) if frame.is_returned => match frame.result {
            Some(result) => result,
            None => ev.none(),
        },
        _ => value,
    })
}

fn arity_error(
    kind: ErrorKind,
    decl: &FunctionDecl,
    expected: usize,
    found: usize,
    span: Option<Span>,
) -> EvalError {
    EvalError::new(kind, span).suggest(
        decl.name.span.or(span),
        format!(
            "`{}` takes {} argument(s) but {} were given",
            decl.name.name, expected, found
        ),
    )
}
