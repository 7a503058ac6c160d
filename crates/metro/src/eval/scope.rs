//! Block evaluation

use std::sync::Arc;

use crate::ast::{FunctionDecl, Node, NodeKind};
use crate::environment::ScopeKind;
use crate::error::Result;
use crate::value::ObjectRef;

use super::Evaluator;

/// Function declarations among a block's statements.
pub fn declared_functions(statements: &[Node]) -> Vec<Arc<FunctionDecl>> {
    statements
        .iter()
        .filter_map(|stmt| match &stmt.kind {
            NodeKind::Function(decl) => Some(decl.clone()),
            _ => None,
        })
        .collect()
}

/// Statements of a loop or function body. A bare expression body counts
/// as a single statement.
pub fn body_statements(body: &Node) -> &[Node] {
    match &body.kind {
        NodeKind::Scope(statements) => statements,
        _ => std::slice::from_ref(body),
    }
}

/// `{ statements... }` in a fresh block scope.
pub fn eval_block(ev: &mut Evaluator, statements: &[Node]) -> Result<ObjectRef> {
    if statements.is_empty() {
        return Ok(ev.none());
    }

    ev.env
        .enter_scope(ScopeKind::Block, declared_functions(statements));
    let result = eval_statements(ev, statements)?;
    ev.env.leave_scope();

    Ok(result)
}

/// Run statements in the innermost scope until one of them marks it
/// skipped. Yields the value of the last statement run.
pub fn eval_statements(ev: &mut Evaluator, statements: &[Node]) -> Result<ObjectRef> {
    let index = ev.env.current_index();
    if let Some(scope) = ev.env.scope_mut(index) {
        scope.is_skipped = false;
        scope.last_value = None;
    }

    for stmt in statements {
        let value = ev.eval_node(stmt)?;

        let Some(scope) = ev.env.scope_mut(index) else {
            break;
        };
        scope.last_value = Some(value);
        if scope.is_skipped {
            break;
        }
    }

    let last = ev
        .env
        .scope_mut(index)
        .and_then(|scope| scope.last_value.take());
    Ok(match last {
        Some(value) => value,
        None => ev.none(),
    })
}
