//! Variables, subscripts and assignment
//!
//! An lvalue evaluates to a [`Place`]: a variable slot or a vector element
//! slot. Storing into a place replaces the handle held there; objects
//! themselves are never overwritten by assignment.

use crate::ast::{AssignExpr, Ident, LetStmt, Node, NodeKind, Span, SubscriptExpr};
use crate::error::{ErrorKind, EvalError, Result};
use crate::value::{FunctionValue, ObjectRef, Value};

use super::{Evaluate, Evaluator};

/// A storage location.
#[derive(Debug, Clone)]
pub enum Place {
    /// Variable slot at `(scope, index)` on the scope stack
    Variable {
        /// Scope stack index
        scope: usize,
        /// Slot index within the scope
        index: usize,
    },

    /// Element `index` of a vector object
    Element {
        /// The vector
        vector: ObjectRef,
        /// Element index, already bounds-checked
        index: usize,
    },
}

impl Evaluator {
    /// Resolve an lvalue.
    ///
    /// # Errors
    ///
    /// - `UndefinedVariable` for an undeclared name
    /// - `TypeMismatch` when subscripting a non-vector or with a non-int,
    ///   or when the node is not assignable
    /// - `SubscriptOutOfRange` for an index outside the vector
    pub fn eval_place(&mut self, node: &Node) -> Result<Place> {
        match &node.kind {
            NodeKind::Variable(ident) => {
                let (scope, index) = self.env.lookup(&ident.name).ok_or_else(|| {
                    EvalError::new(ErrorKind::UndefinedVariable, ident.span.or(node.span))
                        .suggest(node.span, format!("`{}` is not declared", ident.name))
                })?;
                Ok(Place::Variable { scope, index })
            }

            NodeKind::Subscript(expr) => {
                let vector = self.eval_ref(&expr.target)?;
                let index = self.eval_node(&expr.index)?;
                let index = subscript_index(&vector, &index, expr)?;
                Ok(Place::Element { vector, index })
            }

            other => Err(EvalError::new(ErrorKind::TypeMismatch, node.span)
                .suggest(node.span, format!("cannot assign to {}", other.name()))),
        }
    }

    /// The handle stored at `place`.
    pub fn load(&self, place: &Place, span: Option<Span>) -> Result<ObjectRef> {
        match place {
            Place::Variable { scope, index } => self
                .env
                .variable(*scope, *index)
                .and_then(|var| var.value().cloned())
                .ok_or_else(|| EvalError::new(ErrorKind::UninitializedVariable, span)),

            Place::Element { vector, index } => match &*vector.read() {
                Value::Vector(elements) => elements
                    .get(*index)
                    .cloned()
                    .ok_or_else(|| EvalError::new(ErrorKind::SubscriptOutOfRange, span)),
                _ => Err(EvalError::new(ErrorKind::TypeMismatch, span)),
            },
        }
    }

    /// Replace the handle stored at `place`.
    pub fn store(&mut self, place: &Place, value: ObjectRef, span: Option<Span>) -> Result<()> {
        match place {
            Place::Variable { scope, index } => {
                let var = self
                    .env
                    .variable_mut(*scope, *index)
                    .ok_or_else(|| EvalError::new(ErrorKind::UndefinedVariable, span))?;
                var.set(value);
                Ok(())
            }

            Place::Element { vector, index } => match &mut *vector.write() {
                Value::Vector(elements) => match elements.get_mut(*index) {
                    Some(slot) => {
                        *slot = value;
                        Ok(())
                    }
                    None => Err(EvalError::new(ErrorKind::SubscriptOutOfRange, span)),
                },
                _ => Err(EvalError::new(ErrorKind::TypeMismatch, span)),
            },
        }
    }

    /// Evaluate without copying: variables and subscripts yield the stored
    /// handle itself. Builtins receive their arguments this way.
    pub fn eval_ref(&mut self, node: &Node) -> Result<ObjectRef> {
        match &node.kind {
            NodeKind::Variable(ident)
                if !self.builtins.contains(&ident.name) && self.env.contains(&ident.name) =>
            {
                let place = self.eval_place(node)?;
                self.load(&place, node.span)
            }
            NodeKind::Subscript(_) => {
                let place = self.eval_place(node)?;
                self.load(&place, node.span)
            }
            _ => self.eval_node(node),
        }
    }
}

fn subscript_index(vector: &ObjectRef, index: &ObjectRef, expr: &SubscriptExpr) -> Result<usize> {
    let len = match &*vector.read() {
        Value::Vector(elements) => elements.len(),
        _ => {
            return Err(EvalError::new(ErrorKind::TypeMismatch, expr.target.span)
                .suggest(expr.target.span, "expected vector"))
        }
    };

    let i = index.read().as_int().ok_or_else(|| {
        EvalError::new(ErrorKind::TypeMismatch, expr.index.span)
            .suggest(expr.index.span, "expected integer")
    })?;

    usize::try_from(i)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| {
            EvalError::new(ErrorKind::SubscriptOutOfRange, expr.index.span)
                .suggest(expr.index.span, format!("index is {} but length is {}", i, len))
        })
}

/// Rvalue variable read: builtins first, then variables (copied), then
/// function declarations of enclosing blocks.
pub fn eval_variable(ev: &mut Evaluator, ident: &Ident, span: Option<Span>) -> Result<ObjectRef> {
    let span = ident.span.or(span);
    if let Some(builtin) = ev.builtins.get(&ident.name) {
        let value = Value::Function(FunctionValue::Builtin(builtin.clone()));
        return Ok(ev.alloc(value));
    }

    if ev.env.contains(&ident.name) {
        let object = ev.env.get_var(&ident.name, span)?;
        return Ok(object.clone_in(&ev.heap));
    }

    if let Some(decl) = ev.env.find_function(&ident.name) {
        return Ok(ev.function_object(&decl));
    }

    Err(EvalError::new(ErrorKind::UndefinedVariable, span)
        .suggest(span, format!("`{}` is not declared", ident.name)))
}

impl Evaluate for SubscriptExpr {
    fn eval(&self, ev: &mut Evaluator, span: Option<Span>) -> Result<ObjectRef> {
        let vector = ev.eval_ref(&self.target)?;
        let index = ev.eval_node(&self.index)?;
        let index = subscript_index(&vector, &index, self)?;
        let element = ev.load(&Place::Element { vector, index }, span)?;
        Ok(element.clone_in(&ev.heap))
    }
}

impl Evaluate for AssignExpr {
    fn eval(&self, ev: &mut Evaluator, span: Option<Span>) -> Result<ObjectRef> {
        let place = ev.eval_place(&self.target)?;
        let value = ev.eval_node(&self.value)?;

        // The slot gets its own copy so the result can't alias it.
        let stored = value.clone_in(&ev.heap);
        ev.store(&place, stored, span)?;
        Ok(value)
    }
}

impl Evaluate for LetStmt {
    fn eval(&self, ev: &mut Evaluator, _span: Option<Span>) -> Result<ObjectRef> {
        // The initialiser sees any outer binding of the same name.
        let init = match &self.init {
            Some(init) => Some(ev.eval_node(init)?),
            None => None,
        };

        let (scope, index) = ev.env.declare(&self.name.name);
        if let Some(value) = init {
            if let Some(var) = ev.env.variable_mut(scope, index) {
                var.set(value);
            }
        }

        Ok(ev.none())
    }
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
    fn test_place_of_undeclared() {
        let mut ev = evaluator();
        let err = ev.eval_place(&var("nope")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedVariable);
    }

    #[test]
    fn test_place_of_literal_is_rejected() {
        let mut ev = evaluator();
        let err = ev.eval_place(&int(3)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_element_store_is_visible_through_variable() {
        let mut ev = evaluator();
        ev.eval(&let_("v", list(vec![int(1), int(2)]))).unwrap();
        ev.eval(&assign(subscript(var("v"), int(1)), int(9))).unwrap();
        assert_eq!(ev.eval(&var("v")).unwrap().to_string(), "[1, 9]");
    }

    #[test]
    fn test_read_is_a_copy() {
        let mut ev = evaluator();
        ev.eval(&let_("v", list(vec![int(1)]))).unwrap();
        let copy = ev.eval(&var("v")).unwrap();
        let stored = ev.eval_ref(&var("v")).unwrap();
        assert_eq!(copy, stored);
        assert!(!copy.ptr_eq(&stored));
    }

    #[test]
    fn test_assign_uninitialised() {
        let mut ev = evaluator();
        ev.eval(&let_uninit("x")).unwrap();
        assert_eq!(
            ev.eval(&var("x")).unwrap_err().kind,
            ErrorKind::UninitializedVariable
        );
        let stored = ev.eval(&assign(var("x"), int(4))).unwrap();
        assert_eq!(stored, Value::Int(4));
        assert_eq!(ev.eval(&var("x")).unwrap(), Value::Int(4));
    }
}
