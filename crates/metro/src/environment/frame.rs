//! Call frames, loop contexts and stack checkpoints

use std::sync::Arc;

use super::Environment;
use crate::ast::FunctionDecl;
use crate::value::ObjectRef;

/// One active user-function call.
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Declaration being executed
    pub func: Arc<FunctionDecl>,

    /// Set once `return` ran
    pub is_returned: bool,

    /// Value of `return`, if any
    pub result: Option<ObjectRef>,

    /// Index of the function's own scope
    pub scope_depth: usize,

    /// Loop stack height at entry; loops below belong to callers
    pub loop_depth: usize,
}

/// One active `for` or `while`.
#[derive(Debug, Clone)]
pub struct LoopContext {
    /// Index of the loop's scope on the scope stack
    pub scope_index: usize,

    /// Set once `break` ran
    pub is_breaked: bool,

    /// Value of `break expr`, if any
    pub result: Option<ObjectRef>,
}

impl LoopContext {
    /// Context for a loop whose scope sits at `scope_index`.
    pub fn new(scope_index: usize) -> Self {
        Self {
            scope_index,
            is_breaked: false,
            result: None,
        }
    }
}

/// Saved stack heights. See [`Environment::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    scopes: usize,
    frames: usize,
    loops: usize,
}

impl Environment {
    /// Record the current stack heights.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            scopes: self.scopes.len(),
            frames: self.frames.len(),
            loops: self.loops.len(),
        }
    }

    /// Unwind everything opened after `checkpoint`, releasing the bindings
    /// of every dropped scope. Used after an error aborted evaluation
    /// midway.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.loops.truncate(checkpoint.loops);
        self.frames.truncate(checkpoint.frames);
        while self.scopes.len() > checkpoint.scopes.max(1) {
            self.leave_scope();
        }
        if let Some(global) = self.scopes.first_mut() {
            global.is_skipped = false;
        }
    }
}
