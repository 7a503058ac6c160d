//! Tree-walking evaluation
//!
//! [`Evaluator`] owns everything a running script touches: the scope, call
//! and loop stacks, the builtin table, the output sink and the collector.
//! Each node kind is evaluated by an [`Evaluate`] impl on its payload.

pub mod binary;
pub mod call;
pub mod compare;
pub mod control;
pub mod literal;
pub mod loops;
pub mod place;
pub mod scope;

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;

use crate::ast::{FunctionDecl, Node, NodeKind, Span};
use crate::builtins::Builtins;
use crate::context::EvalContext;
use crate::environment::Environment;
use crate::error::{ErrorKind, EvalError, Reporter, Result, TracingReporter};
use crate::gc::{Collector, Heap};
use crate::value::{FunctionValue, ObjectRef, Value};

pub use place::Place;

/// Trait for evaluating AST nodes to heap objects.
///
/// This is the core abstraction for the tree-walking interpreter.
/// Each node payload implements it; `span` is the location of the node
/// that carried the payload.
pub trait Evaluate {
    /// Evaluate this node with the given evaluator.
    fn eval(&self, ev: &mut Evaluator, span: Option<Span>) -> Result<ObjectRef>;
}

/// Runs syntax trees.
///
/// Constructing an evaluator starts its collector; dropping it stops the
/// collector and releases every object.
///
/// # Example
///
/// ```
/// use metro::ast::build::*;
/// use metro::{EvalContext, Evaluator, Value};
///
/// let mut ev = Evaluator::new(EvalContext::new());
/// let program = block(vec![
///     let_("x", int(40)),
///     add(var("x"), int(2)),
/// ]);
///
/// assert_eq!(ev.eval(&program).unwrap(), Value::Int(42));
/// ```
pub struct Evaluator {
    env: Environment,
    ctx: EvalContext,
    builtins: Builtins,
    collector: Collector,
    heap: Heap,
    output: Box<dyn Write + Send>,
    reporter: Box<dyn Reporter>,

    /// One function object per declaration, keyed by declaration address
    functions: HashMap<usize, ObjectRef>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvalContext::default())
    }
}

impl Evaluator {
    /// Create an evaluator with the standard prelude, writing to stdout.
    pub fn new(ctx: EvalContext) -> Self {
        let collector = Collector::start(&ctx.gc);
        let heap = collector.heap();

        Self {
            env: Environment::with_max_call_depth(ctx.max_call_depth),
            ctx,
            builtins: Builtins::with_prelude(),
            collector,
            heap,
            output: Box::new(io::stdout()),
            reporter: Box::new(TracingReporter),
            functions: HashMap::new(),
        }
    }

    /// Send builtin output somewhere other than stdout.
    pub fn with_output(mut self, output: impl Write + Send + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Replace the error reporter used by [`run`](Self::run).
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Replace the builtin table.
    pub fn with_builtins(mut self, builtins: Builtins) -> Self {
        self.builtins = builtins;
        self
    }

    // ═══════════════════════════════════════════════════════════════════
    // Entry Points
    // ═══════════════════════════════════════════════════════════════════

    /// Evaluate a tree. On error, every scope, frame and loop opened
    /// during the call is unwound before the error is returned.
    pub fn eval(&mut self, node: &Node) -> Result<ObjectRef> {
        let checkpoint = self.env.checkpoint();
        let result = self.eval_node(node);
        if result.is_err() {
            self.env.restore(checkpoint);
        }
        self.prune_functions();
        result
    }

    /// Like [`eval`](Self::eval), and hand any error to the reporter.
    pub fn run(&mut self, node: &Node) -> Result<ObjectRef> {
        let result = self.eval(node);
        if let Err(e) = &result {
            e.emit(self.reporter.as_ref());
        }
        if let Err(e) = self.output.flush() {
            tracing::warn!(error = %e, "flushing output failed");
        }
        result
    }

    // ═══════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════

    /// The runtime environment.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// The runtime environment, mutably.
    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// The evaluation context.
    pub fn context(&self) -> &EvalContext {
        &self.ctx
    }

    /// The builtin table.
    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    /// The builtin table, for registering host functions.
    pub fn builtins_mut(&mut self) -> &mut Builtins {
        &mut self.builtins
    }

    /// The collector owned by this evaluator.
    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    /// Allocation handle onto this evaluator's heap.
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Allocate a heap object.
    pub fn alloc(&self, value: Value) -> ObjectRef {
        self.heap.alloc(value)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn eval_node(&mut self, node: &Node) -> Result<ObjectRef> {
        node.eval(self, node.span)
    }

    pub(crate) fn check_interrupt(&self, span: Option<Span>) -> Result<()> {
        if self.ctx.is_interrupted() {
            return Err(EvalError::new(ErrorKind::Interrupted, span));
        }
        Ok(())
    }

    pub(crate) fn none(&self) -> ObjectRef {
        self.alloc(Value::None)
    }

    /// The function object for `decl`, created on first use.
    pub(crate) fn function_object(&mut self, decl: &Arc<FunctionDecl>) -> ObjectRef {
        let heap = &self.heap;
        self.functions
            .entry(Arc::as_ptr(decl) as usize)
            .or_insert_with(|| heap.alloc(Value::Function(FunctionValue::User(decl.clone()))))
            .clone()
    }

    /// Drop memoised function objects that nothing outside the memo and the
    /// object table still holds. A later evaluation of the same declaration
    /// allocates a fresh object.
    fn prune_functions(&mut self) {
        let before = self.functions.len();
        self.functions.retain(|_, object| {
            let owners = 1 + usize::from(object.slot().is_some());
            object.ref_count() > 0 || object.handle_count() > owners
        });
        let pruned = before - self.functions.len();
        if pruned > 0 {
            tracing::debug!(pruned, kept = self.functions.len(), "pruned function objects");
        }
    }

    /// Require a boolean, reporting `what` on mismatch.
    pub(crate) fn expect_bool(
        &self,
        object: &ObjectRef,
        span: Option<Span>,
        what: &str,
    ) -> Result<bool> {
        object.read().as_bool().ok_or_else(|| {
            EvalError::new(ErrorKind::TypeMismatch, span).suggest(span, what.to_string())
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Main Node Dispatcher
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for Node {
    fn eval(&self, ev: &mut Evaluator, span: Option<Span>) -> Result<ObjectRef> {
        // Check for interruption before each node
        ev.check_interrupt(span)?;

        if ev.ctx.trace {
            tracing::trace!(kind = self.kind.name(), ?span, "eval");
        }

        match &self.kind {
            // Literals
            NodeKind::None | NodeKind::Struct => Ok(ev.none()),
            NodeKind::True => Ok(ev.alloc(Value::Bool(true))),
            NodeKind::False => Ok(ev.alloc(Value::Bool(false))),
            NodeKind::Value(lit) => lit.eval(ev, span),
            NodeKind::EmptyList => Ok(ev.alloc(Value::Vector(Vec::new()))),
            NodeKind::List(items) => literal::eval_list(ev, items),
            NodeKind::Tuple(items) => literal::eval_tuple(ev, items),
            NodeKind::Range(expr) => expr.eval(ev, span),

            // Names and places
            NodeKind::Variable(ident) => place::eval_variable(ev, ident, span),
            NodeKind::Subscript(expr) => expr.eval(ev, span),
            NodeKind::Assign(expr) => expr.eval(ev, span),

            // Operators
            NodeKind::Binary(expr) => expr.eval(ev, span),
            NodeKind::Compare(expr) => expr.eval(ev, span),

            // Functions
            NodeKind::Callfunc(expr) => expr.eval(ev, span),
            NodeKind::Function(decl) => Ok(ev.function_object(decl)),
            NodeKind::SelfFunc => control::eval_self_func(ev, span),
            NodeKind::Return(value) => control::eval_return(ev, value.as_deref(), span),

            // Control flow
            NodeKind::If(expr) => expr.eval(ev, span),
            NodeKind::For(expr) => expr.eval(ev, span),
            NodeKind::While(expr) => expr.eval(ev, span),
            NodeKind::Break(value) => loops::eval_break(ev, value.as_deref(), span),
            NodeKind::Continue => loops::eval_continue(ev, span),

            // Statements
            NodeKind::Let(stmt) => stmt.eval(ev, span),
            NodeKind::Scope(statements) => scope::eval_block(ev, statements),
        }
    }
}
