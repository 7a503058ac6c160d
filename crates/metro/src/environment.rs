//! Runtime environment: scope stack, call stack and loop stack

mod frame;

pub use frame::{CallFrame, Checkpoint, LoopContext};

use std::sync::Arc;

use crate::ast::{FunctionDecl, Span};
use crate::error::{ErrorKind, EvalError, Result};
use crate::value::ObjectRef;

/// A named slot in a scope. `None` means declared but not yet initialised.
#[derive(Debug, Clone)]
pub struct Variable {
    /// The binding's name
    pub name: String,

    value: Option<ObjectRef>,
}

impl Variable {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Current value, if initialised.
    pub fn value(&self) -> Option<&ObjectRef> {
        self.value.as_ref()
    }

    /// Bind a new value, releasing the previous one.
    pub fn set(&mut self, value: ObjectRef) {
        value.retain();
        if let Some(old) = self.value.replace(value) {
            old.release();
        }
    }

    fn clear(&mut self) {
        if let Some(old) = self.value.take() {
            old.release();
        }
    }
}

/// What opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The bottom scope, alive as long as the environment
    Global,

    /// `{ ... }`
    Block,

    /// A user-function call
    Function,

    /// A `for` or `while`
    Loop,
}

/// One level of the scope stack.
#[derive(Debug, Clone)]
pub struct Scope {
    /// What opened the scope
    pub kind: ScopeKind,

    /// Bindings in declaration order
    pub variables: Vec<Variable>,

    /// Function declarations found among the block's statements
    pub functions: Vec<Arc<FunctionDecl>>,

    /// Set by `break`, `continue` and `return` to stop the statement list
    pub is_skipped: bool,

    /// Value of the most recently evaluated statement
    pub last_value: Option<ObjectRef>,
}

impl Scope {
    fn new(kind: ScopeKind, functions: Vec<Arc<FunctionDecl>>) -> Self {
        Self {
            kind,
            variables: Vec::new(),
            functions,
            is_skipped: false,
            last_value: None,
        }
    }

    /// Index of the variable named `name` in this scope.
    pub fn find_var(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    fn release_all(&mut self) {
        for var in &mut self.variables {
            var.clear();
        }
    }
}

/// The runtime environment.
///
/// Scopes live on a stack whose bottom entry is the global scope. Lookup
/// walks the whole stack innermost-first, so a callee sees its caller's
/// variables. Bound values carry a `ref_count` that the collector reads;
/// binding a slot retains, rebinding or leaving the scope releases.
///
/// # Example
///
/// ```
/// use metro::{Collector, Environment, GcConfig, ScopeKind, Value};
///
/// let gc = Collector::start(&GcConfig::default().with_background(false));
/// let heap = gc.heap();
/// let mut env = Environment::new();
///
/// env.define("x", heap.alloc(Value::Int(1)));
///
/// env.enter_scope(ScopeKind::Block, Vec::new());
/// env.define("y", heap.alloc(Value::Int(2)));
/// env.define("x", heap.alloc(Value::Int(10))); // Shadows outer x
///
/// assert_eq!(env.get_var("x", None).unwrap(), Value::Int(10));
/// assert_eq!(env.get_var("y", None).unwrap(), Value::Int(2));
///
/// env.leave_scope();
///
/// assert_eq!(env.get_var("x", None).unwrap(), Value::Int(1));
/// assert!(env.get_var("y", None).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
    frames: Vec<CallFrame>,
    loops: Vec<LoopContext>,

    /// Maximum allowed call depth
    max_call_depth: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create an environment holding only the global scope.
    pub fn new() -> Self {
        Self::with_max_call_depth(1000)
    }

    /// Create an environment with a custom call depth limit.
    pub fn with_max_call_depth(max_depth: usize) -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Global, Vec::new())],
            frames: Vec::new(),
            loops: Vec::new(),
            max_call_depth: max_depth,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Scope Management
    // ═══════════════════════════════════════════════════════════════════

    /// Push a scope and return its index.
    pub fn enter_scope(&mut self, kind: ScopeKind, functions: Vec<Arc<FunctionDecl>>) -> usize {
        self.scopes.push(Scope::new(kind, functions));
        self.scopes.len() - 1
    }

    /// Release every binding of the innermost scope and pop it.
    /// Does nothing at the global scope.
    pub fn leave_scope(&mut self) {
        if self.scopes.len() > 1 {
            if let Some(mut scope) = self.scopes.pop() {
                scope.release_all();
            }
        }
    }

    /// Number of scopes, the global one included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Check if we're at global scope.
    pub fn is_global_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    /// Index of the innermost scope.
    pub fn current_index(&self) -> usize {
        self.scopes.len() - 1
    }

    /// The innermost scope.
    pub fn current_scope(&self) -> &Scope {
        &self.scopes[self.current_index()]
    }

    /// The innermost scope, mutably.
    pub fn current_scope_mut(&mut self) -> &mut Scope {
        let index = self.current_index();
        &mut self.scopes[index]
    }

    /// Scope at `index`, counted from the global scope.
    pub fn scope(&self, index: usize) -> Option<&Scope> {
        self.scopes.get(index)
    }

    /// Scope at `index`, mutably.
    pub fn scope_mut(&mut self, index: usize) -> Option<&mut Scope> {
        self.scopes.get_mut(index)
    }

    /// Mark every scope from `index` up to the innermost as skipped.
    pub fn skip_from(&mut self, index: usize) {
        for scope in self.scopes.iter_mut().skip(index) {
            scope.is_skipped = true;
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Variables
    // ═══════════════════════════════════════════════════════════════════

    /// Declare `name` in the innermost scope, reusing a slot of the same
    /// name there. Returns `(scope, index)` of the slot.
    pub fn declare(&mut self, name: &str) -> (usize, usize) {
        let scope_index = self.current_index();
        let scope = &mut self.scopes[scope_index];
        let index = match scope.find_var(name) {
            Some(index) => index,
            None => {
                scope.variables.push(Variable::new(name));
                scope.variables.len() - 1
            }
        };
        (scope_index, index)
    }

    /// Declare `name` in the innermost scope and bind `value`.
    pub fn define(&mut self, name: &str, value: ObjectRef) {
        let (scope, index) = self.declare(name);
        self.scopes[scope].variables[index].set(value);
    }

    /// Find `name` innermost-first. Returns `(scope, index)` of the slot.
    pub fn lookup(&self, name: &str) -> Option<(usize, usize)> {
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(s, scope)| scope.find_var(name).map(|i| (s, i)))
    }

    /// Slot at `(scope, index)`.
    pub fn variable(&self, scope: usize, index: usize) -> Option<&Variable> {
        self.scopes.get(scope)?.variables.get(index)
    }

    /// Slot at `(scope, index)`, mutably.
    pub fn variable_mut(&mut self, scope: usize, index: usize) -> Option<&mut Variable> {
        self.scopes.get_mut(scope)?.variables.get_mut(index)
    }

    /// The object bound to `name`.
    ///
    /// # Errors
    ///
    /// - `UndefinedVariable` if no scope declares `name`
    /// - `UninitializedVariable` if it is declared without a value
    pub fn get_var(&self, name: &str, span: Option<Span>) -> Result<ObjectRef> {
        let (scope, index) = self.lookup(name).ok_or_else(|| {
            EvalError::new(ErrorKind::UndefinedVariable, span)
                .suggest(span, format!("`{}` is not declared", name))
        })?;

        self.scopes[scope].variables[index]
            .value()
            .cloned()
            .ok_or_else(|| EvalError::new(ErrorKind::UninitializedVariable, span))
    }

    /// Check if a variable is declared in any scope.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Names declared in the innermost scope.
    pub fn names_in_current_scope(&self) -> Vec<&str> {
        self.current_scope()
            .variables
            .iter()
            .map(|v| v.name.as_str())
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Functions
    // ═══════════════════════════════════════════════════════════════════

    /// Find a function declaration among the blocks on the stack,
    /// innermost-first.
    pub fn find_function(&self, name: &str) -> Option<Arc<FunctionDecl>> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.functions.iter())
            .find(|decl| decl.name.name == name)
            .cloned()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Call Stack (Stack Overflow Protection)
    // ═══════════════════════════════════════════════════════════════════

    /// Push a call frame. Returns error if max depth exceeded.
    pub fn push_frame(&mut self, func: Arc<FunctionDecl>, span: Option<Span>) -> Result<()> {
        if self.frames.len() >= self.max_call_depth {
            return Err(EvalError::new(ErrorKind::StackOverflow, span).suggest(
                span,
                format!("call depth limit of {} reached", self.max_call_depth),
            ));
        }

        self.frames.push(CallFrame {
            func,
            is_returned: false,
            result: None,
            scope_depth: self.current_index(),
            loop_depth: self.loops.len(),
        });
        Ok(())
    }

    /// Pop the innermost call frame.
    pub fn pop_frame(&mut self) -> Option<CallFrame> {
        self.frames.pop()
    }

    /// The innermost call frame.
    pub fn current_frame(&self) -> Option<&CallFrame> {
        self.frames.last()
    }

    /// The innermost call frame, mutably.
    pub fn current_frame_mut(&mut self) -> Option<&mut CallFrame> {
        self.frames.last_mut()
    }

    /// Get current call depth.
    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Loop Stack
    // ═══════════════════════════════════════════════════════════════════

    /// Push a loop context.
    pub fn push_loop(&mut self, context: LoopContext) {
        self.loops.push(context);
    }

    /// Pop the innermost loop context.
    pub fn pop_loop(&mut self) -> Option<LoopContext> {
        self.loops.pop()
    }

    /// Innermost loop of the running function. Loops of callers are not
    /// visible from inside a call.
    pub fn current_loop(&self) -> Option<&LoopContext> {
        let floor = self.frames.last().map_or(0, |f| f.loop_depth);
        self.loops.last().filter(|_| self.loops.len() > floor)
    }

    /// Innermost loop of the running function, mutably.
    pub fn current_loop_mut(&mut self) -> Option<&mut LoopContext> {
        let floor = self.frames.last().map_or(0, |f| f.loop_depth);
        if self.loops.len() > floor {
            self.loops.last_mut()
        } else {
            None
        }
    }

    /// Mark every loop above `depth` as broken.
    pub fn break_loops_from(&mut self, depth: usize) {
        for context in self.loops.iter_mut().skip(depth) {
            context.is_breaked = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{build, Ident, NodeKind};
    use crate::gc::Heap;
    use crate::value::Value;

    fn decl(name: &str) -> Arc<FunctionDecl> {
        Arc::new(FunctionDecl {
            name: Ident::new(name),
            params: Vec::new(),
            return_type: None,
            body: build::block(vec![]),
        })
    }

    #[test]
    fn test_global_scope_never_popped() {
        let mut env = Environment::new();
        env.leave_scope();
        env.leave_scope();
        assert!(env.is_global_scope());
        assert_eq!(env.current_scope().kind, ScopeKind::Global);
    }

    #[test]
    fn test_declare_reuses_slot_in_same_scope() {
        let mut env = Environment::new();
        let first = env.declare("a");
        let second = env.declare("a");
        assert_eq!(first, second);
        assert_eq!(env.names_in_current_scope(), vec!["a"]);
    }

    #[test]
    fn test_uninitialised_and_undefined() {
        let mut env = Environment::new();
        env.declare("a");
        assert_eq!(
            env.get_var("a", None).unwrap_err().kind,
            ErrorKind::UninitializedVariable
        );
        assert_eq!(
            env.get_var("b", None).unwrap_err().kind,
            ErrorKind::UndefinedVariable
        );
    }

    #[test]
    fn test_binding_counts() {
        let heap = Heap::new(None);
        let mut env = Environment::new();
        let one = heap.alloc(Value::Int(1));
        let two = heap.alloc(Value::Int(2));

        env.enter_scope(ScopeKind::Block, Vec::new());
        env.define("x", one.clone());
        assert_eq!(one.ref_count(), 1);

        env.define("x", two.clone());
        assert_eq!(one.ref_count(), 0);
        assert_eq!(two.ref_count(), 1);

        env.leave_scope();
        assert_eq!(two.ref_count(), 0);
    }

    #[test]
    fn test_function_lookup_innermost_first() {
        let mut env = Environment::new();
        let outer = decl("f");
        let inner = decl("f");
        env.enter_scope(ScopeKind::Block, vec![outer.clone()]);
        env.enter_scope(ScopeKind::Block, vec![inner.clone()]);

        let found = env.find_function("f").unwrap();
        assert!(Arc::ptr_eq(&found, &inner));

        env.leave_scope();
        let found = env.find_function("f").unwrap();
        assert!(Arc::ptr_eq(&found, &outer));
        assert!(env.find_function("g").is_none());
        assert!(matches!(outer.body.kind, NodeKind::Scope(_)));
    }

    #[test]
    fn test_call_depth_limit() {
        let mut env = Environment::with_max_call_depth(2);
        env.push_frame(decl("f"), None).unwrap();
        env.push_frame(decl("f"), None).unwrap();
        let err = env.push_frame(decl("f"), None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::StackOverflow);
        env.pop_frame();
        assert_eq!(env.call_depth(), 1);
    }

    #[test]
    fn test_caller_loops_hidden_inside_call() {
        let mut env = Environment::new();
        env.push_loop(LoopContext::new(0));
        assert!(env.current_loop().is_some());

        env.push_frame(decl("f"), None).unwrap();
        assert!(env.current_loop().is_none());
        assert!(env.current_loop_mut().is_none());

        env.pop_frame();
        assert!(env.current_loop().is_some());
    }

    #[test]
    fn test_skip_from_marks_upper_scopes() {
        let mut env = Environment::new();
        let outer = env.enter_scope(ScopeKind::Loop, Vec::new());
        env.enter_scope(ScopeKind::Block, Vec::new());
        env.skip_from(outer);
        assert!(!env.scope(0).unwrap().is_skipped);
        assert!(env.scope(outer).unwrap().is_skipped);
        assert!(env.current_scope().is_skipped);
    }
}
