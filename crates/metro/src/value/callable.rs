//! Callable value types: user functions and builtins

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use super::ObjectRef;
use crate::ast::{FunctionDecl, Span};
use crate::error::{ErrorKind, EvalError, Result};
use crate::gc::Heap;
use crate::types::TypeKind;

/// Type alias for builtin function pointers to reduce complexity
pub type BuiltinFnPtr =
    Arc<dyn Fn(&mut CallSite<'_>, &[ObjectRef]) -> Result<ObjectRef> + Send + Sync>;

/// What a builtin sees of its caller.
pub struct CallSite<'a> {
    /// Location of the calling node
    pub span: Option<Span>,

    /// Allocation entry point
    pub heap: &'a Heap,

    /// Where printing builtins write
    pub out: &'a mut dyn Write,
}

impl CallSite<'_> {
    /// Build an error located at the call.
    pub fn error(&self, kind: ErrorKind) -> EvalError {
        EvalError::new(kind, self.span)
    }

    /// Write text to the output sink. Sink failures are logged, not raised.
    pub fn write_str(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()) {
            tracing::warn!(error = %e, "builtin output failed");
        }
    }
}

/// Declared parameter kinds of a builtin.
///
/// A trailing [`TypeKind::Args`] accepts any number of further arguments
/// of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(pub Vec<TypeKind>);

impl Signature {
    /// Create a signature.
    pub fn new(params: impl Into<Vec<TypeKind>>) -> Self {
        Signature(params.into())
    }

    fn fixed(&self) -> &[TypeKind] {
        match self.0.split_last() {
            Some((TypeKind::Args, rest)) => rest,
            _ => &self.0,
        }
    }

    /// Whether extra arguments are accepted.
    pub fn is_variadic(&self) -> bool {
        self.0.last() == Some(&TypeKind::Args)
    }

    /// Check arity and argument kinds.
    ///
    /// # Errors
    ///
    /// `TooFewArguments`, `TooManyArguments`, or `IllegalFunctionCall` when
    /// an argument has the wrong kind.
    pub fn check(&self, args: &[ObjectRef], span: Option<Span>) -> Result<()> {
        let fixed = self.fixed();

        if args.len() < fixed.len() {
            return Err(EvalError::new(ErrorKind::TooFewArguments, span));
        }

        if args.len() > fixed.len() && !self.is_variadic() {
            return Err(EvalError::new(ErrorKind::TooManyArguments, span));
        }

        for (expected, arg) in fixed.iter().zip(args) {
            let found = arg.kind();
            if found != *expected {
                return Err(
                    EvalError::new(ErrorKind::IllegalFunctionCall, span).suggest(
                        span,
                        format!("expected `{}`, found `{}`", expected, found),
                    ),
                );
            }
        }

        Ok(())
    }
}

/// A native function exposed to scripts.
#[derive(Clone)]
pub struct BuiltinFn {
    /// Name scripts call it by
    pub name: String,

    /// Declared parameter kinds
    pub signature: Signature,

    /// The actual function pointer
    pub func: BuiltinFnPtr,
}

impl BuiltinFn {
    /// Create a builtin.
    pub fn new<F>(name: impl Into<String>, signature: Signature, func: F) -> Self
    where
        F: Fn(&mut CallSite<'_>, &[ObjectRef]) -> Result<ObjectRef> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature,
            func: Arc::new(func),
        }
    }

    /// Check the signature, then run the native implementation.
    pub fn call(&self, site: &mut CallSite<'_>, args: &[ObjectRef]) -> Result<ObjectRef> {
        self.signature.check(args, site.span)?;
        (self.func)(site, args)
    }
}

impl fmt::Debug for BuiltinFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFn({})", self.name)
    }
}

/// A function value. Cloning is shallow.
#[derive(Debug, Clone)]
pub enum FunctionValue {
    /// Declared in the script
    User(Arc<FunctionDecl>),

    /// Native
    Builtin(BuiltinFn),
}

impl FunctionValue {
    /// Whether this is a native builtin.
    pub fn is_builtin(&self) -> bool {
        matches!(self, FunctionValue::Builtin(_))
    }

    /// Function name.
    pub fn name(&self) -> &str {
        match self {
            FunctionValue::User(decl) => &decl.name.name,
            FunctionValue::Builtin(b) => &b.name,
        }
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FunctionValue::User(a), FunctionValue::User(b)) => Arc::ptr_eq(a, b),
            (FunctionValue::Builtin(a), FunctionValue::Builtin(b)) => a.name == b.name,
            _ => false,
        }
    }
}
