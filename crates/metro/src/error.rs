//! Error types for Metro evaluation

use thiserror::Error;

use crate::ast::Span;

/// What went wrong while evaluating a script.
///
/// Every kind is fatal to the running script: the language has no way to
/// catch an error once it has been raised.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Operand, condition or argument has the wrong type
    #[error("type mismatch")]
    TypeMismatch,

    /// Name was never declared in any visible scope
    #[error("undefined variable name")]
    UndefinedVariable,

    /// Callee name does not resolve to a function
    #[error("undefined function name")]
    UndefinedFunction,

    /// Variable was declared with `let` but never assigned
    #[error("use of uninitialized variable")]
    UninitializedVariable,

    /// `@` or `return` used outside of a function body
    #[error("here is not inside of function")]
    HereIsNotInsideOfFunc,

    /// `break` or `continue` used outside of a loop body
    #[error("here is not inside of loop")]
    HereIsNotInsideOfLoop,

    /// Operator is not defined for the operand types
    #[error("invalid operator")]
    InvalidOperator,

    /// String repeated a negative number of times
    #[error("multiply string by negative value")]
    MultiplyStringByNegative,

    /// Builtin called with arguments of the wrong type
    #[error("illegal function call")]
    IllegalFunctionCall,

    /// Fewer arguments than formal parameters
    #[error("too few arguments")]
    TooFewArguments,

    /// More arguments than formal parameters
    #[error("too many arguments")]
    TooManyArguments,

    /// Index outside of `0..len`
    #[error("subscript out of range")]
    SubscriptOutOfRange,

    /// Arithmetic result does not fit the value type
    #[error("value out of range")]
    ValueOutOfRange,

    /// Integer division or remainder by zero
    #[error("division by zero")]
    DivisionByZero,

    /// Call depth limit exceeded
    #[error("stack overflow")]
    StackOverflow,

    /// Host requested evaluation to stop
    #[error("evaluation interrupted")]
    Interrupted,
}

/// A hint attached to an error, pointing at a location with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Where the hint applies
    pub location: Option<Span>,

    /// Hint text
    pub message: String,
}

/// An error raised by the evaluator.
///
/// Carries the error kind, the location of the offending node and any
/// number of suggestions. Rendering for humans is left to a [`Reporter`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct EvalError {
    /// Error kind
    pub kind: ErrorKind,

    /// Location of the node that raised the error
    pub location: Option<Span>,

    /// Attached hints
    pub suggestions: Vec<Suggestion>,

    /// Whether this is an advisory warning instead of an error
    pub is_warning: bool,
}

impl EvalError {
    /// Create an error of `kind` at `location`.
    pub fn new(kind: ErrorKind, location: Option<Span>) -> Self {
        Self {
            kind,
            location,
            suggestions: Vec::new(),
            is_warning: false,
        }
    }

    /// Attach a hint.
    pub fn suggest(mut self, location: Option<Span>, message: impl Into<String>) -> Self {
        self.suggestions.push(Suggestion {
            location,
            message: message.into(),
        });
        self
    }

    /// Downgrade to a warning.
    pub fn set_warn(mut self) -> Self {
        self.is_warning = true;
        self
    }

    /// Hand this error to a reporter.
    pub fn emit(&self, reporter: &dyn Reporter) -> &Self {
        reporter.report(self);
        self
    }

    /// Terminate the process. Meant for command-line hosts after `emit`.
    pub fn exit(&self, code: i32) -> ! {
        std::process::exit(code)
    }
}

/// Sink for errors and warnings, implemented by the embedding host.
pub trait Reporter: Send + Sync {
    /// Present one error or warning.
    fn report(&self, error: &EvalError);
}

/// Default reporter: forwards everything to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, error: &EvalError) {
        let hints: Vec<&str> = error
            .suggestions
            .iter()
            .map(|s| s.message.as_str())
            .collect();

        if error.is_warning {
            tracing::warn!(kind = ?error.kind, location = ?error.location, ?hints, "{}", error);
        } else {
            tracing::error!(kind = ?error.kind, location = ?error.location, ?hints, "{}", error);
        }
    }
}

/// Result type alias for Metro operations
pub type Result<T> = std::result::Result<T, EvalError>;
