//! # Metro
//!
//! Runtime core of the Metro scripting language: a tree-walking evaluator,
//! a heap object model and a concurrent collector.
//!
//! A parser hands the evaluator a [`ast::Node`] tree. The evaluator walks it,
//! allocating every value as an [`ObjectRef`] on a [`Heap`]. Variables count
//! the objects they hold; a background [`Collector`] thread frees objects
//! that nothing refers to any more.
//!
//! ## Architecture
//!
//! - **Object model** ([`value`]): `Value` payloads inside shared heap objects
//! - **Collector** ([`gc`]): live-object table plus the sweeper thread
//! - **Environment** ([`environment`]): scope, call and loop stacks
//! - **Evaluator** ([`eval`]): per-node evaluation and operator dispatch
//! - **Builtins** ([`builtins`]): the host functions scripts can call
//!
//! ## Example
//!
//! ```
//! use metro::ast::build::*;
//! use metro::{EvalContext, Evaluator, Value};
//!
//! let mut ev = Evaluator::new(EvalContext::new());
//! let program = block(vec![
//!     function("twice", vec![param("n")], block(vec![mul(var("n"), int(2))])),
//!     call("twice", vec![int(21)]),
//! ]);
//!
//! assert_eq!(ev.eval(&program).unwrap(), Value::Int(42));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod builtins;
pub mod context;
pub mod environment;
pub mod error;
pub mod eval;
pub mod gc;
pub mod types;
pub mod value;

// Re-export main types
pub use builtins::Builtins;
pub use context::{EvalContext, GcConfig};
pub use environment::{CallFrame, Environment, LoopContext, ScopeKind};
pub use error::{ErrorKind, EvalError, Reporter, Result, TracingReporter};
pub use eval::{Evaluate, Evaluator, Place};
pub use gc::{Collector, Heap, PauseGuard, SweepStats};
pub use types::{Type, TypeKind};
pub use value::{
    BuiltinFn, BuiltinFnPtr, CallSite, FunctionValue, Object, ObjectRef, Range, Signature, Value,
    MAX_SEQUENCE_LEN,
};

/// Metro version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
