//! Value representation for runtime values
//!
//! Every script value lives in a heap [`Object`] reached through an
//! [`ObjectRef`] handle. The object carries the collector's `ref_count` and
//! the [`Value`] payload behind a lock, so vector elements and variable
//! slots can be replaced in place while other handles observe the change.

mod callable;
mod display;
mod impls;
mod object;

pub use callable::{BuiltinFn, BuiltinFnPtr, CallSite, FunctionValue, Signature};
pub use display::format_float;
pub use object::{Object, ObjectRef};

/// Largest string or vector an operator or builtin will build in one step.
/// Anything longer fails with `ValueOutOfRange` before allocating.
pub const MAX_SEQUENCE_LEN: usize = 1 << 24;

/// Half-open integer range `begin..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    /// Inclusive start
    pub begin: i64,

    /// Exclusive end
    pub end: i64,
}

impl Range {
    /// Create a range.
    pub fn new(begin: i64, end: i64) -> Self {
        Self { begin, end }
    }

    /// Number of integers in the range (zero when `end <= begin`).
    pub fn len(&self) -> usize {
        if self.end > self.begin {
            self.end.abs_diff(self.begin) as usize
        } else {
            0
        }
    }

    /// Number of integers in the range, or `None` past [`MAX_SEQUENCE_LEN`].
    pub fn bounded_len(&self) -> Option<usize> {
        Some(self.len()).filter(|&n| n <= MAX_SEQUENCE_LEN)
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Payload of a heap object.
///
/// Compound variants hold handles to other heap objects. Copying a value
/// with independent elements goes through [`ObjectRef::clone_in`], which
/// registers every new object with the heap.
#[derive(Debug)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Immediates
    // ═══════════════════════════════════════════════════════════════════
    /// `none`
    None,

    /// `true` or `false`
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 32-bit float
    Float(f32),

    /// Unicode scalar value
    Char(char),

    // ═══════════════════════════════════════════════════════════════════
    // Sequences
    // ═══════════════════════════════════════════════════════════════════
    /// UTF-32 string buffer
    String(Vec<char>),

    /// Fixed heterogeneous sequence
    Tuple(Vec<ObjectRef>),

    /// Growable heterogeneous sequence
    Vector(Vec<ObjectRef>),

    /// Immutable integer range
    Range(Range),

    // ═══════════════════════════════════════════════════════════════════
    // Callables
    // ═══════════════════════════════════════════════════════════════════
    /// Builtin or user-defined function
    Function(FunctionValue),
}
