//! Type descriptors for runtime values

use std::fmt;

/// The kind of a runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `none`
    None,
    /// 64-bit signed integer
    Int,
    /// 32-bit float
    Float,
    /// Boolean
    Bool,
    /// Unicode scalar value
    Char,
    /// UTF-32 string
    String,
    /// Fixed heterogeneous sequence
    Tuple,
    /// Growable heterogeneous sequence
    Vector,
    /// Half-open integer range
    Range,
    /// Variadic argument pack (only appears in signatures)
    Args,
    /// Builtin or user function
    Function,
}

impl TypeKind {
    /// Name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            TypeKind::None => "none",
            TypeKind::Int => "int",
            TypeKind::Float => "float",
            TypeKind::Bool => "bool",
            TypeKind::Char => "char",
            TypeKind::String => "string",
            TypeKind::Tuple => "tuple",
            TypeKind::Vector => "vec",
            TypeKind::Range => "range",
            TypeKind::Args => "args",
            TypeKind::Function => "func",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape of a value: its kind plus structural parameters.
///
/// Equality through [`Type::equals`] only looks at `kind`; mutability,
/// reference-ness and element types are informational. A `vec<int>` and a
/// `vec<string>` are therefore the same type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    /// Top-level kind
    pub kind: TypeKind,

    /// Declared `mut`
    pub is_mutable: bool,

    /// Declared as a reference
    pub is_reference: bool,

    /// Element types for tuples and vectors
    pub elements: Vec<Type>,
}

impl Type {
    /// Create a plain type of `kind`.
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            is_mutable: false,
            is_reference: false,
            elements: Vec::new(),
        }
    }

    /// Create a type with explicit mutability and reference flags.
    pub fn with_flags(kind: TypeKind, is_mutable: bool, is_reference: bool) -> Self {
        Self {
            kind,
            is_mutable,
            is_reference,
            elements: Vec::new(),
        }
    }

    /// Create a type with element types (`vec<int>`, `(int, string)`).
    pub fn with_elements(kind: TypeKind, elements: Vec<Type>) -> Self {
        Self {
            kind,
            is_mutable: false,
            is_reference: false,
            elements,
        }
    }

    /// Compare top-level kinds only.
    pub fn equals(&self, other: impl Into<Type>) -> bool {
        self.kind == other.into().kind
    }
}

impl Default for Type {
    fn default() -> Self {
        Self::new(TypeKind::None)
    }
}

impl From<TypeKind> for Type {
    fn from(kind: TypeKind) -> Self {
        Self::new(kind)
    }
}

impl From<&Type> for Type {
    fn from(ty: &Type) -> Self {
        ty.clone()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}
