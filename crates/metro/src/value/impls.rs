//! Value constructors, accessors and comparison

use super::*;
use crate::types::{Type, TypeKind};

impl Value {
    /// Build a string value from Rust text.
    pub fn string(text: &str) -> Self {
        Value::String(text.chars().collect())
    }

    /// Runtime kind tag.
    pub fn kind(&self) -> TypeKind {
        match self {
            Value::None => TypeKind::None,
            Value::Bool(_) => TypeKind::Bool,
            Value::Int(_) => TypeKind::Int,
            Value::Float(_) => TypeKind::Float,
            Value::Char(_) => TypeKind::Char,
            Value::String(_) => TypeKind::String,
            Value::Tuple(_) => TypeKind::Tuple,
            Value::Vector(_) => TypeKind::Vector,
            Value::Range(_) => TypeKind::Range,
            Value::Function(_) => TypeKind::Function,
        }
    }

    /// Runtime type. Tuples record the type of each element.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Tuple(items) => Type::with_elements(
                TypeKind::Tuple,
                items.iter().map(|item| item.type_of()).collect(),
            ),
            other => Type::new(other.kind()),
        }
    }

    /// Integer payload, if this is an int.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float payload, if this is a float.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Bool payload, if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String payload as Rust text, if this is a string.
    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.iter().collect()),
            _ => None,
        }
    }

    /// Element count of strings, tuples, vectors and ranges.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.len()),
            Value::Tuple(items) | Value::Vector(items) => Some(items.len()),
            Value::Range(r) => Some(r.len()),
            _ => None,
        }
    }

    /// Whether this is the `none` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) | (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Range(a), Value::Range(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.chars().collect())
    }
}

impl From<Range> for Value {
    fn from(r: Range) -> Self {
        Value::Range(r)
    }
}
