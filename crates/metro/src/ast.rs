//! Abstract syntax tree consumed by the evaluator
//!
//! The parser owns the tree; the evaluator only reads it. Each node kind
//! carries its own payload instead of a set of generic child slots, so the
//! evaluator never has to guess which slot means what.

pub mod build;

use std::fmt;
use std::sync::Arc;

use crate::types::Type;

/// Source location of a node or token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first character
    pub start: usize,

    /// Byte offset one past the last character
    pub end: usize,

    /// 1-based line number
    pub line: usize,
}

impl Span {
    /// Create a span.
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}..{}", self.line, self.start, self.end)
    }
}

/// An identifier token.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    /// Identifier text
    pub name: String,

    /// Where it appeared
    pub span: Option<Span>,
}

impl Ident {
    /// Create an identifier without location.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            span: None,
        }
    }
}

/// Literal built by the parser. The evaluator allocates a fresh heap
/// object from it every time the literal is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f32),
    /// Character literal
    Char(char),
    /// String literal
    String(String),
}

/// Arithmetic, bitwise and logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `<<`
    LShift,
    /// `>>`
    RShift,
    /// `&`
    BitAnd,
    /// `^`
    BitXor,
    /// `|`
    BitOr,
    /// `&&`
    LogAnd,
    /// `||`
    LogOr,
}

impl BinaryOp {
    /// Operator token.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::LogAnd => "&&",
            BinaryOp::LogOr => "||",
        }
    }
}

/// Comparison operators. These chain: `a < b < c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `>`
    Bigger,
    /// `>=`
    BiggerOrEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
}

impl CompareOp {
    /// Operator token.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Bigger => ">",
            CompareOp::BiggerOrEqual => ">=",
            CompareOp::Less => "<",
            CompareOp::LessOrEqual => "<=",
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
        }
    }
}

/// A syntax tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// What the node is
    pub kind: NodeKind,

    /// Source location, if the parser recorded one
    pub span: Option<Span>,
}

impl Node {
    /// Create a node without location.
    pub fn new(kind: NodeKind) -> Self {
        Self { kind, span: None }
    }

    /// Attach a source location.
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// Node kinds and their payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `none`
    None,
    /// `@`: the function currently executing
    SelfFunc,
    /// `true`
    True,
    /// `false`
    False,
    /// Literal value
    Value(Literal),
    /// `[a, b, c]`
    List(Vec<Node>),
    /// `[]`
    EmptyList,
    /// `(a, b)`
    Tuple(Vec<Node>),
    /// Name reference
    Variable(Ident),
    /// `f(args...)`
    Callfunc(CallExpr),
    /// `a[i]`
    Subscript(SubscriptExpr),
    /// Arithmetic, bitwise or logical operation
    Binary(BinaryExpr),
    /// Comparison, possibly chained through `lhs`
    Compare(CompareExpr),
    /// `a..b`
    Range(RangeExpr),
    /// `a = b`
    Assign(AssignExpr),
    /// `if cond { } else { }`
    If(IfExpr),
    /// `for x in iterable { }`
    For(ForLoop),
    /// `while cond { }`
    While(WhileLoop),
    /// `return [expr]`
    Return(Option<Box<Node>>),
    /// `break [expr]`
    Break(Option<Box<Node>>),
    /// `continue`
    Continue,
    /// `let name [: type] [= init]`
    Let(LetStmt),
    /// `{ statements... }`
    Scope(Vec<Node>),
    /// `fn name(params) -> type { body }`
    Function(Arc<FunctionDecl>),
    /// Struct declaration stub; never executed
    Struct,
}

impl NodeKind {
    /// Human-readable name of the node kind.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::None => "none",
            NodeKind::SelfFunc => "self function",
            NodeKind::True | NodeKind::False => "boolean",
            NodeKind::Value(_) => "literal",
            NodeKind::List(_) => "list",
            NodeKind::EmptyList => "empty list",
            NodeKind::Tuple(_) => "tuple",
            NodeKind::Variable(_) => "variable",
            NodeKind::Callfunc(_) => "function call",
            NodeKind::Subscript(_) => "subscript",
            NodeKind::Binary(_) => "binary operation",
            NodeKind::Compare(_) => "comparison",
            NodeKind::Range(_) => "range",
            NodeKind::Assign(_) => "assignment",
            NodeKind::If(_) => "if",
            NodeKind::For(_) => "for loop",
            NodeKind::While(_) => "while loop",
            NodeKind::Return(_) => "return",
            NodeKind::Break(_) => "break",
            NodeKind::Continue => "continue",
            NodeKind::Let(_) => "let",
            NodeKind::Scope(_) => "scope",
            NodeKind::Function(_) => "function",
            NodeKind::Struct => "struct",
        }
    }
}

/// Function call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// Expression producing the function
    pub functor: Box<Node>,
    /// Actual arguments
    pub args: Vec<Node>,
}

/// Vector subscript.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptExpr {
    /// Indexed expression
    pub target: Box<Node>,
    /// Index expression
    pub index: Box<Node>,
}

/// Binary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    /// Operator
    pub op: BinaryOp,
    /// Left operand
    pub lhs: Box<Node>,
    /// Right operand
    pub rhs: Box<Node>,
}

/// Comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareExpr {
    /// Operator
    pub op: CompareOp,
    /// Left operand; another comparison when chained
    pub lhs: Box<Node>,
    /// Right operand
    pub rhs: Box<Node>,
}

/// Range construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeExpr {
    /// Inclusive start
    pub begin: Box<Node>,
    /// Exclusive end
    pub end: Box<Node>,
}

/// Assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr {
    /// Lvalue
    pub target: Box<Node>,
    /// Stored value
    pub value: Box<Node>,
}

/// Conditional.
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    /// Condition, must evaluate to bool
    pub cond: Box<Node>,
    /// Taken when the condition holds
    pub then_branch: Box<Node>,
    /// Taken otherwise
    pub else_branch: Option<Box<Node>>,
}

/// `for` loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    /// Loop variable or lvalue expression
    pub iterator: Box<Node>,
    /// Range or vector being traversed
    pub iterable: Box<Node>,
    /// Loop body
    pub body: Box<Node>,
}

/// `while` loop.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileLoop {
    /// Condition, must evaluate to bool
    pub cond: Box<Node>,
    /// Loop body
    pub body: Box<Node>,
}

/// `let` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    /// Bound name
    pub name: Ident,
    /// Declared type, informational
    pub ty: Option<Type>,
    /// Initial value
    pub init: Option<Box<Node>>,
}

/// Formal parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name
    pub name: Ident,
    /// Declared type, informational
    pub ty: Option<Type>,
    /// `...name`: absorbs the remaining arguments
    pub variadic: bool,
}

/// Function declaration.
///
/// Shared behind an `Arc` so that function values can point back at their
/// declaration without borrowing the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// Function name
    pub name: Ident,
    /// Formal parameters
    pub params: Vec<Param>,
    /// Declared return type, informational
    pub return_type: Option<Type>,
    /// Body, normally a `Scope` node
    pub body: Node,
}
