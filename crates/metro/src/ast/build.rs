//! Constructors for syntax trees
//!
//! Parsers and tests use these to assemble nodes without spelling out every
//! payload struct.
//!
//! # Example
//!
//! ```
//! use metro::ast::build::*;
//!
//! // for i in 0..3 { println(i); }
//! let program = block(vec![for_(
//!     var("i"),
//!     range(int(0), int(3)),
//!     block(vec![call("println", vec![var("i")])]),
//! )]);
//! assert_eq!(program.kind.name(), "scope");
//! ```

use std::sync::Arc;

use super::*;

fn boxed(node: Node) -> Box<Node> {
    Box::new(node)
}

// ═══════════════════════════════════════════════════════════════════════
// Literals
// ═══════════════════════════════════════════════════════════════════════

/// `none`
pub fn none() -> Node {
    Node::new(NodeKind::None)
}

/// `true` / `false`
pub fn boolean(value: bool) -> Node {
    Node::new(if value { NodeKind::True } else { NodeKind::False })
}

/// Integer literal
pub fn int(value: i64) -> Node {
    Node::new(NodeKind::Value(Literal::Int(value)))
}

/// Float literal
pub fn float(value: f32) -> Node {
    Node::new(NodeKind::Value(Literal::Float(value)))
}

/// Character literal
pub fn chr(value: char) -> Node {
    Node::new(NodeKind::Value(Literal::Char(value)))
}

/// String literal
pub fn string(value: &str) -> Node {
    Node::new(NodeKind::Value(Literal::String(value.to_string())))
}

/// `[items...]`, or `[]` when empty
pub fn list(items: Vec<Node>) -> Node {
    if items.is_empty() {
        Node::new(NodeKind::EmptyList)
    } else {
        Node::new(NodeKind::List(items))
    }
}

/// `(items...)`
pub fn tuple(items: Vec<Node>) -> Node {
    Node::new(NodeKind::Tuple(items))
}

/// `@`
pub fn self_func() -> Node {
    Node::new(NodeKind::SelfFunc)
}

// ═══════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════

/// Variable reference
pub fn var(name: &str) -> Node {
    Node::new(NodeKind::Variable(Ident::new(name)))
}

/// `lhs op rhs`
pub fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Node {
    Node::new(NodeKind::Binary(BinaryExpr {
        op,
        lhs: boxed(lhs),
        rhs: boxed(rhs),
    }))
}

/// `lhs + rhs`
pub fn add(lhs: Node, rhs: Node) -> Node {
    binary(BinaryOp::Add, lhs, rhs)
}

/// `lhs - rhs`
pub fn sub(lhs: Node, rhs: Node) -> Node {
    binary(BinaryOp::Sub, lhs, rhs)
}

/// `lhs * rhs`
pub fn mul(lhs: Node, rhs: Node) -> Node {
    binary(BinaryOp::Mul, lhs, rhs)
}

/// `lhs / rhs`
pub fn div(lhs: Node, rhs: Node) -> Node {
    binary(BinaryOp::Div, lhs, rhs)
}

/// `lhs % rhs`
pub fn rem(lhs: Node, rhs: Node) -> Node {
    binary(BinaryOp::Mod, lhs, rhs)
}

/// `lhs op rhs` for comparisons
pub fn compare(op: CompareOp, lhs: Node, rhs: Node) -> Node {
    Node::new(NodeKind::Compare(CompareExpr {
        op,
        lhs: boxed(lhs),
        rhs: boxed(rhs),
    }))
}

/// `lhs < rhs`
pub fn lt(lhs: Node, rhs: Node) -> Node {
    compare(CompareOp::Less, lhs, rhs)
}

/// `lhs > rhs`
pub fn gt(lhs: Node, rhs: Node) -> Node {
    compare(CompareOp::Bigger, lhs, rhs)
}

/// `lhs == rhs`
pub fn eq(lhs: Node, rhs: Node) -> Node {
    compare(CompareOp::Equal, lhs, rhs)
}

/// `lhs != rhs`
pub fn ne(lhs: Node, rhs: Node) -> Node {
    compare(CompareOp::NotEqual, lhs, rhs)
}

/// `begin..end`
pub fn range(begin: Node, end: Node) -> Node {
    Node::new(NodeKind::Range(RangeExpr {
        begin: boxed(begin),
        end: boxed(end),
    }))
}

/// `target[index]`
pub fn subscript(target: Node, index: Node) -> Node {
    Node::new(NodeKind::Subscript(SubscriptExpr {
        target: boxed(target),
        index: boxed(index),
    }))
}

/// `target = value`
pub fn assign(target: Node, value: Node) -> Node {
    Node::new(NodeKind::Assign(AssignExpr {
        target: boxed(target),
        value: boxed(value),
    }))
}

/// `functor(args...)`
pub fn call_expr(functor: Node, args: Vec<Node>) -> Node {
    Node::new(NodeKind::Callfunc(CallExpr {
        functor: boxed(functor),
        args,
    }))
}

/// `name(args...)`
pub fn call(name: &str, args: Vec<Node>) -> Node {
    call_expr(var(name), args)
}

// ═══════════════════════════════════════════════════════════════════════
// Statements
// ═══════════════════════════════════════════════════════════════════════

/// `{ statements... }`
pub fn block(statements: Vec<Node>) -> Node {
    Node::new(NodeKind::Scope(statements))
}

/// `let name = init`
pub fn let_(name: &str, init: Node) -> Node {
    Node::new(NodeKind::Let(LetStmt {
        name: Ident::new(name),
        ty: None,
        init: Some(boxed(init)),
    }))
}

/// `let name`
pub fn let_uninit(name: &str) -> Node {
    Node::new(NodeKind::Let(LetStmt {
        name: Ident::new(name),
        ty: None,
        init: None,
    }))
}

/// `if cond { then } else { otherwise }`
pub fn if_(cond: Node, then_branch: Node, else_branch: Option<Node>) -> Node {
    Node::new(NodeKind::If(IfExpr {
        cond: boxed(cond),
        then_branch: boxed(then_branch),
        else_branch: else_branch.map(boxed),
    }))
}

/// `for iterator in iterable { body }`
pub fn for_(iterator: Node, iterable: Node, body: Node) -> Node {
    Node::new(NodeKind::For(ForLoop {
        iterator: boxed(iterator),
        iterable: boxed(iterable),
        body: boxed(body),
    }))
}

/// `while cond { body }`
pub fn while_(cond: Node, body: Node) -> Node {
    Node::new(NodeKind::While(WhileLoop {
        cond: boxed(cond),
        body: boxed(body),
    }))
}

/// `break [value]`
pub fn break_(value: Option<Node>) -> Node {
    Node::new(NodeKind::Break(value.map(boxed)))
}

/// `continue`
pub fn continue_() -> Node {
    Node::new(NodeKind::Continue)
}

/// `return [value]`
pub fn return_(value: Option<Node>) -> Node {
    Node::new(NodeKind::Return(value.map(boxed)))
}

/// Positional parameter
pub fn param(name: &str) -> Param {
    Param {
        name: Ident::new(name),
        ty: None,
        variadic: false,
    }
}

/// `...name` parameter
pub fn variadic(name: &str) -> Param {
    Param {
        name: Ident::new(name),
        ty: None,
        variadic: true,
    }
}

/// `fn name(params) { body }`
pub fn function(name: &str, params: Vec<Param>, body: Node) -> Node {
    Node::new(NodeKind::Function(Arc::new(FunctionDecl {
        name: Ident::new(name),
        params,
        return_type: None,
        body,
    })))
}
