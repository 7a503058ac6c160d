use std::io::{self, Write};
use std::sync::Arc;

use metro::ast::build::*;
use metro::ast::Node;
use metro::*;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

#[derive(Clone, Default)]
struct Output(Arc<Mutex<Vec<u8>>>);

impl Output {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn evaluator() -> (Evaluator, Output) {
    let out = Output::default();
    let ev = Evaluator::new(EvalContext::new().with_gc(GcConfig::default().with_background(false)))
        .with_output(out.clone());
    (ev, out)
}

fn println(arg: Node) -> Node {
    call("println", vec![arg])
}

// ═══════════════════════════════════════════════════════════════════════
// If
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_if_only_evaluates_taken_branch() {
    let (mut ev, out) = evaluator();
    let program = if_(
        lt(int(1), int(2)),
        println(string("yes")),
        Some(println(string("no"))),
    );
    ev.eval(&program).unwrap();
    assert_eq!(out.text(), "yes\n");
}

#[test]
fn test_if_value() {
    let (mut ev, _) = evaluator();
    let program = if_(boolean(true), block(vec![int(1), int(2)]), None);
    assert_eq!(ev.eval(&program).unwrap(), Value::Int(2));
}

// ═══════════════════════════════════════════════════════════════════════
// For
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_for_over_range() {
    let (mut ev, out) = evaluator();
    let program = for_(var("i"), range(int(0), int(3)), block(vec![println(var("i"))]));
    assert_eq!(ev.eval(&program).unwrap(), Value::None);
    assert_eq!(out.text(), "0\n1\n2\n");
}

#[test]
fn test_for_over_vector() {
    let (mut ev, out) = evaluator();
    let program = for_(
        var("s"),
        list(vec![string("a"), string("b")]),
        block(vec![call("print", vec![var("s")])]),
    );
    ev.eval(&program).unwrap();
    assert_eq!(out.text(), "ab");
}

#[test]
fn test_for_iterates_a_snapshot() {
    let (mut ev, out) = evaluator();
    let program = block(vec![
        let_("v", list(vec![int(1), int(2)])),
        for_(
            var("x"),
            var("v"),
            block(vec![
                call("append", vec![var("v"), var("x")]),
                call("print", vec![var("x")]),
            ]),
        ),
        var("v"),
    ]);
    assert_eq!(ev.eval(&program).unwrap().to_string(), "[1, 2, 1, 2]");
    assert_eq!(out.text(), "12");
}

#[test]
fn test_for_break_value() {
    let (mut ev, _) = evaluator();
    let program = for_(
        var("i"),
        range(int(0), int(10)),
        block(vec![if_(
            eq(var("i"), int(4)),
            block(vec![break_(Some(int(99)))]),
            None,
        )]),
    );
    assert_eq!(ev.eval(&program).unwrap(), Value::Int(99));
}

#[test]
fn test_break_stops_traversal() {
    let (mut ev, out) = evaluator();
    let program = for_(
        var("i"),
        range(int(0), int(10)),
        block(vec![
            if_(eq(var("i"), int(2)), break_(None), None),
            call("print", vec![var("i")]),
        ]),
    );
    ev.eval(&program).unwrap();
    assert_eq!(out.text(), "01");
}

#[test]
fn test_continue_skips_rest_of_body() {
    let (mut ev, out) = evaluator();
    let program = for_(
        var("i"),
        range(int(0), int(5)),
        block(vec![
            if_(eq(rem(var("i"), int(2)), int(1)), continue_(), None),
            call("print", vec![var("i")]),
        ]),
    );
    ev.eval(&program).unwrap();
    assert_eq!(out.text(), "024");
}

#[test]
fn test_break_only_leaves_inner_loop() {
    let (mut ev, out) = evaluator();
    let program = for_(
        var("i"),
        range(int(0), int(2)),
        block(vec![for_(
            var("j"),
            range(int(0), int(5)),
            block(vec![
                if_(eq(var("j"), int(1)), break_(None), None),
                call("print", vec![tuple(vec![var("i"), var("j")])]),
            ]),
        )]),
    );
    ev.eval(&program).unwrap();
    assert_eq!(out.text(), "(0, 0)(1, 0)");
}

#[test]
fn test_for_into_subscript() {
    let (mut ev, _) = evaluator();
    let program = block(vec![
        let_("v", list(vec![int(0)])),
        for_(subscript(var("v"), int(0)), range(int(5), int(8)), block(vec![])),
        var("v"),
    ]);
    assert_eq!(ev.eval(&program).unwrap().to_string(), "[7]");
}

#[test]
fn test_loop_variable_is_scoped() {
    let (mut ev, _) = evaluator();
    let program = block(vec![
        for_(var("i"), range(int(0), int(1)), block(vec![])),
        var("i"),
    ]);
    assert_eq!(ev.eval(&program).unwrap_err().kind, ErrorKind::UndefinedVariable);
}

#[test]
fn test_body_let_slot_is_reused() {
    let (mut ev, out) = evaluator();
    let program = for_(
        var("i"),
        range(int(0), int(3)),
        block(vec![let_("sq", mul(var("i"), var("i"))), call("print", vec![var("sq")])]),
    );
    ev.eval(&program).unwrap();
    assert_eq!(out.text(), "014");
    assert_eq!(ev.env().depth(), 1);
}

// ═══════════════════════════════════════════════════════════════════════
// While
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_while_with_break() {
    let (mut ev, _) = evaluator();
    let program = block(vec![
        let_("n", int(0)),
        while_(
            boolean(true),
            block(vec![
                assign(var("n"), add(var("n"), int(1))),
                if_(gt(var("n"), int(3)), break_(Some(var("n"))), None),
            ]),
        ),
    ]);
    assert_eq!(ev.eval(&program).unwrap(), Value::Int(4));
}

// ═══════════════════════════════════════════════════════════════════════
// Functions
// ═══════════════════════════════════════════════════════════════════════

fn factorial() -> Node {
    function(
        "fact",
        vec![param("n")],
        block(vec![
            if_(lt(var("n"), int(2)), return_(Some(int(1))), None),
            mul(var("n"), call("fact", vec![sub(var("n"), int(1))])),
        ]),
    )
}

#[test]
fn test_recursion() {
    let (mut ev, _) = evaluator();
    let program = block(vec![factorial(), call("fact", vec![int(10)])]);
    assert_eq!(ev.eval(&program).unwrap(), Value::Int(3_628_800));
    assert_eq!(ev.env().call_depth(), 0);
}

#[test]
fn test_anonymous_recursion_with_self_func() {
    let (mut ev, _) = evaluator();
    let fib = function(
        "fib",
        vec![param("n")],
        block(vec![
            if_(lt(var("n"), int(2)), return_(Some(var("n"))), None),
            add(
                call_expr(self_func(), vec![sub(var("n"), int(1))]),
                call_expr(self_func(), vec![sub(var("n"), int(2))]),
            ),
        ]),
    );
    let program = block(vec![fib, call("fib", vec![int(15)])]);
    assert_eq!(ev.eval(&program).unwrap(), Value::Int(610));
}

#[test]
fn test_return_from_inside_loop() {
    let (mut ev, out) = evaluator();
    let find = function(
        "find",
        vec![param("v"), param("target")],
        block(vec![
            for_(
                var("i"),
                range(int(0), int(100)),
                block(vec![
                    call("print", vec![var("i")]),
                    if_(
                        eq(subscript(var("v"), var("i")), var("target")),
                        return_(Some(var("i"))),
                        None,
                    ),
                ]),
            ),
            int(-1),
        ]),
    );
    let program = block(vec![
        find,
        call(
            "find",
            vec![list(vec![int(5), int(6), int(7)]), int(6)],
        ),
    ]);
    assert_eq!(ev.eval(&program).unwrap(), Value::Int(1));
    assert_eq!(out.text(), "01");
    assert_eq!(ev.env().depth(), 1);
}

#[test]
fn test_return_without_value() {
    let (mut ev, _) = evaluator();
    let program = block(vec![
        function("f", vec![], block(vec![return_(None), int(1)])),
        call("f", vec![]),
    ]);
    assert_eq!(ev.eval(&program).unwrap(), Value::None);
}

#[test]
fn test_callee_cannot_break_callers_loop() {
    let (mut ev, _) = evaluator();
    let program = block(vec![
        function("f", vec![], block(vec![break_(None)])),
        for_(var("i"), range(int(0), int(1)), block(vec![call("f", vec![])])),
    ]);
    assert_eq!(ev.eval(&program).unwrap_err().kind, ErrorKind::HereIsNotInsideOfLoop);
}

#[test]
fn test_function_as_value() {
    let (mut ev, _) = evaluator();
    let program = block(vec![
        function("inc", vec![param("x")], block(vec![add(var("x"), int(1))])),
        let_("g", var("inc")),
        call("g", vec![int(41)]),
    ]);
    assert_eq!(ev.eval(&program).unwrap(), Value::Int(42));
}

#[test]
fn test_nested_function_declaration() {
    let (mut ev, _) = evaluator();
    let program = block(vec![
        function(
            "outer",
            vec![],
            block(vec![
                function("inner", vec![], block(vec![int(7)])),
                call("inner", vec![]),
            ]),
        ),
        call("outer", vec![]),
    ]);
    assert_eq!(ev.eval(&program).unwrap(), Value::Int(7));
}

#[test]
fn test_variadic_sum() {
    let (mut ev, _) = evaluator();
    let sum = function(
        "sum",
        vec![variadic("xs")],
        block(vec![
            let_("total", int(0)),
            for_(
                var("x"),
                var("xs"),
                block(vec![assign(var("total"), add(var("total"), var("x")))]),
            ),
            var("total"),
        ]),
    );
    let program = block(vec![sum, call("sum", vec![int(1), int(2), int(3), int(4)])]);
    assert_eq!(ev.eval(&program).unwrap(), Value::Int(10));
}

#[test]
fn test_deep_recursion_overflows() {
    let mut ev = Evaluator::new(
        EvalContext::with_max_call_depth(50).with_gc(GcConfig::default().with_background(false)),
    );
    let program = block(vec![
        function("down", vec![param("n")], block(vec![call("down", vec![add(var("n"), int(1))])])),
        call("down", vec![int(0)]),
    ]);
    assert_eq!(ev.eval(&program).unwrap_err().kind, ErrorKind::StackOverflow);
    assert_eq!(ev.env().call_depth(), 0);
}
