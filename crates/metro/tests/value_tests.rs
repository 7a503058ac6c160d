use metro::ast::build::*;
use metro::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn heap() -> (Collector, Heap) {
    let collector = Collector::start(&GcConfig::default().with_background(false));
    let heap = collector.heap();
    (collector, heap)
}

// ═══════════════════════════════════════════════════════════════════════
// Kinds and Types
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_kinds() {
    assert_eq!(Value::None.kind(), TypeKind::None);
    assert_eq!(Value::Int(1).kind(), TypeKind::Int);
    assert_eq!(Value::Float(1.0).kind(), TypeKind::Float);
    assert_eq!(Value::string("s").kind(), TypeKind::String);
    assert_eq!(Value::Range(Range::new(0, 1)).kind(), TypeKind::Range);
    assert_eq!(Value::Vector(Vec::new()).kind(), TypeKind::Vector);
}

#[test]
fn test_tuple_type_records_elements() {
    let (_gc, heap) = heap();
    let tuple = Value::Tuple(vec![heap.alloc(Value::Int(1)), heap.alloc(Value::Bool(true))]);
    let ty = tuple.type_of();
    assert_eq!(ty.kind, TypeKind::Tuple);
    assert_eq!(
        ty.elements.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![TypeKind::Int, TypeKind::Bool]
    );
}

#[test]
fn test_type_equality_is_by_kind() {
    let a = Type::new(TypeKind::Vector);
    let b = Type::with_elements(TypeKind::Vector, vec![Type::new(TypeKind::Int)]);
    assert!(a.equals(&b));
    assert!(!a.equals(TypeKind::Int));
}

// ═══════════════════════════════════════════════════════════════════════
// Display
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_display() {
    let (_gc, heap) = heap();
    assert_eq!(Value::None.to_string(), "none");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::Int(-3).to_string(), "-3");
    assert_eq!(Value::Float(2.0).to_string(), "2.0");
    assert_eq!(Value::Float(0.125).to_string(), "0.125");
    assert_eq!(Value::string("hi").to_string(), "hi");
    assert_eq!(Value::Range(Range::new(1, 4)).to_string(), "range(1, 4)");

    let nested = Value::Vector(vec![
        heap.alloc(Value::Int(1)),
        heap.alloc(Value::Tuple(vec![heap.alloc(Value::Char('c'))])),
    ]);
    assert_eq!(nested.to_string(), "[1, (c)]");
}

#[test]
fn test_user_function_display() {
    let mut ev = Evaluator::new(EvalContext::new().with_gc(GcConfig::default().with_background(false)));
    let f = ev.eval(&function("f", vec![], block(vec![]))).unwrap();
    assert!(f.to_string().starts_with("<func 0x"));
}

// ═══════════════════════════════════════════════════════════════════════
// Equality and Conversions
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_structural_equality() {
    let (_gc, heap) = heap();
    let a = Value::Vector(vec![heap.alloc(Value::Int(1)), heap.alloc(Value::string("x"))]);
    let b = Value::Vector(vec![heap.alloc(Value::Int(1)), heap.alloc(Value::string("x"))]);
    let c = Value::Vector(vec![heap.alloc(Value::Int(1))]);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_conversions() {
    assert_eq!(Value::from(3i64), Value::Int(3));
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from("ab"), Value::string("ab"));
    assert_eq!(Value::from(Range::new(0, 2)), Value::Range(Range::new(0, 2)));

    assert_eq!(Value::Int(3).as_int(), Some(3));
    assert_eq!(Value::Float(1.5).as_float(), Some(1.5));
    assert_eq!(Value::Int(3).as_float(), None);
    assert_eq!(Value::Bool(true).as_int(), None);
    assert_eq!(Value::string("ab").as_string(), Some("ab".to_string()));
}

#[test]
fn test_len() {
    let (_gc, heap) = heap();
    assert_eq!(Value::string("héllo").len(), Some(5));
    assert_eq!(Value::Vector(vec![heap.alloc(Value::None)]).len(), Some(1));
    assert_eq!(Value::Range(Range::new(2, 5)).len(), Some(3));
    assert_eq!(Value::Int(1).len(), None);
}

#[test]
fn test_range_len() {
    assert_eq!(Range::new(0, 3).len(), 3);
    assert_eq!(Range::new(3, 0).len(), 0);
    assert!(Range::new(2, 2).is_empty());
}

// ═══════════════════════════════════════════════════════════════════════
// Objects
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_clone_in_is_deep() {
    let (_gc, heap) = heap();
    let inner = heap.alloc(Value::Int(1));
    let original = heap.alloc(Value::Vector(vec![inner.clone()]));
    let copy = original.clone_in(&heap);

    assert_eq!(copy, original);
    assert!(!copy.ptr_eq(&original));
    assert!(heap.contains(&copy));

    *inner.write() = Value::Int(2);
    assert_eq!(original.to_string(), "[2]");
    assert_eq!(copy.to_string(), "[1]");
}

#[test]
fn test_write_is_visible_through_every_handle() {
    let (_gc, heap) = heap();
    let a = heap.alloc(Value::Int(1));
    let b = a.clone();
    *b.write() = Value::string("changed");
    assert_eq!(a, Value::string("changed"));
    assert!(a.ptr_eq(&b));
}

#[test]
fn test_ref_count_follows_bindings() {
    let (_gc, heap) = heap();
    let object = heap.alloc(Value::Int(1));
    let mut env = Environment::new();

    env.define("a", object.clone());
    env.enter_scope(ScopeKind::Block, Vec::new());
    env.define("b", object.clone());
    assert_eq!(object.ref_count(), 2);

    env.leave_scope();
    assert_eq!(object.ref_count(), 1);
}

#[derive(Debug, Clone)]
enum Item {
    Int(i64),
    Bool(bool),
    Text(String),
}

impl From<Item> for Value {
    fn from(item: Item) -> Self {
        match item {
            Item::Int(n) => Value::Int(n),
            Item::Bool(b) => Value::Bool(b),
            Item::Text(s) => Value::string(&s),
        }
    }
}

fn item() -> impl Strategy<Value = Item> {
    prop_oneof![
        any::<i64>().prop_map(Item::Int),
        any::<bool>().prop_map(Item::Bool),
        "[a-z]{0,8}".prop_map(Item::Text),
    ]
}

proptest! {
    #[test]
    fn prop_clone_in_equals_original(items in prop::collection::vec(item(), 0..8)) {
        let (_gc, heap) = heap();
        let elements = items.into_iter().map(|v| heap.alloc(v.into())).collect();
        let original = heap.alloc(Value::Vector(elements));
        let copy = original.clone_in(&heap);

        prop_assert_eq!(&copy, &original);
        prop_assert_eq!(copy.to_string(), original.to_string());
    }

    #[test]
    fn prop_int_display_matches_rust(n in any::<i64>()) {
        prop_assert_eq!(Value::Int(n).to_string(), n.to_string());
    }
}
