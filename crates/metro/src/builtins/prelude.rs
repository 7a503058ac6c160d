//! Standard prelude with built-in functions

use super::Builtins;
use crate::error::{ErrorKind, Result};
use crate::types::TypeKind;
use crate::value::{BuiltinFn, CallSite, ObjectRef, Signature, Value};

impl Builtins {
    /// Load the standard prelude into this table.
    pub fn load_prelude(&mut self) {
        // Printing
        self.register(BuiltinFn::new(
            "print",
            Signature::new([TypeKind::Args]),
            builtin_print,
        ));

        self.register(BuiltinFn::new(
            "println",
            Signature::new([TypeKind::Args]),
            builtin_println,
        ));

        self.register(BuiltinFn::new(
            "printf",
            Signature::new([TypeKind::String, TypeKind::Args]),
            builtin_printf,
        ));

        // Strings
        self.register(BuiltinFn::new(
            "format",
            Signature::new([TypeKind::String, TypeKind::Args]),
            builtin_format,
        ));

        // Numbers
        self.register(BuiltinFn::new(
            "abs",
            Signature::new([TypeKind::Int]),
            builtin_abs,
        ));

        // Vectors
        self.register(BuiltinFn::new(
            "append",
            Signature::new([TypeKind::Vector, TypeKind::Args]),
            builtin_append,
        ));

        self.register(BuiltinFn::new(
            "vector",
            Signature::new([TypeKind::Range]),
            builtin_vector,
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Function Implementations
// ═══════════════════════════════════════════════════════════════════════

fn write_all(site: &mut CallSite<'_>, args: &[ObjectRef]) -> i64 {
    let mut written = 0;
    for arg in args {
        let text = arg.to_string();
        written += text.chars().count() as i64;
        site.write_str(&text);
    }
    written
}

fn builtin_print(site: &mut CallSite<'_>, args: &[ObjectRef]) -> Result<ObjectRef> {
    let written = write_all(site, args);
    Ok(site.heap.alloc(Value::Int(written)))
}

fn builtin_println(site: &mut CallSite<'_>, args: &[ObjectRef]) -> Result<ObjectRef> {
    let written = write_all(site, args);
    site.write_str("\n");
    Ok(site.heap.alloc(Value::Int(written + 1)))
}

/// Substitute each `{}` in the first argument with the next argument.
fn render(site: &CallSite<'_>, args: &[ObjectRef]) -> Result<Vec<char>> {
    let template: Vec<char> = match &*args[0].read() {
        Value::String(s) => s.clone(),
        _ => return Err(site.error(ErrorKind::IllegalFunctionCall)),
    };

    let mut rest = args[1..].iter();
    let mut out = Vec::with_capacity(template.len());
    let mut i = 0;

    while i < template.len() {
        if template[i] == '{' && template.get(i + 1) == Some(&'}') {
            let arg = rest.next().ok_or_else(|| {
                site.error(ErrorKind::TooFewArguments)
                    .suggest(site.span, "more `{}` placeholders than arguments")
            })?;
            out.extend(arg.to_string().chars());
            i += 2;
        } else {
            out.push(template[i]);
            i += 1;
        }
    }

    Ok(out)
}

fn builtin_format(site: &mut CallSite<'_>, args: &[ObjectRef]) -> Result<ObjectRef> {
    let text = render(site, args)?;
    Ok(site.heap.alloc(Value::String(text)))
}

fn builtin_printf(site: &mut CallSite<'_>, args: &[ObjectRef]) -> Result<ObjectRef> {
    let text = render(site, args)?;
    let len = text.len() as i64;
    site.write_str(&text.into_iter().collect::<String>());
    Ok(site.heap.alloc(Value::Int(len)))
}

fn builtin_abs(site: &mut CallSite<'_>, args: &[ObjectRef]) -> Result<ObjectRef> {
    let n = args[0]
        .read()
        .as_int()
        .ok_or_else(|| site.error(ErrorKind::IllegalFunctionCall))?;
    let abs = n
        .checked_abs()
        .ok_or_else(|| site.error(ErrorKind::ValueOutOfRange))?;
    Ok(site.heap.alloc(Value::Int(abs)))
}

fn builtin_append(site: &mut CallSite<'_>, args: &[ObjectRef]) -> Result<ObjectRef> {
    if args.len() < 2 {
        return Err(site
            .error(ErrorKind::TooFewArguments)
            .suggest(site.span, "nothing to append"));
    }

    // Copies are taken before locking the target, which may be an argument too.
    let items: Vec<ObjectRef> = args[1..].iter().map(|x| x.clone_in(site.heap)).collect();

    match &mut *args[0].write() {
        Value::Vector(elements) => elements.extend(items),
        _ => return Err(site.error(ErrorKind::IllegalFunctionCall)),
    }

    Ok(args[0].clone_in(site.heap))
}

fn builtin_vector(site: &mut CallSite<'_>, args: &[ObjectRef]) -> Result<ObjectRef> {
    let range = match &*args[0].read() {
        Value::Range(r) => *r,
        _ => return Err(site.error(ErrorKind::IllegalFunctionCall)),
    };

    let len = range.bounded_len().ok_or_else(|| {
        site.error(ErrorKind::ValueOutOfRange)
            .suggest(site.span, format!("{} has too many elements", Value::Range(range)))
    })?;

    let mut elements = Vec::with_capacity(len);
    elements.extend((range.begin..range.end).map(|n| site.heap.alloc(Value::Int(n))));
    Ok(site.heap.alloc(Value::Vector(elements)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::Heap;
    use crate::value::Range;

    fn call(name: &str, args: &[ObjectRef]) -> (Result<ObjectRef>, String) {
        let heap = Heap::new(None);
        let mut out = Vec::new();
        let builtins = Builtins::with_prelude();
        let result = {
            let mut site = CallSite {
                span: None,
                heap: &heap,
                out: &mut out,
            };
            builtins.get(name).unwrap().call(&mut site, args)
        };
        (result, String::from_utf8(out).unwrap())
    }

    fn obj(value: impl Into<Value>) -> ObjectRef {
        ObjectRef::detached(value.into())
    }

    #[test]
    fn test_print_counts_chars() {
        let (ret, out) = call("print", &[obj("héllo"), obj(12i64)]);
        assert_eq!(out, "héllo12");
        assert_eq!(ret.unwrap(), Value::Int(7));
    }

    #[test]
    fn test_println_adds_newline() {
        let (ret, out) = call("println", &[obj(1.5f32)]);
        assert_eq!(out, "1.5\n");
        assert_eq!(ret.unwrap(), Value::Int(4));
    }

    #[test]
    fn test_format_placeholders() {
        let (ret, _) = call("format", &[obj("{} + {} = {}"), obj(1i64), obj(2i64), obj(3i64)]);
        assert_eq!(ret.unwrap(), Value::string("1 + 2 = 3"));

        let (ret, _) = call("format", &[obj("{x}")]);
        assert_eq!(ret.unwrap(), Value::string("{x}"));
    }

    #[test]
    fn test_format_missing_argument() {
        let (ret, _) = call("format", &[obj("{} {}"), obj(1i64)]);
        assert_eq!(ret.unwrap_err().kind, ErrorKind::TooFewArguments);
    }

    #[test]
    fn test_printf_returns_length() {
        let (ret, out) = call("printf", &[obj("<{}>"), obj('c')]);
        assert_eq!(out, "<c>");
        assert_eq!(ret.unwrap(), Value::Int(3));
    }

    #[test]
    fn test_abs() {
        let (ret, _) = call("abs", &[obj(-4i64)]);
        assert_eq!(ret.unwrap(), Value::Int(4));

        let (ret, _) = call("abs", &[obj(i64::MIN)]);
        assert_eq!(ret.unwrap_err().kind, ErrorKind::ValueOutOfRange);

        let (ret, _) = call("abs", &[obj(1.0f32)]);
        assert_eq!(ret.unwrap_err().kind, ErrorKind::IllegalFunctionCall);
    }

    #[test]
    fn test_append_mutates_in_place() {
        let v = obj(Value::Vector(vec![]));
        let (ret, _) = call("append", &[v.clone(), obj(1i64), obj(2i64)]);
        let ret = ret.unwrap();

        assert_eq!(v.to_string(), "[1, 2]");
        assert_eq!(ret, v);
        assert!(!ret.ptr_eq(&v));
    }

    #[test]
    fn test_append_to_itself() {
        let v = obj(Value::Vector(vec![obj(1i64)]));
        let (ret, _) = call("append", &[v.clone(), v.clone()]);
        assert!(ret.is_ok());
        assert_eq!(v.to_string(), "[1, [1]]");
    }

    #[test]
    fn test_append_needs_items() {
        let (ret, _) = call("append", &[obj(Value::Vector(vec![]))]);
        assert_eq!(ret.unwrap_err().kind, ErrorKind::TooFewArguments);
    }

    #[test]
    fn test_vector_from_range() {
        let (ret, _) = call("vector", &[obj(Range::new(2, 5))]);
        assert_eq!(ret.unwrap().to_string(), "[2, 3, 4]");

        let (ret, _) = call("vector", &[obj(Range::new(5, 2))]);
        assert_eq!(ret.unwrap().to_string(), "[]");
    }

    #[test]
    fn test_vector_too_long() {
        let (ret, _) = call("vector", &[obj(Range::new(0, i64::MAX))]);
        assert_eq!(ret.unwrap_err().kind, ErrorKind::ValueOutOfRange);

        let (ret, _) = call("vector", &[obj(Range::new(i64::MIN, i64::MAX))]);
        assert_eq!(ret.unwrap_err().kind, ErrorKind::ValueOutOfRange);
    }
}
