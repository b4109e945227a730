//! Host-provided functions
//!
//! The registry is installed into the global frame before any statement
//! runs. Built-ins write through the interpreter's output sink, never to
//! stdout directly.

use super::error::{InterpResult, RuntimeError};
use super::value::Value;
use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

/// Builtin function type
pub type BuiltinFn = fn(&mut dyn Write, &[Value]) -> InterpResult<Value>;

/// A named host function
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    /// `None` for variadic functions
    pub arity: Option<usize>,
    pub func: BuiltinFn,
}

impl Builtin {
    pub const fn new(name: &'static str, arity: Option<usize>, func: BuiltinFn) -> Self {
        Builtin { name, arity, func }
    }

    /// Check arity, then run
    pub fn call(&self, out: &mut dyn Write, args: &[Value]) -> InterpResult<Value> {
        if let Some(expected) = self.arity {
            if expected != args.len() {
                return Err(RuntimeError::arity_mismatch(self.name, expected, args.len()));
            }
        }
        (self.func)(out, args)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// In-memory output sink whose clones share one buffer, for capturing what
/// a program prints
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer(Rc<RefCell<Vec<u8>>>);

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// The default registry
pub fn registry() -> Vec<Builtin> {
    vec![
        Builtin::new("print", None, builtin_print),
        Builtin::new("println", None, builtin_println),
        Builtin::new("str", Some(1), builtin_str),
        Builtin::new("int", Some(1), builtin_int),
    ]
}

fn write_all(out: &mut dyn Write, args: &[Value]) -> InterpResult<()> {
    for arg in args {
        write!(out, "{arg}").map_err(|e| RuntimeError::io_error(&e.to_string()))?;
    }
    Ok(())
}

/// print(v1, v2, ...) writes each value with no separators
fn builtin_print(out: &mut dyn Write, args: &[Value]) -> InterpResult<Value> {
    write_all(out, args)?;
    out.flush().map_err(|e| RuntimeError::io_error(&e.to_string()))?;
    Ok(Value::Nil)
}

fn builtin_println(out: &mut dyn Write, args: &[Value]) -> InterpResult<Value> {
    write_all(out, args)?;
    writeln!(out).map_err(|e| RuntimeError::io_error(&e.to_string()))?;
    Ok(Value::Nil)
}

fn builtin_str(_out: &mut dyn Write, args: &[Value]) -> InterpResult<Value> {
    Ok(Value::str(args[0].to_string()))
}

/// int(v): integers pass through, decimal strings are parsed, booleans map to 0/1
fn builtin_int(_out: &mut dyn Write, args: &[Value]) -> InterpResult<Value> {
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| RuntimeError::type_mismatch("decimal integer string", &format!("{s:?}"))),
        other => Err(RuntimeError::type_mismatch("int, string or bool", other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::ErrorKind;

    fn lookup(name: &str) -> Builtin {
        registry().into_iter().find(|b| b.name == name).unwrap()
    }

    fn run(name: &str, args: &[Value]) -> (InterpResult<Value>, String) {
        let mut out = Vec::new();
        let result = lookup(name).call(&mut out, args);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_print_concatenates_without_separators() {
        let (result, out) = run("print", &[Value::Int(832040), Value::str("\n")]);
        assert_eq!(result.unwrap(), Value::Nil);
        assert_eq!(out, "832040\n");
    }

    #[test]
    fn test_print_no_args() {
        let (result, out) = run("print", &[]);
        assert!(result.is_ok());
        assert_eq!(out, "");
    }

    #[test]
    fn test_println_appends_newline() {
        let (_, out) = run("println", &[Value::str("a"), Value::Bool(false)]);
        assert_eq!(out, "afalse\n");
    }

    #[test]
    fn test_str() {
        let (result, _) = run("str", &[Value::Int(55)]);
        assert_eq!(result.unwrap(), Value::str("55"));
    }

    #[test]
    fn test_int_conversions() {
        assert_eq!(run("int", &[Value::str(" 42 ")]).0.unwrap(), Value::Int(42));
        assert_eq!(run("int", &[Value::Bool(true)]).0.unwrap(), Value::Int(1));
        assert_eq!(run("int", &[Value::Int(-3)]).0.unwrap(), Value::Int(-3));
    }

    #[test]
    fn test_int_rejects_garbage() {
        let err = run("int", &[Value::str("forty")]).0.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        let err = run("int", &[Value::Nil]).0.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_fixed_arity_checked() {
        let err = run("str", &[]).0.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
        let err = run("int", &[Value::Int(1), Value::Int(2)]).0.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
    }

    #[test]
    fn test_output_buffer_shared_between_clones() {
        let buffer = OutputBuffer::new();
        let mut writer = buffer.clone();
        builtin_print(&mut writer, &[Value::str("fib"), Value::Int(10)]).unwrap();
        assert_eq!(buffer.contents(), "fib10");
    }

    #[test]
    fn test_registry_names_unique() {
        let mut names: Vec<_> = registry().iter().map(|b| b.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), registry().len());
    }
}
