//! Runtime errors for the interpreter

use crate::ast::Span;
use std::fmt;

/// Runtime error during decoding or interpretation
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    /// Location of the offending node in the wire document, when known
    pub span: Option<Span>,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Identifier or callee not bound in any frame
    UnboundName,
    /// Operator applied to incompatible values
    TypeMismatch,
    /// Argument count differs from the callable's parameter count
    ArityMismatch,
    /// Callee resolved to a value that cannot be called
    NotCallable,
    /// Wire object missing required fields or carrying invalid ones
    MalformedNode,
    /// Division or remainder by zero
    DivisionByZero,
    /// Non-tail recursion exceeded the configured depth
    StackOverflow,
    /// Writing program output failed
    Io,
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: String) -> Self {
        RuntimeError {
            kind,
            message,
            span: None,
        }
    }

    /// Attach a location unless one is already known
    pub fn with_span(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }

    pub fn unbound_name(name: &str) -> Self {
        Self::new(ErrorKind::UnboundName, format!("unbound name: {name}"))
    }

    pub fn type_mismatch(expected: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("type mismatch: expected {expected}, got {got}"),
        )
    }

    pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("function {name} expects {expected} argument(s), got {got}"),
        )
    }

    pub fn not_callable(name: &str, type_name: &str) -> Self {
        Self::new(
            ErrorKind::NotCallable,
            format!("{name} is a {type_name}, not a function"),
        )
    }

    pub fn malformed_node(detail: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::MalformedNode,
            format!("malformed node: {}", detail.into()),
        )
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero".to_string())
    }

    pub fn stack_overflow(limit: usize) -> Self {
        Self::new(
            ErrorKind::StackOverflow,
            format!("stack overflow: call depth exceeded {limit}"),
        )
    }

    pub fn io_error(msg: &str) -> Self {
        Self::new(ErrorKind::Io, format!("IO error: {msg}"))
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime error: {}", self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
