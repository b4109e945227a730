//! Tree-walking interpreter
//!
//! Evaluates decoded programs against a chain of environment frames. Calls
//! in tail position reuse the caller's frame, so tail-recursive functions
//! run in constant frame depth.

mod builtins;
mod env;
mod error;
mod eval;
mod value;

pub use builtins::{registry, Builtin, BuiltinFn, OutputBuffer};
pub use env::{child_env, EnvRef, Environment};
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::Interpreter;
pub(crate) use eval::{STACK_GROW_SIZE, STACK_RED_ZONE};
pub use value::{Function, Value};
