//! Arbor
//!
//! Reads an AST handed over as a wire document, decodes it into typed nodes
//! and evaluates it with a tree-walking interpreter that eliminates tail
//! calls.

pub mod ast;
pub mod config;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod wire;

pub use ast::{Program, Span};
pub use config::Config;
pub use error::{Error, Result};

/// Read and decode a wire document
pub fn load(source: &str) -> Result<Program> {
    let doc = wire::read(source)?;
    Ok(ast::decode_program(&doc)?)
}

/// Read, decode and run a wire document, writing output to `out`
pub fn run_source(source: &str, config: Config, out: impl std::io::Write + 'static) -> Result<()> {
    let program = load(source)?;
    let mut interp = interp::Interpreter::with_config(config).with_output(out);
    interp.run(&program)?;
    Ok(())
}
