//! Wire document reader
//!
//! A wire document is the literal form an external producer uses to hand an
//! AST to the evaluator: JSON, or the relaxed object-literal notation with
//! unquoted keys, bare tokens, trailing commas and an optional final `;`.
//! Reading stops at a generic literal tree; `ast::decode` gives it meaning.

use crate::ast::{Span, Spanned};
use crate::error::{Error, Result};
use crate::lexer::{tokenize, Token};
use std::mem;

lalrpop_util::lalrpop_mod!(
    #[allow(clippy::all)]
    grammar,
    "/wire/grammar.rs"
);

/// Generic literal value of a wire document
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    /// Quoted string
    Str(String),
    /// Unquoted token in value position (`exprstmt`, `cond`, `true`, ...)
    Bare(String),
    Array(Vec<Spanned<Literal>>),
    /// Members in document order
    Object(Vec<(Spanned<String>, Spanned<Literal>)>),
}

// Children are dropped from a work list, not recursively.
impl Drop for Literal {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut lit) = pending.pop() {
            lit.take_children(&mut pending);
        }
    }
}

impl Literal {
    fn take_children(&mut self, out: &mut Vec<Literal>) {
        match self {
            Literal::Array(items) => out.extend(mem::take(items).into_iter().map(|item| item.node)),
            Literal::Object(members) => {
                out.extend(mem::take(members).into_iter().map(|(_, value)| value.node))
            }
            Literal::Int(_) | Literal::Str(_) | Literal::Bare(_) => {}
        }
    }

    /// Human-readable kind for error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Literal::Int(_) => "integer",
            Literal::Str(_) => "string",
            Literal::Bare(_) => "bare token",
            Literal::Array(_) => "array",
            Literal::Object(_) => "object",
        }
    }
}

/// Read a wire document into a literal tree
pub fn read(source: &str) -> Result<Spanned<Literal>> {
    let tokens = tokenize(source)?;
    parse_tokens(tokens)
}

fn parse_tokens(tokens: Vec<(Token, Span)>) -> Result<Spanned<Literal>> {
    let token_iter = tokens
        .into_iter()
        .map(|(tok, span)| (span.start, tok, span.end));

    grammar::DocumentParser::new()
        .parse(token_iter)
        .map_err(|e| {
            let span = match &e {
                lalrpop_util::ParseError::InvalidToken { location } => {
                    Span::new(*location, *location + 1)
                }
                lalrpop_util::ParseError::UnrecognizedEof { location, .. } => {
                    Span::new(*location, *location)
                }
                lalrpop_util::ParseError::UnrecognizedToken { token, .. } => {
                    Span::new(token.0, token.2)
                }
                lalrpop_util::ParseError::ExtraToken { token } => Span::new(token.0, token.2),
                lalrpop_util::ParseError::User { .. } => Span::new(0, 1),
            };
            Error::reader(format!("{e}"), span)
        })
}
