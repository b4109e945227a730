//! Abstract Syntax Tree definitions

mod decode;
mod expr;
mod span;

pub use decode::{decode_program, Decoder};
pub use expr::*;
pub use span::*;

use crate::interp::{STACK_GROW_SIZE, STACK_RED_ZONE};
use serde_json::{json, Value as Json};

/// A top-level statement (`type: exprstmt`)
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub expr: Spanned<Node>,
    pub span: Span,
}

/// A program is an ordered sequence of top-level statements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

impl Program {
    /// Encode back into the JSON wire form
    pub fn to_json(&self) -> Json {
        Json::Array(self.stmts.iter().map(Stmt::to_json).collect())
    }
}

impl Stmt {
    pub fn to_json(&self) -> Json {
        json!({ "expr": self.expr.node.to_json(), "type": "exprstmt" })
    }
}

fn ident_json(name: &str) -> Json {
    json!({ "identifier": name })
}

impl Node {
    /// Encode this node in the JSON wire form
    pub fn to_json(&self) -> Json {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.to_json_inner())
    }

    fn to_json_inner(&self) -> Json {
        match self {
            Node::Int(n) => json!({ "integer": n }),
            Node::Str(s) => json!({ "string": s }),
            Node::Ident(name) => ident_json(name),
            Node::Binary { left, op, right } => json!({
                "left": left.node.to_json(),
                "right": right.node.to_json(),
                "op": op.to_string(),
            }),
            Node::Assign { name, value } => json!({
                "left": ident_json(&name.node),
                "right": value.node.to_json(),
                "op": "=",
            }),
            Node::FnDef { name, params, body } => {
                let params: Vec<Json> = params.iter().map(|p| ident_json(&p.node)).collect();
                json!({
                    "left": { "callee": ident_json(&name.node), "args": params, "op": "call" },
                    "right": body.node.to_json(),
                    "op": "=",
                })
            }
            Node::Cond { cond, then, alt } => json!({
                "cond": cond.node.to_json(),
                "then": then.node.to_json(),
                "alt": alt.node.to_json(),
                "op": "cond",
            }),
            Node::Call { callee, args } => {
                let args: Vec<Json> = args.iter().map(|a| a.node.to_json()).collect();
                json!({ "callee": ident_json(&callee.node), "args": args, "op": "call" })
            }
        }
    }
}
