//! Node definitions

use super::Spanned;
use std::mem;
use std::rc::Rc;

/// AST node
///
/// One variant per node kind of the wire format. The two forms of the
/// wire-level `=` node are split here: a bare identifier on the left is
/// [`Node::Assign`], a call shape on the left is [`Node::FnDef`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Integer literal
    Int(i64),

    /// String literal
    Str(String),

    /// Name reference
    Ident(String),

    /// Binary operation
    Binary {
        left: Box<Spanned<Node>>,
        op: BinOp,
        right: Box<Spanned<Node>>,
    },

    /// Variable binding: name = value
    Assign {
        name: Spanned<String>,
        value: Box<Spanned<Node>>,
    },

    /// Function definition: name(params...) = body
    FnDef {
        name: Spanned<String>,
        params: Vec<Spanned<String>>,
        /// Shared with every closure created from this definition
        body: Rc<Spanned<Node>>,
    },

    /// Conditional expression: cond ? then : alt
    Cond {
        cond: Box<Spanned<Node>>,
        then: Box<Spanned<Node>>,
        alt: Box<Spanned<Node>>,
    },

    /// Function call
    Call {
        callee: Spanned<String>,
        args: Vec<Spanned<Node>>,
    },
}

impl Node {
    /// Move owned children out, leaving cheap placeholders behind
    fn take_children(&mut self, out: &mut Vec<Node>) {
        fn take(child: &mut Spanned<Node>) -> Node {
            mem::replace(&mut child.node, Node::Int(0))
        }
        match self {
            Node::Int(_) | Node::Str(_) | Node::Ident(_) => {}
            Node::Binary { left, right, .. } => {
                out.push(take(left));
                out.push(take(right));
            }
            Node::Assign { value, .. } => out.push(take(value)),
            Node::FnDef { body, .. } => {
                if let Some(body) = Rc::get_mut(body) {
                    out.push(take(body));
                }
            }
            Node::Cond { cond, then, alt } => {
                out.push(take(cond));
                out.push(take(then));
                out.push(take(alt));
            }
            Node::Call { args, .. } => out.extend(args.iter_mut().map(take)),
        }
    }

    /// Wire-level kind name, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Int(_) => "integer",
            Node::Str(_) => "string",
            Node::Ident(_) => "identifier",
            Node::Binary { .. } => "binary operation",
            Node::Assign { .. } | Node::FnDef { .. } => "assignment",
            Node::Cond { .. } => "conditional",
            Node::Call { .. } => "call",
        }
    }
}

// Children are dropped from a work list, not recursively.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.take_children(&mut pending);
        }
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,

    // Logical
    And,
    Or,
}

impl BinOp {
    /// Look up an operator by its wire symbol
    pub fn from_symbol(symbol: &str) -> Option<BinOp> {
        Some(match symbol {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "%" => BinOp::Mod,
            "==" => BinOp::Eq,
            "!=" => BinOp::Ne,
            "<" => BinOp::Lt,
            ">" => BinOp::Gt,
            "<=" => BinOp::Le,
            ">=" => BinOp::Ge,
            "and" => BinOp::And,
            "or" => BinOp::Or,
            _ => return None,
        })
    }
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Mul => write!(f, "*"),
            BinOp::Div => write!(f, "/"),
            BinOp::Mod => write!(f, "%"),
            BinOp::Eq => write!(f, "=="),
            BinOp::Ne => write!(f, "!="),
            BinOp::Lt => write!(f, "<"),
            BinOp::Gt => write!(f, ">"),
            BinOp::Le => write!(f, "<="),
            BinOp::Ge => write!(f, ">="),
            BinOp::And => write!(f, "and"),
            BinOp::Or => write!(f, "or"),
        }
    }
}
