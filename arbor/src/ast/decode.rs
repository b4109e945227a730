//! Decoding of wire literals into typed nodes
//!
//! The populated fields of a wire object decide its kind. Once decoded, the
//! evaluator only ever matches on [`Node`] variants.

use super::{BinOp, Node, Program, Span, Spanned, Stmt};
use crate::interp::{InterpResult, RuntimeError, STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::wire::Literal;
use std::rc::Rc;

type Members = [(Spanned<String>, Spanned<Literal>)];

/// Decode a whole wire document
pub fn decode_program(doc: &Spanned<Literal>) -> InterpResult<Program> {
    Decoder::new().program(doc)
}

fn malformed(detail: impl Into<String>, span: Span) -> RuntimeError {
    RuntimeError::malformed_node(detail).with_span(span)
}

/// Stateful decoder; remembers every bare token it accepted as a string
#[derive(Debug, Default)]
pub struct Decoder {
    bare_tokens: Vec<Spanned<String>>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bare tokens (such as `op: cond`) accepted in place of quoted strings
    pub fn bare_tokens(&self) -> &[Spanned<String>] {
        &self.bare_tokens
    }

    pub fn program(&mut self, doc: &Spanned<Literal>) -> InterpResult<Program> {
        let Literal::Array(items) = &doc.node else {
            return Err(malformed(
                format!(
                    "document must be an array of statements, found {}",
                    doc.node.describe()
                ),
                doc.span,
            ));
        };
        let stmts = items
            .iter()
            .map(|item| self.stmt(item))
            .collect::<InterpResult<Vec<_>>>()?;
        Ok(Program { stmts })
    }

    fn stmt(&mut self, lit: &Spanned<Literal>) -> InterpResult<Stmt> {
        let members = object(lit, "statement")?;
        let ty = required(members, "type", lit.span)?;
        let ty_name = self.text(ty, "statement type")?;
        if ty_name != "exprstmt" {
            return Err(malformed(
                format!("unsupported statement type `{ty_name}`"),
                ty.span,
            ));
        }
        let expr = self.node(required(members, "expr", lit.span)?)?;
        Ok(Stmt {
            expr,
            span: lit.span,
        })
    }

    /// Decode one expression node
    pub fn node(&mut self, lit: &Spanned<Literal>) -> InterpResult<Spanned<Node>> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.node_inner(lit))
    }

    fn node_inner(&mut self, lit: &Spanned<Literal>) -> InterpResult<Spanned<Node>> {
        let span = lit.span;
        let members = object(lit, "node")?;
        let has = |key: &str| members.iter().any(|(k, _)| k.node == key);

        let kinds: Vec<&str> = ["integer", "string", "identifier", "callee", "cond"]
            .into_iter()
            .filter(|key| has(*key))
            .chain((has("left") || has("right")).then_some("left/right"))
            .collect();
        if kinds.len() > 1 {
            return Err(malformed(
                format!("node has fields of several kinds: {}", kinds.join(", ")),
                span,
            ));
        }

        let node = if let Some(value) = field(members, "integer") {
            match value.node {
                Literal::Int(n) => Node::Int(n),
                ref other => {
                    return Err(malformed(
                        format!("`integer` must hold an integer, found {}", other.describe()),
                        value.span,
                    ));
                }
            }
        } else if let Some(value) = field(members, "string") {
            match &value.node {
                Literal::Str(s) => Node::Str(s.clone()),
                other => {
                    return Err(malformed(
                        format!("`string` must hold a quoted string, found {}", other.describe()),
                        value.span,
                    ));
                }
            }
        } else if let Some(value) = field(members, "identifier") {
            Node::Ident(self.text(value, "identifier")?)
        } else if has("callee") {
            self.expect_op(members, span, "call")?;
            let callee = self.name(required(members, "callee", span)?)?;
            let args = self.list(required(members, "args", span)?)?;
            Node::Call { callee, args }
        } else if has("cond") {
            self.expect_op(members, span, "cond")?;
            Node::Cond {
                cond: Box::new(self.node(required(members, "cond", span)?)?),
                then: Box::new(self.node(required(members, "then", span)?)?),
                alt: Box::new(self.node(required(members, "alt", span)?)?),
            }
        } else if has("left") || has("right") {
            let op_lit = required(members, "op", span)?;
            let op = self.text(op_lit, "operator")?;
            let left = required(members, "left", span)?;
            let right = required(members, "right", span)?;
            if op == "=" {
                self.assignment(left, right)?
            } else {
                let op = BinOp::from_symbol(&op)
                    .ok_or_else(|| malformed(format!("unknown operator `{op}`"), op_lit.span))?;
                Node::Binary {
                    left: Box::new(self.node(left)?),
                    op,
                    right: Box::new(self.node(right)?),
                }
            }
        } else {
            return Err(malformed("object has no node-kind field", span));
        };

        Ok(Spanned::new(node, span))
    }

    /// `x = v` binds a variable; `f(a, b) = body` defines a function
    fn assignment(
        &mut self,
        left: &Spanned<Literal>,
        right: &Spanned<Literal>,
    ) -> InterpResult<Node> {
        let target = self.node(left)?;
        match &target.node {
            Node::Ident(name) => Ok(Node::Assign {
                name: Spanned::new(name.clone(), target.span),
                value: Box::new(self.node(right)?),
            }),
            Node::Call { callee, args } => {
                let mut params: Vec<Spanned<String>> = Vec::with_capacity(args.len());
                for arg in args {
                    let Node::Ident(param) = &arg.node else {
                        return Err(malformed(
                            format!("parameter must be an identifier, found {}", arg.node.kind()),
                            arg.span,
                        ));
                    };
                    if params.iter().any(|p| &p.node == param) {
                        return Err(malformed(format!("duplicate parameter `{param}`"), arg.span));
                    }
                    params.push(Spanned::new(param.clone(), arg.span));
                }
                Ok(Node::FnDef {
                    name: callee.clone(),
                    params,
                    body: Rc::new(self.node(right)?),
                })
            }
            other => Err(malformed(
                format!("cannot assign to {}", other.kind()),
                target.span,
            )),
        }
    }

    fn list(&mut self, lit: &Spanned<Literal>) -> InterpResult<Vec<Spanned<Node>>> {
        match &lit.node {
            Literal::Array(items) => items.iter().map(|item| self.node(item)).collect(),
            other => Err(malformed(
                format!("`args` must be an array, found {}", other.describe()),
                lit.span,
            )),
        }
    }

    /// A callee must be an identifier node
    fn name(&mut self, lit: &Spanned<Literal>) -> InterpResult<Spanned<String>> {
        let node = self.node(lit)?;
        match &node.node {
            Node::Ident(name) => Ok(Spanned::new(name.clone(), node.span)),
            other => Err(malformed(
                format!("callee must be an identifier, found {}", other.kind()),
                node.span,
            )),
        }
    }

    fn expect_op(&mut self, members: &Members, span: Span, expected: &str) -> InterpResult<()> {
        let op_lit = required(members, "op", span)?;
        let op = self.text(op_lit, "operator")?;
        if op != expected {
            return Err(malformed(
                format!("expected op `{expected}`, found `{op}`"),
                op_lit.span,
            ));
        }
        Ok(())
    }

    fn text(&mut self, lit: &Spanned<Literal>, what: &str) -> InterpResult<String> {
        match &lit.node {
            Literal::Str(s) => Ok(s.clone()),
            Literal::Bare(word) => {
                tracing::warn!(
                    token = %word,
                    span = %lit.span,
                    "bare token used as {what}; treating it as \"{word}\""
                );
                self.bare_tokens.push(Spanned::new(word.clone(), lit.span));
                Ok(word.clone())
            }
            other => Err(malformed(
                format!("{what} must be a string, found {}", other.describe()),
                lit.span,
            )),
        }
    }
}

fn object<'a>(lit: &'a Spanned<Literal>, what: &str) -> InterpResult<&'a Members> {
    let Literal::Object(members) = &lit.node else {
        return Err(malformed(
            format!("{what} must be an object, found {}", lit.node.describe()),
            lit.span,
        ));
    };
    for (i, (key, _)) in members.iter().enumerate() {
        if members[..i].iter().any(|(k, _)| k.node == key.node) {
            return Err(malformed(format!("duplicate field `{}`", key.node), key.span));
        }
    }
    Ok(members)
}

fn field<'a>(members: &'a Members, key: &str) -> Option<&'a Spanned<Literal>> {
    members.iter().find(|(k, _)| k.node == key).map(|(_, v)| v)
}

fn required<'a>(members: &'a Members, key: &str, span: Span) -> InterpResult<&'a Spanned<Literal>> {
    field(members, key).ok_or_else(|| malformed(format!("missing field `{key}`"), span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::ErrorKind;
    use crate::wire::read;

    fn decode_node(src: &str) -> InterpResult<Node> {
        let doc = read(src).unwrap();
        Decoder::new().node(&doc).map(|n| n.node)
    }

    fn decode_err(src: &str) -> RuntimeError {
        decode_node(src).unwrap_err()
    }

    #[test]
    fn test_literals() {
        assert_eq!(decode_node("{ integer: 7 }").unwrap(), Node::Int(7));
        assert_eq!(decode_node(r#"{ string: "\n" }"#).unwrap(), Node::Str("\n".to_string()));
        assert_eq!(
            decode_node(r#"{ identifier: "prev" }"#).unwrap(),
            Node::Ident("prev".to_string())
        );
    }

    #[test]
    fn test_binary() {
        let node = decode_node(r#"{ left: { identifier: "n" }, right: { integer: 1 }, op: "-" }"#)
            .unwrap();
        assert!(matches!(node, Node::Binary { op: BinOp::Sub, .. }));
    }

    #[test]
    fn test_call() {
        let node = decode_node(
            r#"{ callee: { identifier: "fib" }, args: [{ integer: 30 }], op: "call" }"#,
        )
        .unwrap();
        match &node {
            Node::Call { callee, args } => {
                assert_eq!(callee.node, "fib");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_conditional_with_bare_op() {
        let doc = read(
            r#"{ cond: { integer: 1 }, then: { integer: 2 }, alt: { integer: 3 }, op: cond }"#,
        )
        .unwrap();
        let mut decoder = Decoder::new();
        let node = decoder.node(&doc).unwrap();
        assert!(matches!(node.node, Node::Cond { .. }));
        assert_eq!(decoder.bare_tokens().len(), 1);
        assert_eq!(decoder.bare_tokens()[0].node, "cond");
    }

    #[test]
    fn test_variable_assignment() {
        let node = decode_node(r#"{ left: { identifier: "x" }, right: { integer: 1 }, op: "=" }"#)
            .unwrap();
        match &node {
            Node::Assign { name, value } => {
                assert_eq!(name.node, "x");
                assert_eq!(value.node, Node::Int(1));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_function_definition() {
        let node = decode_node(
            r#"{
                left: { callee: { identifier: "fib" }, args: [{ identifier: "n" }], op: "call" },
                right: { identifier: "n" },
                op: "=",
            }"#,
        )
        .unwrap();
        match &node {
            Node::FnDef { name, params, body } => {
                assert_eq!(name.node, "fib");
                assert_eq!(params.iter().map(|p| p.node.as_str()).collect::<Vec<_>>(), ["n"]);
                assert_eq!(body.node, Node::Ident("n".to_string()));
            }
            other => panic!("expected function definition, got {other:?}"),
        }
    }

    #[test]
    fn test_non_identifier_parameter() {
        let err = decode_err(
            r#"{
                left: { callee: { identifier: "f" }, args: [{ integer: 1 }], op: "call" },
                right: { integer: 0 },
                op: "=",
            }"#,
        );
        assert_eq!(err.kind, ErrorKind::MalformedNode);
        assert!(err.message.contains("parameter"));
    }

    #[test]
    fn test_duplicate_parameter() {
        let err = decode_err(
            r#"{
                left: { callee: { identifier: "f" }, args: [{ identifier: "a" }, { identifier: "a" }], op: "call" },
                right: { integer: 0 },
                op: "=",
            }"#,
        );
        assert!(err.message.contains("duplicate parameter"));
    }

    #[test]
    fn test_assign_to_literal() {
        let err = decode_err(r#"{ left: { integer: 1 }, right: { integer: 2 }, op: "=" }"#);
        assert_eq!(err.kind, ErrorKind::MalformedNode);
        assert!(err.message.contains("cannot assign to integer"));
    }

    #[test]
    fn test_missing_alt() {
        let src = r#"{ cond: { integer: 1 }, then: { integer: 2 }, op: "cond" }"#;
        let err = decode_err(src);
        assert_eq!(err.kind, ErrorKind::MalformedNode);
        assert!(err.message.contains("missing field `alt`"));
        assert_eq!(err.span, Some(Span::new(0, src.len())));
    }

    #[test]
    fn test_unknown_operator() {
        let err = decode_err(r#"{ left: { integer: 1 }, right: { integer: 2 }, op: "**" }"#);
        assert!(err.message.contains("unknown operator `**`"));
    }

    #[test]
    fn test_call_requires_call_op() {
        let err = decode_err(r#"{ callee: { identifier: "f" }, args: [], op: "+" }"#);
        assert!(err.message.contains("expected op `call`"));
    }

    #[test]
    fn test_callee_must_be_identifier() {
        let err = decode_err(r#"{ callee: { integer: 3 }, args: [], op: "call" }"#);
        assert!(err.message.contains("callee must be an identifier"));
    }

    #[test]
    fn test_integer_field_type() {
        let err = decode_err(r#"{ integer: "12" }"#);
        assert!(err.message.contains("`integer` must hold an integer"));
    }

    #[test]
    fn test_unrecognized_object() {
        let err = decode_err(r#"{ float: 1 }"#);
        assert!(err.message.contains("no node-kind field"));
    }

    #[test]
    fn test_several_kinds_rejected() {
        let src = r#"{ integer: 1, callee: { identifier: "f" }, args: [], op: "call" }"#;
        let err = decode_err(src);
        assert_eq!(err.kind, ErrorKind::MalformedNode);
        assert!(err.message.contains("several kinds: integer, callee"));
        assert_eq!(err.span, Some(Span::new(0, src.len())));

        let err = decode_err(r#"{ identifier: "x", left: { integer: 1 }, right: { integer: 2 }, op: "+" }"#);
        assert!(err.message.contains("identifier, left/right"));
    }

    #[test]
    fn test_deeply_nested_binary() {
        let depth = 20_000;
        let src = format!(
            "{}{{ integer: 1 }}{}",
            "{ left: ".repeat(depth),
            r#", right: { integer: 1 }, op: "+" }"#.repeat(depth)
        );
        let node = decode_node(&src).unwrap();
        let mut current = &node;
        let mut levels = 0;
        while let Node::Binary { left, .. } = current {
            current = &left.node;
            levels += 1;
        }
        assert_eq!(levels, depth);
    }

    #[test]
    fn test_duplicate_field() {
        let err = decode_err(r#"{ integer: 1, integer: 2 }"#);
        assert!(err.message.contains("duplicate field `integer`"));
    }

    #[test]
    fn test_program_requires_exprstmt() {
        let doc = read(r#"[{ expr: { integer: 1 }, type: "letstmt" }]"#).unwrap();
        let err = decode_program(&doc).unwrap_err();
        assert!(err.message.contains("unsupported statement type `letstmt`"));
    }

    #[test]
    fn test_program_requires_array() {
        let doc = read(r#"{ expr: { integer: 1 }, type: exprstmt }"#).unwrap();
        let err = decode_program(&doc).unwrap_err();
        assert!(err.message.contains("array of statements"));
    }

    #[test]
    fn test_program_statements_in_order() {
        let doc = read(
            r#"[
                { expr: { integer: 1 }, type: exprstmt },
                { expr: { integer: 2 }, type: "exprstmt" },
            ];"#,
        )
        .unwrap();
        let program = decode_program(&doc).unwrap();
        let values: Vec<_> = program.stmts.iter().map(|s| s.expr.node.clone()).collect();
        assert_eq!(values, vec![Node::Int(1), Node::Int(2)]);
    }
}
