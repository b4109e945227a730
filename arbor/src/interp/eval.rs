//! Expression evaluator

use super::builtins::{self, Builtin};
use super::env::{child_env, EnvRef, Environment};
use super::error::{InterpResult, RuntimeError};
use super::value::{Function, Value};
use crate::ast::{BinOp, Node, Program, Span, Spanned, Stmt};
use crate::config::Config;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use tracing::{debug, trace};

/// Stack growth parameters for deep non-tail recursion
pub(crate) const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
pub(crate) const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// Result of evaluating an expression in tail position
enum Flow {
    /// Fully evaluated
    Done(Value),
    /// A user function call whose arguments are evaluated but whose body
    /// has not run yet. The trampoline in `call_function` decides whether
    /// it reuses the current frame.
    Call {
        function: Rc<Function>,
        args: Vec<Value>,
        span: Span,
    },
}

/// The interpreter
pub struct Interpreter {
    /// Global frame: built-ins and top-level definitions
    global_env: EnvRef,
    /// Sink for `print` and friends
    out: Box<dyn Write>,
    config: Config,
    /// Active user-function frames
    depth: usize,
    /// Highest `depth` reached so far
    peak_depth: usize,
    /// String intern table so repeated literals share one allocation
    string_intern: HashMap<String, Rc<str>>,
}

impl Interpreter {
    /// Create a new interpreter writing to stdout
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let mut interp = Interpreter {
            global_env: Environment::new().into_ref(),
            out: Box::new(io::stdout()),
            config,
            depth: 0,
            peak_depth: 0,
            string_intern: HashMap::new(),
        };
        for builtin in builtins::registry() {
            interp.register_builtin(builtin);
        }
        interp
    }

    /// Redirect program output
    pub fn with_output(mut self, out: impl Write + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    /// Install a host function in the global frame
    pub fn register_builtin(&mut self, builtin: Builtin) {
        self.global_env
            .borrow_mut()
            .define(builtin.name, Value::Builtin(builtin));
    }

    /// Deepest user-function nesting reached so far
    pub fn peak_depth(&self) -> usize {
        self.peak_depth
    }

    /// Run every top-level statement in order, discarding their values
    pub fn run(&mut self, program: &Program) -> InterpResult<()> {
        for (index, stmt) in program.stmts.iter().enumerate() {
            debug!(index, kind = stmt.expr.node.kind(), "statement");
            self.eval_stmt(stmt)?;
        }
        Ok(())
    }

    /// Evaluate one top-level statement and return its value
    pub fn eval_stmt(&mut self, stmt: &Stmt) -> InterpResult<Value> {
        self.eval_expr(&stmt.expr)
            .map_err(|e| e.with_span(stmt.span))
    }

    /// Evaluate a single expression in the global frame
    pub fn eval_expr(&mut self, expr: &Spanned<Node>) -> InterpResult<Value> {
        let global = Rc::clone(&self.global_env);
        self.eval(expr, &global)
    }

    /// Intern a string literal
    fn intern_string(&mut self, s: &str) -> Rc<str> {
        if let Some(rc) = self.string_intern.get(s) {
            Rc::clone(rc)
        } else {
            let rc: Rc<str> = Rc::from(s);
            self.string_intern.insert(s.to_string(), Rc::clone(&rc));
            rc
        }
    }

    /// Evaluate an expression with automatic stack growth for deep recursion
    fn eval(&mut self, expr: &Spanned<Node>, env: &EnvRef) -> InterpResult<Value> {
        // Grow stack if we're running low
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(expr, env))
    }

    /// Inner eval implementation
    fn eval_inner(&mut self, expr: &Spanned<Node>, env: &EnvRef) -> InterpResult<Value> {
        match &expr.node {
            Node::Int(n) => Ok(Value::Int(*n)),
            Node::Str(s) => Ok(Value::Str(self.intern_string(s))),

            Node::Ident(name) => env
                .borrow()
                .get(name)
                .ok_or_else(|| RuntimeError::unbound_name(name).with_span(expr.span)),

            Node::Binary { left, op, right } => {
                let lval = self.eval(left, env)?;
                // Short-circuit evaluation for logical operators
                match op {
                    BinOp::And if !lval.is_truthy() => return Ok(Value::Bool(false)),
                    BinOp::Or if lval.is_truthy() => return Ok(Value::Bool(true)),
                    _ => {}
                }
                let rval = self.eval(right, env)?;
                eval_binary(*op, lval, rval).map_err(|e| e.with_span(expr.span))
            }

            Node::Cond { cond, then, alt } => {
                if self.eval(cond, env)?.is_truthy() {
                    self.eval(then, env)
                } else {
                    self.eval(alt, env)
                }
            }

            Node::Assign { name, value } => {
                let val = self.eval(value, env)?;
                env.borrow_mut().define(name.node.clone(), val.clone());
                Ok(val)
            }

            Node::FnDef { name, params, body } => {
                let function = Value::Function(Rc::new(Function {
                    name: name.node.clone(),
                    params: params.iter().map(|p| p.node.clone()).collect(),
                    body: Rc::clone(body),
                    env: Rc::clone(env),
                }));
                // The closure captures `env` itself, so binding into it makes
                // the name visible to the body for recursive calls.
                env.borrow_mut().define(name.node.clone(), function.clone());
                debug!(name = %name.node, arity = params.len(), "function defined");
                Ok(function)
            }

            Node::Call { callee, args } => match self.eval_call(callee, args, env, expr.span)? {
                Flow::Done(value) => Ok(value),
                Flow::Call {
                    function,
                    args,
                    span,
                } => self.call_function(function, args).map_err(|e| e.with_span(span)),
            },
        }
    }

    /// Evaluate an expression in tail position. Conditionals pass tail
    /// position on to the branch they take; user calls come back unexecuted.
    fn eval_tail(&mut self, expr: &Spanned<Node>, env: &EnvRef) -> InterpResult<Flow> {
        match &expr.node {
            Node::Cond { cond, then, alt } => {
                let branch = if self.eval(cond, env)?.is_truthy() {
                    then
                } else {
                    alt
                };
                self.eval_tail(branch, env)
            }
            Node::Call { callee, args } => self.eval_call(callee, args, env, expr.span),
            _ => self.eval(expr, env).map(Flow::Done),
        }
    }

    /// Evaluate arguments left to right, then resolve the callee. Built-ins
    /// run immediately; user functions are returned as `Flow::Call`.
    fn eval_call(
        &mut self,
        callee: &Spanned<String>,
        args: &[Spanned<Node>],
        env: &EnvRef,
        span: Span,
    ) -> InterpResult<Flow> {
        let arg_vals = args
            .iter()
            .map(|a| self.eval(a, env))
            .collect::<InterpResult<Vec<_>>>()?;

        let target = env
            .borrow()
            .get(&callee.node)
            .ok_or_else(|| RuntimeError::unbound_name(&callee.node).with_span(callee.span))?;

        match target {
            Value::Builtin(builtin) => builtin
                .call(&mut *self.out, &arg_vals)
                .map(Flow::Done)
                .map_err(|e| e.with_span(span)),
            Value::Function(function) => Ok(Flow::Call {
                function,
                args: arg_vals,
                span,
            }),
            other => Err(
                RuntimeError::not_callable(&callee.node, other.type_name()).with_span(callee.span),
            ),
        }
    }

    /// Call a user-defined function with automatic stack growth
    fn call_function(&mut self, function: Rc<Function>, args: Vec<Value>) -> InterpResult<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.call_function_inner(function, args)
        })
    }

    /// Inner function call implementation
    fn call_function_inner(&mut self, function: Rc<Function>, args: Vec<Value>) -> InterpResult<Value> {
        // Check recursion depth
        if self.depth >= self.config.max_depth {
            return Err(RuntimeError::stack_overflow(self.config.max_depth));
        }
        self.depth += 1;
        self.peak_depth = self.peak_depth.max(self.depth);

        let result = self.trampoline(function, args);
        self.depth -= 1;
        result
    }

    /// Run a function body, then keep running tail calls in the same frame
    /// until a plain value comes back.
    fn trampoline(&mut self, mut function: Rc<Function>, args: Vec<Value>) -> InterpResult<Value> {
        debug!(function = %function.name, depth = self.depth, "call");
        let mut frame = child_env(&function.env);
        frame
            .borrow_mut()
            .replace_bindings(bind_params(&function, args)?);

        loop {
            let (next, args, span) = match self.eval_tail(&function.body, &frame)? {
                Flow::Done(value) => return Ok(value),
                Flow::Call {
                    function,
                    args,
                    span,
                } => (function, args, span),
            };

            if !self.config.tail_calls {
                return self.call_function(next, args).map_err(|e| e.with_span(span));
            }

            let bindings = bind_params(&next, args).map_err(|e| e.with_span(span))?;
            trace!(from = %function.name, to = %next.name, "tail call");

            // Reuse the frame unless a closure created in the body still
            // holds it, or the target lives under a different outer frame.
            if Rc::strong_count(&frame) == 1 && frame.borrow().parent_is(&next.env) {
                frame.borrow_mut().replace_bindings(bindings);
            } else {
                frame = child_env(&next.env);
                frame.borrow_mut().replace_bindings(bindings);
            }
            function = next;
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Pair parameter names with argument values, checking arity
fn bind_params(function: &Function, args: Vec<Value>) -> InterpResult<Vec<(String, Value)>> {
    if function.params.len() != args.len() {
        return Err(RuntimeError::arity_mismatch(
            &function.name,
            function.params.len(),
            args.len(),
        ));
    }
    Ok(function.params.iter().cloned().zip(args).collect())
}

/// Apply a binary operator to two evaluated operands
fn eval_binary(op: BinOp, lval: Value, rval: Value) -> InterpResult<Value> {
    match op {
        BinOp::Eq => return Ok(Value::Bool(lval == rval)),
        BinOp::Ne => return Ok(Value::Bool(lval != rval)),
        BinOp::And => return Ok(Value::Bool(lval.is_truthy() && rval.is_truthy())),
        BinOp::Or => return Ok(Value::Bool(lval.is_truthy() || rval.is_truthy())),
        _ => {}
    }

    let (Value::Int(a), Value::Int(b)) = (&lval, &rval) else {
        return Err(RuntimeError::type_mismatch(
            "int",
            &format!("{} {op} {}", lval.type_name(), rval.type_name()),
        ));
    };
    let (a, b) = (*a, *b);

    Ok(match op {
        BinOp::Add => Value::Int(a.wrapping_add(b)),
        BinOp::Sub => Value::Int(a.wrapping_sub(b)),
        BinOp::Mul => Value::Int(a.wrapping_mul(b)),
        BinOp::Div => {
            if b == 0 {
                return Err(RuntimeError::division_by_zero());
            }
            Value::Int(a.wrapping_div(b))
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(RuntimeError::division_by_zero());
            }
            Value::Int(a.wrapping_rem(b))
        }
        BinOp::Lt => Value::Bool(a < b),
        BinOp::Gt => Value::Bool(a > b),
        BinOp::Le => Value::Bool(a <= b),
        BinOp::Ge => Value::Bool(a >= b),
        BinOp::Eq | BinOp::Ne | BinOp::And | BinOp::Or => unreachable!("handled above"),
    })
}
