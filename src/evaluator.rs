use std::borrow::Cow;
use std::cell::Cell;

use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::{
    ast::{BinOp, Marker, TYPE_METADATA, UnaryOp},
    environment::{AbsentTarget, Environment},
    node::{Node, Scalar},
    output::to_text,
    transform::{current_value, extract_path, set_at_path},
    value::Value,
};

/// Errors that can occur during path or expression evaluation.
///
/// Missing data is not an error: evaluation returns `Ok(None)` for it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Index that is not a non-negative integer
    #[error("invalid index: {0}")]
    InvalidIndex(String),

    /// Selector without a preceding name, or with a non-integer argument
    #[error("selector must follow a name and take a non-negative integer")]
    InvalidSelector,

    /// Argument list on something the environment cannot call
    #[error("'{0}' is not callable")]
    NotCallable(String),

    #[error("'{name}' takes {expected} arguments, got {found}")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Failure reported by a callable
    #[error("call to '{name}' failed: {message}")]
    Callable { name: String, message: String },

    /// Left side of an assignment that is not a plain path
    #[error("assignment target must be a path of names and indexes")]
    InvalidAssignmentTarget,

    /// Assignment evaluated without write access to the context
    #[error("assignment needs a mutable context")]
    ReadOnlyContext,

    /// Integer division or modulo by zero
    #[error("division by zero")]
    DivisionByZero,

    #[error("'{operator}' applied to a target that does not exist")]
    AbsentTarget { operator: &'static str },

    #[error("evaluation deeper than {0} levels")]
    TooDeep(usize),
}

/// Read or write access to the context tree.
enum Context<'a> {
    Read(&'a Node),
    Write(&'a mut Node),
}

impl Context<'_> {
    fn node(&self) -> &Node {
        match self {
            Context::Read(n) => n,
            Context::Write(n) => n,
        }
    }
}

/// Evaluates compiled paths and expressions against a context tree.
///
/// # Examples
///
/// ```
/// use ogdl::{compile_expression, compile_path, parse, Environment, Evaluator, Value};
///
/// let env = Environment::new();
/// let ev = Evaluator::new(&env);
///
/// let tree = parse("a\n b 1\n b 2").unwrap();
/// let p = compile_path("a.b{1}").unwrap();
/// assert_eq!(ev.eval_path(&tree, &p).unwrap(), Some(Value::from("2")));
///
/// let mut ctx = parse("").unwrap();
/// let e = compile_expression("x = 1 + 2").unwrap();
/// ev.eval_mut(&mut ctx, &e).unwrap();
/// assert_eq!(ctx.to_string(), "x\n  3");
/// ```
pub struct Evaluator<'env> {
    env: &'env Environment,
    depth: Cell<usize>,
}

impl<'env> Evaluator<'env> {
    pub fn new(env: &'env Environment) -> Self {
        Evaluator {
            env,
            depth: Cell::new(0),
        }
    }

    /// Evaluate a compiled path or expression without modifying `ctx`.
    /// Assignments fail with [`EvalError::ReadOnlyContext`].
    #[instrument(level = "trace", skip_all)]
    pub fn eval(&self, ctx: &Node, expr: &Node) -> Result<Option<Value>, EvalError> {
        self.eval_node(&mut Context::Read(ctx), expr)
    }

    /// Evaluate a compiled path or expression; assignments write to `ctx`.
    #[instrument(level = "trace", skip_all)]
    pub fn eval_mut(&self, ctx: &mut Node, expr: &Node) -> Result<Option<Value>, EvalError> {
        self.eval_node(&mut Context::Write(ctx), expr)
    }

    /// Evaluate and reduce the result to a boolean; anything that is not a
    /// boolean (or the text `true`/`false`) counts as false.
    pub fn eval_bool(&self, ctx: &Node, expr: &Node) -> Result<bool, EvalError> {
        Ok(self.eval(ctx, expr)?.and_then(|v| v.to_bool()).unwrap_or(false))
    }

    fn enter(&self) -> Result<(), EvalError> {
        let depth = self.depth.get() + 1;
        if depth > self.env.options.max_depth {
            return Err(EvalError::TooDeep(self.env.options.max_depth));
        }
        self.depth.set(depth);
        Ok(())
    }

    fn leave(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }

    fn eval_node(&self, ctx: &mut Context<'_>, node: &Node) -> Result<Option<Value>, EvalError> {
        // leaves do not recurse
        if node.is_empty() {
            return self.eval_inner(ctx, node);
        }
        self.enter()?;
        let result = self.eval_inner(ctx, node);
        self.leave();
        result
    }

    fn eval_inner(&self, ctx: &mut Context<'_>, node: &Node) -> Result<Option<Value>, EvalError> {
        match Marker::of(node) {
            Some(Marker::Expression) => match node.child_at(0) {
                Some(inner) => self.eval_node(ctx, inner),
                None => Ok(None),
            },
            Some(Marker::Path) => Ok(self.eval_path(ctx.node(), node)?.map(Value::normalize)),
            Some(Marker::String) => Ok(Some(Value::from(
                node.child_at(0).map(Node::this_string).unwrap_or_default(),
            ))),
            Some(Marker::Group) => {
                let mut list = Node::wrapper();
                for expr in node.children() {
                    if let Some(v) = self.eval_node(ctx, expr)? {
                        list.append(v.into_node());
                    }
                }
                Ok(Some(Value::Node(list)))
            }
            Some(Marker::Index | Marker::Selector | Marker::Arguments) => Ok(None),
            None => self.eval_operator_or_literal(ctx, node),
        }
    }

    fn eval_operator_or_literal(
        &self,
        ctx: &mut Context<'_>,
        node: &Node,
    ) -> Result<Option<Value>, EvalError> {
        let Some(content) = node.content() else {
            return Ok(Some(Value::Node(node.clone())));
        };
        if let Some(symbol) = content.as_str() {
            match node.children() {
                [left, right] => {
                    if let Some(op) = BinOp::from_symbol(symbol) {
                        return self.eval_binary(ctx, op, left, right);
                    }
                }
                [operand] => {
                    let mut chars = symbol.chars();
                    if let (Some(c), None) = (chars.next(), chars.next())
                        && let Some(op) = UnaryOp::from_char(c)
                    {
                        return self.eval_unary(ctx, op, operand);
                    }
                }
                _ => {}
            }
        }
        if node.is_empty() {
            return Ok(Some(Value::Scalar(content.clone())));
        }
        Ok(Some(Value::Node(node.clone())))
    }

    fn eval_unary(&self, ctx: &mut Context<'_>, op: UnaryOp, operand: &Node) -> Result<Option<Value>, EvalError> {
        let value = self.eval_node(ctx, operand)?;
        let result = match op {
            UnaryOp::Not => Some(Value::from(!value.and_then(|v| v.to_bool()).unwrap_or(false))),
            UnaryOp::Negate => match value.as_ref().and_then(Value::as_scalar) {
                Some(Scalar::Integer(n)) => Some(Value::from(n.wrapping_neg())),
                Some(Scalar::Float(n)) => Some(Value::from(-n)),
                _ => None,
            },
            UnaryOp::Plus => value.filter(|v| v.as_scalar().is_some_and(Scalar::is_numeric)),
        };
        Ok(result)
    }

    fn eval_binary(
        &self,
        ctx: &mut Context<'_>,
        op: BinOp,
        left: &Node,
        right: &Node,
    ) -> Result<Option<Value>, EvalError> {
        if op.is_assignment() {
            return self.assign(ctx, op, left, right);
        }

        let l = self.eval_node(ctx, left)?.unwrap_or_default();
        let r = self.eval_node(ctx, right)?.unwrap_or_default();
        let (l, r) = (l.scalar(), r.scalar());

        match op {
            BinOp::Or | BinOp::And => Ok(Some(Value::from(logic(op, &l, &r)))),
            BinOp::Equal
            | BinOp::NotEqual
            | BinOp::GreaterEqual
            | BinOp::LessEqual
            | BinOp::GreaterThan
            | BinOp::LessThan => Ok(Some(Value::from(compare(op, &l, &r)))),
            BinOp::Power => {
                debug!("'^' has no value");
                Ok(None)
            }
            _ => apply_binop(op, &l, &r),
        }
    }

    /// `=` and the compound assignments.
    fn assign(
        &self,
        ctx: &mut Context<'_>,
        op: BinOp,
        target: &Node,
        rhs: &Node,
    ) -> Result<Option<Value>, EvalError> {
        if let Context::Read(_) = ctx {
            return Err(EvalError::ReadOnlyContext);
        }
        if Marker::of(target) != Some(Marker::Path) {
            return Err(EvalError::InvalidAssignmentTarget);
        }

        let value = self.eval_node(ctx, rhs)?.unwrap_or_default();
        let segments = extract_path(self, ctx.node(), target)?;

        let new_value = match op.compound() {
            None => Some(value),
            Some(arith) => match current_value(ctx.node(), &segments) {
                Some(current) => apply_binop(arith, &current, &value.scalar())?,
                None => self.absent_target(op, &value)?,
            },
        };

        let Some(new_value) = new_value else {
            debug!(op = op.symbol(), "assignment without a value, target unchanged");
            return Ok(None);
        };
        if let Context::Write(root) = ctx {
            set_at_path(root, &segments, new_value.clone())?;
        }
        trace!(op = op.symbol(), value = %new_value, "assigned");
        Ok(Some(new_value))
    }

    /// Compound assignment when the target does not exist yet.
    fn absent_target(&self, op: BinOp, value: &Value) -> Result<Option<Value>, EvalError> {
        let sentinel = match op {
            BinOp::AddAssign => return Ok(Some(value.clone())),
            BinOp::SubtractAssign => return apply_binop(BinOp::Subtract, &Scalar::Integer(0), &value.scalar()),
            BinOp::MultiplyAssign => return Ok(Some(Value::from(0))),
            BinOp::DivideAssign => "infinity",
            _ => "undefined",
        };
        match self.env.options.absent_target {
            AbsentTarget::Sentinel => Ok(Some(Value::from(sentinel))),
            AbsentTarget::Error => Err(EvalError::AbsentTarget { operator: op.symbol() }),
        }
    }

    /// Walk `ctx` following a compiled path.
    ///
    /// A name or selector result is the matched node's children; an index
    /// result is the indexed node itself. A result holding a single childless
    /// node is reduced to that node's scalar.
    #[instrument(level = "trace", skip_all)]
    pub fn eval_path(&self, ctx: &Node, path: &Node) -> Result<Option<Value>, EvalError> {
        self.enter()?;
        let result = self.walk(ctx, path);
        self.leave();
        result
    }

    fn walk(&self, root: &Node, path: &Node) -> Result<Option<Value>, EvalError> {
        let elements = path.children();
        let mut ctx: Cow<'_, Node> = Cow::Borrowed(root);
        let mut prev: Option<Cow<'_, Node>> = None;
        let mut prev_name: Option<String> = None;
        let mut indexed = false;

        let mut i = 0;
        while i < elements.len() {
            let element = &elements[i];
            indexed = false;

            let name = match Marker::of(element) {
                Some(Marker::Index) => {
                    let ix = self.index(root, element)?;
                    let Some(next) = descend(&ctx, |n| n.child_at(ix)) else {
                        debug!(index = ix, len = ctx.len(), "index out of range");
                        return Ok(None);
                    };
                    prev = Some(std::mem::replace(&mut ctx, next));
                    indexed = true;
                    i += 1;
                    continue;
                }
                Some(Marker::Selector) => {
                    let (Some(parent), Some(name)) = (&prev, &prev_name) else {
                        return Err(EvalError::InvalidSelector);
                    };
                    let Some(selected) = self.select(root, element, parent, name)? else {
                        return Ok(None);
                    };
                    prev = Some(std::mem::replace(&mut ctx, Cow::Owned(selected)));
                    i += 1;
                    continue;
                }
                Some(Marker::Arguments) => {
                    let Some(name) = prev_name.clone() else {
                        return Err(EvalError::NotCallable(String::new()));
                    };
                    match self.call(root, &name, element)? {
                        Value::Node(n) => {
                            prev = Some(std::mem::replace(&mut ctx, Cow::Owned(n)));
                            i += 1;
                            continue;
                        }
                        scalar => return Ok(Some(scalar)),
                    }
                }
                Some(Marker::Group) => {
                    let name = match element.child_at(0) {
                        Some(expr) => self.eval(root, expr)?.map(|v| v.to_string()).unwrap_or_default(),
                        None => String::new(),
                    };
                    if name.is_empty() {
                        return Ok(None);
                    }
                    name
                }
                _ => element.this_string(),
            };

            match name.as_str() {
                "_len" => return Ok(Some(Value::from(ctx.len() as i64))),
                "_this" => return Ok(Some(Value::Node(ctx.into_owned()))),
                "_string" => return Ok(Some(Value::from(to_text(&present(ctx, false))))),
                "_thisString" => return Ok(Some(Value::from(ctx.this_string()))),
                _ => {}
            }

            if let Some(next) = descend(&ctx, |n| n.child(&name)) {
                prev = Some(std::mem::replace(&mut ctx, next));
                prev_name = Some(name);
                i += 1;
                continue;
            }

            // not a child: try the callable registry
            let args = elements
                .get(i + 1)
                .filter(|e| Marker::of(e) == Some(Marker::Arguments));
            let bound = ctx.child(TYPE_METADATA).is_some();
            if args.is_none() && !bound {
                debug!(element = %name, "path element not found");
                return Ok(None);
            }
            if args.is_none() && self.env.callable(&name).is_none() {
                debug!(element = %name, "no method bound to node");
                return Ok(None);
            }
            let empty = Marker::Arguments.node(vec![]);
            match self.call(root, &name, args.unwrap_or(&empty))? {
                Value::Node(n) => {
                    prev = Some(std::mem::replace(&mut ctx, Cow::Owned(n)));
                    prev_name = Some(name);
                    i += if args.is_some() { 2 } else { 1 };
                }
                scalar => return Ok(Some(scalar)),
            }
        }

        Ok(Some(simplify(present(ctx, indexed))))
    }

    /// `{}` collects the children of every node named `name` under `parent`;
    /// `{n}` takes the children of the n-th one.
    fn select(&self, root: &Node, element: &Node, parent: &Node, name: &str) -> Result<Option<Node>, EvalError> {
        let mut matches = parent.children().iter().filter(|n| n.is_named(name));
        let Some(expr) = element.child_at(0) else {
            let mut all = Node::wrapper();
            for n in matches {
                all.children_mut().extend(n.children().iter().cloned());
            }
            return Ok(Some(all));
        };
        let n = match self.eval(root, expr)?.and_then(|v| v.as_scalar().and_then(Scalar::as_int)) {
            Some(n) if n >= 0 => n as usize,
            _ => return Err(EvalError::InvalidSelector),
        };
        Ok(matches
            .nth(n)
            .map(|node| Node::Wrapper(node.children().to_vec())))
    }

    /// Evaluate an `!i` element against the root to a position.
    pub(crate) fn index(&self, root: &Node, element: &Node) -> Result<usize, EvalError> {
        let value = match element.child_at(0) {
            Some(expr) => self.eval(root, expr)?,
            None => None,
        };
        let ix = match value.as_ref().and_then(Value::as_scalar) {
            Some(Scalar::Integer(n)) => usize::try_from(*n).ok(),
            Some(Scalar::String(s)) => s.trim().parse::<usize>().ok(),
            _ => None,
        };
        ix.ok_or_else(|| {
            EvalError::InvalidIndex(value.map(|v| v.to_string()).unwrap_or_else(|| "nothing".into()))
        })
    }

    /// Invoke a registered callable with the evaluated `!a` arguments.
    fn call(&self, root: &Node, name: &str, args: &Node) -> Result<Value, EvalError> {
        let callable = self
            .env
            .callable(name)
            .ok_or_else(|| EvalError::NotCallable(name.to_string()))?;

        let mut values = Vec::with_capacity(args.len());
        for arg in args.children() {
            values.push(self.eval(root, arg)?.unwrap_or_default());
        }
        if let Some(expected) = callable.arity()
            && expected != values.len()
        {
            return Err(EvalError::ArgumentCount {
                name: name.to_string(),
                expected,
                found: values.len(),
            });
        }
        trace!(name, args = values.len(), "dispatch");
        callable.call(&values)
    }
}

/// Borrow a child of `ctx` when `ctx` is borrowed, clone it otherwise.
fn descend<'a>(ctx: &Cow<'a, Node>, f: impl for<'b> Fn(&'b Node) -> Option<&'b Node>) -> Option<Cow<'a, Node>> {
    match ctx {
        Cow::Borrowed(n) => f(*n).map(Cow::Borrowed),
        Cow::Owned(n) => f(n).cloned().map(Cow::Owned),
    }
}

/// The user-facing form of the final path context.
fn present(ctx: Cow<'_, Node>, indexed: bool) -> Node {
    if indexed {
        return Node::Wrapper(vec![ctx.into_owned()]);
    }
    match ctx {
        Cow::Owned(Node::Wrapper(children)) => Node::Wrapper(children),
        Cow::Owned(mut node) => Node::Wrapper(node.take_children()),
        Cow::Borrowed(node) => Node::Wrapper(node.children().to_vec()),
    }
}

fn simplify(node: Node) -> Value {
    match node.children() {
        [only] if only.is_empty() => match only.content() {
            Some(scalar) => Value::Scalar(scalar.clone()),
            None => Value::Node(node),
        },
        _ => Value::Node(node),
    }
}

/// Typed arithmetic: integers stay integers, a float operand promotes to
/// float, `+` concatenates anything else.
fn apply_binop(op: BinOp, left: &Scalar, right: &Scalar) -> Result<Option<Value>, EvalError> {
    match (left, right) {
        (Scalar::Integer(a), Scalar::Integer(b)) => {
            let (a, b) = (*a, *b);
            let n = match op {
                BinOp::Add => a.wrapping_add(b),
                BinOp::Subtract => a.wrapping_sub(b),
                BinOp::Multiply => a.wrapping_mul(b),
                BinOp::Divide if b == 0 => return Err(EvalError::DivisionByZero),
                BinOp::Divide => a.wrapping_div(b),
                BinOp::Modulo if b == 0 => return Err(EvalError::DivisionByZero),
                BinOp::Modulo => a.wrapping_rem(b),
                _ => return Ok(None),
            };
            Ok(Some(Value::from(n)))
        }
        (a, b) if a.is_numeric() && b.is_numeric() => {
            let (Some(a), Some(b)) = (a.coerce_float(), b.coerce_float()) else {
                return Ok(None);
            };
            let n = match op {
                BinOp::Add => a + b,
                BinOp::Subtract => a - b,
                BinOp::Multiply => a * b,
                BinOp::Divide => a / b,
                BinOp::Modulo => {
                    let (a, b) = (a as i64, b as i64);
                    if b == 0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    return Ok(Some(Value::from(a.wrapping_rem(b))));
                }
                _ => return Ok(None),
            };
            Ok(Some(Value::from(n)))
        }
        (a, b) if op == BinOp::Add => Ok(Some(Value::from(format!("{}{}", a, b)))),
        (a, b) => {
            debug!(op = op.symbol(), left = a.type_name(), right = b.type_name(), "no value for operands");
            Ok(None)
        }
    }
}

/// The left operand decides the domain: integer, float or text. Text only
/// supports equality.
fn compare(op: BinOp, left: &Scalar, right: &Scalar) -> bool {
    match left {
        Scalar::Integer(a) => right.coerce_int().is_some_and(|b| ordered(op, *a, b)),
        Scalar::Float(a) => right.coerce_float().is_some_and(|b| ordered(op, *a, b)),
        _ => match op {
            BinOp::Equal => left.to_string() == right.to_string(),
            BinOp::NotEqual => left.to_string() != right.to_string(),
            _ => false,
        },
    }
}

fn ordered<T: PartialOrd>(op: BinOp, a: T, b: T) -> bool {
    match op {
        BinOp::Equal => a == b,
        BinOp::NotEqual => a != b,
        BinOp::GreaterEqual => a >= b,
        BinOp::LessEqual => a <= b,
        BinOp::GreaterThan => a > b,
        BinOp::LessThan => a < b,
        _ => false,
    }
}

/// Both sides must read as booleans, otherwise the result is false.
fn logic(op: BinOp, left: &Scalar, right: &Scalar) -> bool {
    match (left.coerce_bool(), right.coerce_bool()) {
        (Some(a), Some(b)) if op == BinOp::And => a && b,
        (Some(a), Some(b)) if op == BinOp::Or => a || b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Scalar {
        Scalar::from(v)
    }

    #[test]
    fn test_apply_binop_types() {
        let int = |n| Scalar::Integer(n);
        assert_eq!(apply_binop(BinOp::Add, &int(1), &int(2)).unwrap(), Some(Value::from(3)));
        assert_eq!(
            apply_binop(BinOp::Add, &int(1), &Scalar::Float(2.0)).unwrap(),
            Some(Value::from(3.0))
        );
        assert_eq!(
            apply_binop(BinOp::Modulo, &Scalar::Float(11.0), &Scalar::Float(2.0)).unwrap(),
            Some(Value::from(1))
        );
        assert_eq!(
            apply_binop(BinOp::Add, &s("11.0-"), &Scalar::Float(2.0)).unwrap(),
            Some(Value::from("11.0-2"))
        );
        assert_eq!(apply_binop(BinOp::Multiply, &s("a"), &int(2)).unwrap(), None);
        assert_eq!(
            apply_binop(BinOp::Divide, &int(1), &int(0)),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn test_compare_left_decides() {
        assert!(compare(BinOp::Equal, &Scalar::Integer(1), &s("1")));
        assert!(compare(BinOp::GreaterThan, &Scalar::Float(1.5), &Scalar::Integer(1)));
        assert!(!compare(BinOp::LessThan, &s("a"), &s("b")));
        assert!(compare(BinOp::NotEqual, &s("a"), &s("b")));
        assert!(!compare(BinOp::Equal, &Scalar::Integer(1), &s("x")));
    }

    #[test]
    fn test_logic_requires_booleans() {
        assert!(logic(BinOp::Or, &s("false"), &s("true")));
        assert!(!logic(BinOp::Or, &s("yes"), &Scalar::Boolean(true)));
        assert!(logic(BinOp::And, &Scalar::Boolean(true), &s("true")));
    }
}
