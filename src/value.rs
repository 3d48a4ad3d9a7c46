use std::borrow::Cow;
use std::fmt;

use crate::node::{Node, Scalar};

/// The result of evaluating a path or an expression.
///
/// Evaluation either produces a single scalar (`a.b` on `a b 1`, `1+2`) or a
/// tree fragment (`a` on a node with several children). Absence is not a
/// value: evaluators return `Option<Value>` and use `None` for "no such data".
///
/// # Examples
///
/// ```
/// use ogdl::{Node, Value};
///
/// let n = Value::from(42);
/// assert_eq!(n.to_int(), Some(42));
/// assert_eq!(n.to_string(), "42");
///
/// let mut tree = Node::wrapper();
/// tree.add("x");
/// tree.add("y");
/// let v = Value::Node(tree);
/// assert_eq!(v.to_string(), "x\ny");
/// assert_eq!(v.as_scalar(), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single leaf value
    Scalar(Scalar),

    /// A tree fragment; usually a wrapper holding the matched nodes
    Node(Node),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(n) => Some(n),
            Value::Scalar(_) => None,
        }
    }

    /// Scalar view of the value. A tree reads as its text form.
    pub fn scalar(&self) -> Cow<'_, Scalar> {
        match self {
            Value::Scalar(s) => Cow::Borrowed(s),
            Value::Node(n) => Cow::Owned(Scalar::String(n.to_string())),
        }
    }

    /// Get as integer, parsing text when needed
    pub fn to_int(&self) -> Option<i64> {
        self.as_scalar()?.coerce_int()
    }

    /// Get as float, parsing text when needed
    pub fn to_float(&self) -> Option<f64> {
        self.as_scalar()?.coerce_float()
    }

    /// Native booleans and the strings `"true"` / `"false"`.
    pub fn to_bool(&self) -> Option<bool> {
        self.as_scalar()?.coerce_bool()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::Scalar(Scalar::Bytes(b)) => b.clone(),
            other => other.to_string().into_bytes(),
        }
    }

    /// Text that reads as a number or boolean becomes native; trees are kept.
    pub fn normalize(self) -> Value {
        match self {
            Value::Scalar(s) => Value::Scalar(s.normalize()),
            node => node,
        }
    }

    /// The value as a tree node: a scalar becomes a leaf.
    pub fn into_node(self) -> Node {
        match self {
            Value::Scalar(s) => Node::Leaf(s),
            Value::Node(n) => n,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Scalar(Scalar::default())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{}", s),
            Value::Node(n) => write!(f, "{}", n),
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<Node> for Value {
    fn from(n: Node) -> Self {
        Value::Node(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Scalar::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(Scalar::String(s))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Scalar(Scalar::Integer(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Scalar(Scalar::Integer(n as i64))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Scalar(Scalar::Float(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Boolean(b))
    }
}
