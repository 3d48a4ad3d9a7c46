//! The OGDL tree model.
//!
//! Every document, path and expression is represented with the same [`Node`]
//! type: an ordered tree whose nodes optionally carry a [`Scalar`].
//!
//! # Node shapes
//!
//! - [`Node::Leaf`] - a scalar without children
//! - [`Node::Branch`] - a scalar with an ordered list of children
//! - [`Node::Wrapper`] - a transparent node that only groups children
//!   (the document root, a multi-valued path result)
//!
//! A `Leaf` that receives a child turns into a `Branch`; both compare equal
//! when their content matches and the branch has no children.
//!
//! # Examples
//!
//! ```
//! use ogdl::Node;
//!
//! let mut root = Node::wrapper();
//! root.add("config").add("port").add(8080);
//!
//! assert_eq!(root.child("config").map(|n| n.len()), Some(1));
//! assert_eq!(root.to_string(), "config\n  port\n    8080");
//! ```

use std::fmt;

/// A leaf value stored in a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// UTF-8 text (everything the text parser produces by default)
    String(String),

    /// Signed 64-bit integer
    Integer(i64),

    /// 64-bit float
    Float(f64),

    /// Boolean
    Boolean(bool),

    /// Opaque byte sequence
    Bytes(Vec<u8>),
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::String(String::new())
    }
}

impl Scalar {
    /// Borrow the text of a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Native integer only, no coercion.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Native float only, no coercion.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Scalar::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Integer view of the scalar: integers as is, floats truncated and
    /// text parsed as a base-10 integer.
    pub fn coerce_int(&self) -> Option<i64> {
        match self {
            Scalar::Integer(n) => Some(*n),
            Scalar::Float(n) => Some(*n as i64),
            Scalar::String(s) => s.trim().parse().ok(),
            Scalar::Bytes(b) => std::str::from_utf8(b).ok()?.trim().parse().ok(),
            Scalar::Boolean(_) => None,
        }
    }

    /// Float view of the scalar: numbers widened, text parsed.
    pub fn coerce_float(&self) -> Option<f64> {
        match self {
            Scalar::Integer(n) => Some(*n as f64),
            Scalar::Float(n) => Some(*n),
            Scalar::String(s) => parse_float(s.trim()),
            Scalar::Bytes(b) => parse_float(std::str::from_utf8(b).ok()?.trim()),
            Scalar::Boolean(_) => None,
        }
    }

    /// Boolean view of the scalar: native booleans and the exact strings
    /// `"true"` / `"false"`.
    pub fn coerce_bool(&self) -> Option<bool> {
        match self {
            Scalar::Boolean(b) => Some(*b),
            Scalar::String(s) => parse_bool(s),
            Scalar::Bytes(b) => parse_bool(std::str::from_utf8(b).ok()?),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Integer(_) | Scalar::Float(_))
    }

    /// Reduce text that reads as a number or a boolean to its native form.
    ///
    /// ```
    /// use ogdl::Scalar;
    ///
    /// assert_eq!(Scalar::from("12").normalize(), Scalar::Integer(12));
    /// assert_eq!(Scalar::from("-1.5").normalize(), Scalar::Float(-1.5));
    /// assert_eq!(Scalar::from("true").normalize(), Scalar::Boolean(true));
    /// assert_eq!(Scalar::from("12a").normalize(), Scalar::from("12a"));
    /// ```
    pub fn normalize(self) -> Scalar {
        let Scalar::String(s) = &self else {
            return self;
        };
        if let Some(b) = parse_bool(s) {
            return Scalar::Boolean(b);
        }
        if !is_number(s) {
            return self;
        }
        if let Ok(n) = s.parse::<i64>() {
            return Scalar::Integer(n);
        }
        match s.parse::<f64>() {
            Ok(f) => Scalar::Float(f),
            Err(_) => self,
        }
    }

    /// Name of the scalar kind, as used by schema type tags.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::String(_) => "string",
            Scalar::Integer(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::Boolean(_) => "bool",
            Scalar::Bytes(_) => "binary",
        }
    }

    /// Compare the stringified scalar with `name` without allocating for
    /// string scalars.
    pub(crate) fn matches(&self, name: &str) -> bool {
        match self {
            Scalar::String(s) => s == name,
            other => other.to_string() == name,
        }
    }
}

/// True for an optional sign, at least one digit and at most one decimal point.
pub(crate) fn is_number(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

fn parse_float(s: &str) -> Option<f64> {
    if is_number(s) { s.parse().ok() } else { None }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Integer(n) => write!(f, "{}", n),
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::Boolean(b) => write!(f, "{}", b),
            Scalar::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Integer(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Integer(n as i64)
    }
}

impl From<usize> for Scalar {
    fn from(n: usize) -> Self {
        Scalar::Integer(n as i64)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Float(n)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Boolean(b)
    }
}

impl From<Vec<u8>> for Scalar {
    fn from(b: Vec<u8>) -> Self {
        Scalar::Bytes(b)
    }
}

/// An ordered tree node.
///
/// Ownership is strictly tree shaped: children are owned by their parent and
/// dropped with it.
#[derive(Debug, Clone)]
pub enum Node {
    Leaf(Scalar),
    Branch(Scalar, Vec<Node>),
    Wrapper(Vec<Node>),
}

impl Default for Node {
    fn default() -> Self {
        Node::Wrapper(Vec::new())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.content() == other.content() && self.children() == other.children()
    }
}

impl From<Scalar> for Node {
    fn from(value: Scalar) -> Self {
        Node::Leaf(value)
    }
}

impl Node {
    /// Create a childless node holding `content`.
    pub fn new(content: impl Into<Scalar>) -> Self {
        Node::Leaf(content.into())
    }

    /// Create an empty transparent node.
    pub fn wrapper() -> Self {
        Node::Wrapper(Vec::new())
    }

    pub fn with_children(content: impl Into<Scalar>, children: Vec<Node>) -> Self {
        Node::Branch(content.into(), children)
    }

    /// The node's scalar, `None` for a wrapper.
    pub fn content(&self) -> Option<&Scalar> {
        match self {
            Node::Leaf(s) | Node::Branch(s, _) => Some(s),
            Node::Wrapper(_) => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Leaf(_) => &[],
            Node::Branch(_, children) | Node::Wrapper(children) => children,
        }
    }

    /// Mutable access to the children list; a leaf becomes a branch.
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        if let Node::Leaf(s) = self {
            let content = std::mem::take(s);
            *self = Node::Branch(content, Vec::new());
        }
        match self {
            Node::Branch(_, children) | Node::Wrapper(children) => children,
            Node::Leaf(_) => unreachable!("leaf converted to branch above"),
        }
    }

    /// Take the children out of the node, leaving it childless.
    pub fn take_children(&mut self) -> Vec<Node> {
        match self {
            Node::Leaf(_) => Vec::new(),
            Node::Branch(_, children) | Node::Wrapper(children) => std::mem::take(children),
        }
    }

    pub fn len(&self) -> usize {
        self.children().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children().is_empty()
    }

    pub fn is_wrapper(&self) -> bool {
        matches!(self, Node::Wrapper(_))
    }

    /// True when the node has no children, whatever its variant.
    pub fn is_leaf(&self) -> bool {
        self.children().is_empty() && !self.is_wrapper()
    }

    /// The content as text; empty for a wrapper.
    pub fn this_string(&self) -> String {
        self.content().map(|s| s.to_string()).unwrap_or_default()
    }

    /// True when the content, stringified, equals `name`.
    pub fn is_named(&self, name: &str) -> bool {
        self.content().is_some_and(|s| s.matches(name))
    }

    /// Replace the content, keeping the children.
    pub fn set_content(&mut self, content: impl Into<Scalar>) {
        let content = content.into();
        match self {
            Node::Leaf(s) | Node::Branch(s, _) => *s = content,
            Node::Wrapper(children) => {
                let children = std::mem::take(children);
                *self = Node::Branch(content, children);
            }
        }
    }

    /// Append a new child holding `content` and return it for chaining.
    pub fn add(&mut self, content: impl Into<Scalar>) -> &mut Node {
        self.push(Node::Leaf(content.into()))
    }

    /// Append `node` as a single child and return it.
    pub fn push(&mut self, node: Node) -> &mut Node {
        let children = self.children_mut();
        children.push(node);
        let last = children.len() - 1;
        &mut children[last]
    }

    /// Append `node`; the children of a wrapper are spliced in instead.
    pub fn append(&mut self, node: Node) {
        match node {
            Node::Wrapper(children) => self.children_mut().extend(children),
            other => self.children_mut().push(other),
        }
    }

    /// First child whose stringified content equals `name`.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children().iter().find(|n| n.is_named(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        let i = self.position(name)?;
        self.children_mut().get_mut(i)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.children().iter().position(|n| n.is_named(name))
    }

    pub fn child_at(&self, i: usize) -> Option<&Node> {
        self.children().get(i)
    }

    pub fn child_at_mut(&mut self, i: usize) -> Option<&mut Node> {
        if i >= self.len() {
            return None;
        }
        self.children_mut().get_mut(i)
    }

    /// First child named `name`, created when missing.
    pub fn child_or_insert(&mut self, name: &str) -> &mut Node {
        match self.position(name) {
            Some(i) => &mut self.children_mut()[i],
            None => self.add(name),
        }
    }

    /// Remove the first child named `name`.
    pub fn remove(&mut self, name: &str) -> Option<Node> {
        let i = self.position(name)?;
        self.remove_at(i)
    }

    pub fn remove_at(&mut self, i: usize) -> Option<Node> {
        if i >= self.len() {
            return None;
        }
        Some(self.children_mut().remove(i))
    }

    /// Number of levels below this node: 0 for a childless node.
    pub fn depth(&self) -> usize {
        self.children()
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Direct children, in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.children().iter()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::output::to_text(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_becomes_branch() {
        let mut n = Node::new("a");
        n.add("b");
        assert!(matches!(n, Node::Branch(_, _)));
        assert_eq!(n.len(), 1);
    }

    #[test]
    fn test_leaf_equals_empty_branch() {
        assert_eq!(Node::new("a"), Node::with_children("a", vec![]));
        assert_ne!(Node::new("a"), Node::wrapper());
    }

    #[test]
    fn test_append_splices_wrapper() {
        let mut n = Node::wrapper();
        n.append(Node::Wrapper(vec![Node::new(1), Node::new(2)]));
        n.append(Node::new(3));
        assert_eq!(n.len(), 3);
    }

    #[test]
    fn test_child_lookup_by_stringified_content() {
        let mut n = Node::wrapper();
        n.add(12);
        n.add("x");
        assert!(n.child("12").is_some());
        assert!(n.child("y").is_none());
    }

    #[test]
    fn test_child_or_insert() {
        let mut n = Node::wrapper();
        n.child_or_insert("a").add(1);
        n.child_or_insert("a").add(2);
        assert_eq!(n.len(), 1);
        assert_eq!(n.child("a").map(Node::len), Some(2));
    }

    #[test]
    fn test_depth() {
        let mut n = Node::wrapper();
        n.add("a").add("b").add("c");
        assert_eq!(n.depth(), 3);
        assert_eq!(Node::new("x").depth(), 0);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(Scalar::from("0").normalize(), Scalar::Integer(0));
        assert_eq!(Scalar::from("1.").normalize(), Scalar::Float(1.0));
        assert_eq!(Scalar::from("-").normalize(), Scalar::from("-"));
        assert_eq!(Scalar::from("1.2.3").normalize(), Scalar::from("1.2.3"));
    }

    #[test]
    fn test_coercions() {
        assert_eq!(Scalar::from(" 42 ").coerce_int(), Some(42));
        assert_eq!(Scalar::Float(2.9).coerce_int(), Some(2));
        assert_eq!(Scalar::from("inf").coerce_float(), None);
        assert_eq!(Scalar::from("false").coerce_bool(), Some(false));
        assert_eq!(Scalar::from("yes").coerce_bool(), None);
    }
}
