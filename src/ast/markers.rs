use crate::node::Node;

/// Content of the child that gives a node dispatch metadata.
pub const TYPE_METADATA: &str = "!type";

/// Tags that mark the role of an AST subtree.
///
/// Paths and expressions compile to ordinary [`Node`] trees; the content of
/// the subtree root says how the evaluator must read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `!p` - path, children are the path elements
    Path,
    /// `!e` - expression, the single child is the reduced operator tree
    Expression,
    /// `!i` - index element `[expr]`
    Index,
    /// `!s` - selector element `{expr}`, zero or one child
    Selector,
    /// `!g` - dynamic path element `.(expr)`
    Group,
    /// `!a` - argument list `name(args)`
    Arguments,
    /// `!string` - quoted literal, the single child holds the text
    String,
}

impl Marker {
    pub fn as_str(self) -> &'static str {
        match self {
            Marker::Path => "!p",
            Marker::Expression => "!e",
            Marker::Index => "!i",
            Marker::Selector => "!s",
            Marker::Group => "!g",
            Marker::Arguments => "!a",
            Marker::String => "!string",
        }
    }

    pub fn from_tag(s: &str) -> Option<Marker> {
        match s {
            "!p" => Some(Marker::Path),
            "!e" => Some(Marker::Expression),
            "!i" => Some(Marker::Index),
            "!s" => Some(Marker::Selector),
            "!g" => Some(Marker::Group),
            "!a" => Some(Marker::Arguments),
            "!string" => Some(Marker::String),
            _ => None,
        }
    }

    /// The marker a node is tagged with, if any.
    pub fn of(node: &Node) -> Option<Marker> {
        Marker::from_tag(node.content()?.as_str()?)
    }

    /// A node tagged with this marker.
    pub fn node(self, children: Vec<Node>) -> Node {
        Node::with_children(self.as_str(), children)
    }
}
