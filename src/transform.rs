use crate::{
    ast::Marker,
    evaluator::{EvalError, Evaluator},
    node::{Node, Scalar},
    value::Value,
};

/// A segment in a navigable path used for assignments.
///
/// Assignment targets are compiled paths; before the tree is modified every
/// index and dynamic name in the target is evaluated once and the path is
/// reduced to plain segments.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Child access by name
    ///
    /// # Examples
    /// - `a` → `Field("a")`
    /// - `a.b` → `[Field("a"), Field("b")]`
    /// - `a.(k)` with `k` holding `x` → `[Field("a"), Field("x")]`
    Field(String),

    /// Child access by position
    ///
    /// # Examples
    /// - `list[0]` → `[Field("list"), Index(0)]`
    Index(usize),
}

/// A sequence of path segments locating a node in a tree.
pub type Path = Vec<PathSegment>;

/// Reduce an assignment target to plain segments.
///
/// Index expressions and dynamic names are evaluated against `root`.
/// Selectors and argument lists cannot be assigned to.
pub fn extract_path(evaluator: &Evaluator<'_>, root: &Node, path: &Node) -> Result<Path, EvalError> {
    if Marker::of(path) != Some(Marker::Path) {
        return Err(EvalError::InvalidAssignmentTarget);
    }

    let mut segments = Vec::with_capacity(path.len());
    for element in path.children() {
        match Marker::of(element) {
            None => segments.push(PathSegment::Field(element.this_string())),
            Some(Marker::Index) => segments.push(PathSegment::Index(evaluator.index(root, element)?)),
            Some(Marker::Group) => {
                let name = match element.child_at(0) {
                    Some(expr) => evaluator.eval(root, expr)?,
                    None => None,
                };
                match name.map(|v| v.to_string()) {
                    Some(name) if !name.is_empty() => segments.push(PathSegment::Field(name)),
                    _ => return Err(EvalError::InvalidAssignmentTarget),
                }
            }
            Some(_) => return Err(EvalError::InvalidAssignmentTarget),
        }
    }
    Ok(segments)
}

/// The node a path leads to, if it exists.
pub fn get_at_path<'a>(root: &'a Node, path: &[PathSegment]) -> Option<&'a Node> {
    path.iter().try_fold(root, |node, segment| match segment {
        PathSegment::Field(name) => node.child(name),
        PathSegment::Index(i) => node.child_at(*i),
    })
}

/// The value stored at a path: the content of the target's first child.
pub fn current_value(root: &Node, path: &[PathSegment]) -> Option<Scalar> {
    let target = get_at_path(root, path)?;
    let first = target.child_at(0)?.content()?;
    Some(first.clone().normalize())
}

/// Store `value` at the end of `path`, creating missing named nodes and
/// replacing the target's children.
pub fn set_at_path(root: &mut Node, path: &[PathSegment], value: Value) -> Result<(), EvalError> {
    let mut node = root;
    for segment in path {
        node = match segment {
            PathSegment::Field(name) => node.child_or_insert(name),
            PathSegment::Index(i) => {
                let len = node.len();
                node.child_at_mut(*i)
                    .ok_or_else(|| EvalError::InvalidIndex(format!("{} (only {} children)", i, len)))?
            }
        };
    }
    node.take_children();
    node.append(value.into_node());
    Ok(())
}
