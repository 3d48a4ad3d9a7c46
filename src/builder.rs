//! Tree reconstruction from an ordered `(scalar, depth)` record stream.
//!
//! The text parser never touches the tree while scanning: it emits records
//! and hands them to a [`TreeBuilder`], which assembles the nested tree in a
//! single pass. The same primitive serves any producer that describes a tree
//! as a depth-annotated sequence (a binary decoder, a flat file log).

use tracing::{debug, instrument};

use crate::node::{Node, Scalar};

/// One node of a flattened tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub scalar: Scalar,
    /// 0 for the top-level nodes
    pub depth: usize,
}

/// Collects records and turns them into a tree.
///
/// The builder keeps an arena of `(scalar, parent)` entries plus a table
/// holding, for every depth seen so far, the arena index of the most recent
/// entry at that depth. A new record at depth `d` is attached to the entry
/// the table holds for `d - 1`; depth 0 is attached to the synthetic root.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    scalars: Vec<Scalar>,
    parents: Vec<Option<usize>>,
    last_at_depth: Vec<usize>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from any record iterator.
    pub fn from_records<I>(records: I) -> Node
    where
        I: IntoIterator<Item = Record>,
    {
        let mut builder = TreeBuilder::new();
        for r in records {
            builder.push(r.scalar, r.depth);
        }
        builder.finish()
    }

    pub fn len(&self) -> usize {
        self.scalars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty()
    }

    /// Append a record. A depth more than one level below the deepest open
    /// level is clamped to that level.
    pub fn push(&mut self, scalar: Scalar, depth: usize) {
        let depth = if depth > self.last_at_depth.len() {
            debug!(depth, open = self.last_at_depth.len(), "depth jump clamped");
            self.last_at_depth.len()
        } else {
            depth
        };
        let parent = depth.checked_sub(1).map(|d| self.last_at_depth[d]);
        let index = self.scalars.len();
        self.scalars.push(scalar);
        self.parents.push(parent);
        self.last_at_depth.truncate(depth);
        self.last_at_depth.push(index);
    }

    /// Assemble the tree under a transparent root.
    #[instrument(level = "trace", skip(self), fields(records = self.scalars.len()))]
    pub fn finish(self) -> Node {
        // Children always come after their parent in the arena, so walking it
        // backwards completes every node before it is moved into its parent.
        let mut slots: Vec<Option<Node>> = self.scalars.into_iter().map(|s| Some(Node::Leaf(s))).collect();
        let mut top = Vec::new();
        for i in (0..slots.len()).rev() {
            let Some(mut node) = slots[i].take() else {
                continue;
            };
            if let Node::Branch(_, children) = &mut node {
                children.reverse();
            }
            match self.parents[i] {
                Some(p) => {
                    if let Some(parent) = slots[p].as_mut() {
                        parent.children_mut().push(node);
                    }
                }
                None => top.push(node),
            }
        }
        top.reverse();
        Node::Wrapper(top)
    }
}
