//! # Path and expression syntax trees
//!
//! Paths and expressions compile to ordinary [`Node`](crate::Node) trees.
//! The root of every subtree carries a marker that tells the evaluator how to
//! read it, so a compiled query can be printed, stored or built by hand like
//! any other OGDL tree.
//!
//! ## Submodules
//!
//! - **[markers]** - the marker tags (`!p`, `!e`, `!i`, ...)
//! - **[operators]** - binary and unary operators with their precedence
//! - **[path]** - the path compiler
//! - **[expression]** - the two-pass expression compiler
//!
//! ## Shapes
//!
//! ```text
//! a.b[0]          !p
//!                   a
//!                   b
//!                   !i
//!                     !e
//!                       0
//!
//! x + 'y'         !e
//!                   +
//!                     !p
//!                       x
//!                     !string
//!                       y
//! ```
//!
//! Numeric literals are stored as native integer or float scalars, operators
//! as their symbol with one (prefix) or two (binary) children.

pub mod expression;
pub mod markers;
pub mod operators;
pub mod path;

pub use expression::compile_expression;
pub use markers::{Marker, TYPE_METADATA};
pub use operators::{BinOp, UnaryOp};
pub use path::compile_path;
