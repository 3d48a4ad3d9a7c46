//! # OGDL
//!
//! Ordered trees of scalars written as indentation-significant text, plus
//! two small languages over them: paths (`a.b[0]`, `list{}`, `f(x)`) and
//! expressions (`price * qty > 100 && ok`, `total += n`).
//!
//! ```
//! use ogdl::parse;
//!
//! let mut tree = parse("
//! order
//!   item apple
//!   qty 3
//!   item pear
//!   qty 2
//! ").unwrap();
//!
//! assert_eq!(tree.get_string("order.item").unwrap().as_deref(), Some("apple"));
//! assert_eq!(tree.get_string("order.item{}").unwrap().as_deref(), Some("apple\npear"));
//!
//! tree.eval_str("total = order.qty * 2").unwrap();
//! assert_eq!(tree.get_int("total").unwrap(), Some(6));
//! ```
//!
//! ## Pipeline
//!
//! - [`lexer`] - character level productions shared by every grammar
//! - [`parser`] - OGDL text to `(scalar, depth)` records
//! - [`builder`] - records to a [`Node`] tree
//! - [`ast`] - path and expression compilers producing marker-tagged trees
//! - [`evaluator`] - walks compiled paths and expressions against a tree
//! - [`output`] - trees back to OGDL text

pub mod ast;
pub mod builder;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod node;
pub mod output;
pub mod parser;
pub mod query;
pub mod schema;
pub mod transform;
pub mod value;

pub use ast::{BinOp, Marker, UnaryOp, compile_expression, compile_path};
pub use builder::{Record, TreeBuilder};
pub use environment::{AbsentTarget, Callable, DEFAULT_MAX_DEPTH, Environment, Options};
pub use error::{Error, Result};
pub use evaluator::{EvalError, Evaluator};
pub use lexer::{LexError, Lexer, Position};
pub use node::{Node, Scalar};
pub use output::{to_show, to_text};
pub use parser::{ParseError, Parser, parse, parse_reader, parse_with};
pub use schema::SchemaMismatch;
pub use transform::PathSegment;
pub use value::Value;
