//! Minimal structural check of a tree against a schema tree.
//!
//! A schema is an ordinary tree. Its nodes are compared with the data
//! position by position: a literal must equal the data content, a type tag
//! accepts any scalar of that kind.
//!
//! | tag       | accepts                                        |
//! |-----------|------------------------------------------------|
//! | `!int`    | integers, and text that parses as an integer   |
//! | `!float`  | numbers, and text that parses as a number      |
//! | `!bool`   | booleans, and the text `true` / `false`        |
//! | `!string` | text                                           |
//! | `!binary` | byte sequences                                 |
//!
//! ```
//! use ogdl::parse;
//!
//! let schema = parse("port !int\nhost !string").unwrap();
//! assert!(parse("port 80\nhost h").unwrap().check(&schema).is_ok());
//! assert!(parse("port http\nhost h").unwrap().check(&schema).is_err());
//! ```

use thiserror::Error;

use crate::node::{Node, Scalar};

#[derive(Error, Debug, Clone, PartialEq)]
#[error("at {}: want {expected}, got {found}", location(.path))]
pub struct SchemaMismatch {
    /// Dotted data path of the node whose children failed; empty at the top
    /// level
    pub path: String,
    pub expected: String,
    pub found: String,
}

fn location(path: &str) -> &str {
    if path.is_empty() { "top level" } else { path }
}

impl Node {
    /// Check this tree against `schema`. Data children beyond the ones the
    /// schema describes are ignored.
    pub fn check(&self, schema: &Node) -> Result<(), SchemaMismatch> {
        check_children(schema, self, "")
    }
}

fn check_children(schema: &Node, data: &Node, path: &str) -> Result<(), SchemaMismatch> {
    for (i, expected) in schema.children().iter().enumerate() {
        let mismatch = |found: String| SchemaMismatch {
            path: path.to_string(),
            expected: expected.this_string(),
            found,
        };
        let Some(found) = data.child_at(i) else {
            return Err(mismatch("nothing".to_string()));
        };
        if !accepts(expected, found) {
            return Err(mismatch(found.this_string()));
        }
        let name = found.this_string();
        let here = if path.is_empty() { name } else { format!("{}.{}", path, name) };
        check_children(expected, found, &here)?;
    }
    Ok(())
}

fn accepts(schema: &Node, data: &Node) -> bool {
    let (Some(tag), Some(value)) = (schema.content(), data.content()) else {
        return schema.content().is_none() && data.content().is_none();
    };
    let tag = tag.to_string();
    if !tag.starts_with('!') {
        return value.matches(&tag);
    }
    match tag.as_str() {
        "!int" => value.coerce_int().is_some(),
        "!float" => value.coerce_float().is_some(),
        "!bool" => value.coerce_bool().is_some(),
        "!string" => matches!(value, Scalar::String(_)),
        "!binary" => matches!(value, Scalar::Bytes(_)),
        _ => false,
    }
}
