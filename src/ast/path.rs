//! Path compiler.
//!
//! ```text
//! path     := element ('.' element)*
//! element  := token | quoted | '[' expression ']' | '{' expression? '}'
//!           | '.(' expression ')'          dynamic name
//!           | name '(' expressions ')'     call
//! ```
//!
//! The dot before `[`, `{` and `(` is optional, except that it decides what a
//! parenthesis means: `a.(b)` evaluates `b` and uses the result as the next
//! name, while `a(b)` calls `a` with the argument `b`.

use tracing::instrument;

use super::expression::Compiler;
use super::markers::Marker;
use crate::{
    environment::DEFAULT_MAX_DEPTH,
    lexer::is_token_char,
    node::Node,
    parser::ParseError,
};

impl Compiler {
    /// A path, tagged `!p`.
    pub(crate) fn path(&mut self) -> Result<Node, ParseError> {
        let mut elements = Vec::new();
        let mut after_dot = false;

        loop {
            let Some(c) = self.lexer.peek() else {
                break;
            };
            let opened_at = self.lexer.offset();
            let element = match c {
                '.' if !after_dot && !elements.is_empty() => {
                    self.lexer.read();
                    after_dot = true;
                    continue;
                }
                '[' => {
                    self.lexer.read();
                    self.lexer.whitespace();
                    let index = self.expression()?;
                    self.expect(']', opened_at)?;
                    Marker::Index.node(vec![index])
                }
                '{' => {
                    self.lexer.read();
                    self.lexer.whitespace();
                    let selector = if self.lexer.peek() == Some('}') {
                        vec![]
                    } else {
                        vec![self.expression()?]
                    };
                    self.expect('}', opened_at)?;
                    Marker::Selector.node(selector)
                }
                '(' => {
                    self.lexer.read();
                    let args = self.argument_list(opened_at)?;
                    let marker = if after_dot || elements.is_empty() {
                        Marker::Group
                    } else {
                        Marker::Arguments
                    };
                    marker.node(args)
                }
                '"' | '\'' => match self.lexer.quoted(0)? {
                    Some(name) => Node::new(name),
                    None => break,
                },
                c if is_token_char(c) => match self.lexer.token() {
                    Some(name) => Node::new(name),
                    None => break,
                },
                _ => break,
            };
            let is_name = Marker::of(&element).is_none();
            elements.push(element);
            after_dot = false;

            // names must be separated by a dot
            if is_name && self.lexer.peek().is_some_and(is_token_char) {
                break;
            }
        }

        if elements.is_empty() || after_dot {
            return Err(ParseError::ExpectedExpression(self.lexer.position()));
        }
        Ok(Marker::Path.node(elements))
    }

    /// Expressions separated by commas or spaces up to the closing `)`, each
    /// tagged `!e`.
    fn argument_list(&mut self, opened_at: usize) -> Result<Vec<Node>, ParseError> {
        let mut args = Vec::new();
        self.lexer.whitespace();
        if self.lexer.next_is(')') {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            self.lexer.whitespace();
            if self.lexer.next_is(',') {
                continue;
            }
            if self.lexer.next_is(')') {
                return Ok(args);
            }
            if self.lexer.peek().is_none() {
                return Err(ParseError::MissingDelimiter {
                    delimiter: ')',
                    position: self.lexer.position_at(opened_at),
                });
            }
        }
    }
}

/// Compile path text into a `!p` tree.
///
/// ```
/// use ogdl::compile_path;
/// use ogdl::output::to_show;
///
/// let p = compile_path("a.b[1]").unwrap();
/// assert_eq!(to_show(&p), "!p\n  a\n  b\n  !i\n    !e\n      1");
/// ```
#[instrument(level = "trace")]
pub fn compile_path(text: &str) -> Result<Node, ParseError> {
    compile_path_with_depth(text, DEFAULT_MAX_DEPTH)
}

pub fn compile_path_with_depth(text: &str, max_depth: usize) -> Result<Node, ParseError> {
    let mut compiler = Compiler::new(text, max_depth);
    compiler.lexer.whitespace();
    let path = compiler.path()?;
    compiler.finish()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::to_show;

    #[test]
    fn test_dot_decides_group_or_call() {
        let group = compile_path("a.(b)").unwrap();
        assert_eq!(to_show(&group), "!p\n  a\n  !g\n    !e\n      !p\n        b");

        let call = compile_path("a(b)").unwrap();
        assert_eq!(to_show(&call), "!p\n  a\n  !a\n    !e\n      !p\n        b");
    }

    #[test]
    fn test_empty_selector() {
        let p = compile_path("a.b{}").unwrap();
        assert_eq!(to_show(&p), "!p\n  a\n  b\n  !s");
    }

    #[test]
    fn test_missing_bracket() {
        let err = compile_path("a[1").unwrap_err();
        assert!(matches!(err, ParseError::MissingDelimiter { delimiter: ']', .. }));
    }

    #[test]
    fn test_trailing_dot() {
        assert!(compile_path("a.").is_err());
        assert!(compile_path("").is_err());
    }
}
