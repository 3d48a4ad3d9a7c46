//! Expression compiler.
//!
//! `expression := unary (binary-op unary)*`
//! `unary := number | quoted | unary-op unary | '(' expression ')' | path`
//!
//! Compilation runs in two passes. The first pass reads operands and
//! operators into a flat list that alternates the two. The second pass walks
//! the precedence levels from the tightest to the loosest and, for every
//! operator of the current level, splices its left and right neighbours out
//! of the list and re-parents them under the operator, left to right. What
//! remains is a single, precedence correct tree.

use tracing::{instrument, trace};

use super::markers::Marker;
use super::operators::{BinOp, MAX_PRECEDENCE, UnaryOp};
use crate::{
    environment::DEFAULT_MAX_DEPTH,
    lexer::{Lexer, is_token_char},
    node::{Node, Scalar},
    parser::ParseError,
};

/// Shared state of the path and expression compilers.
pub(crate) struct Compiler {
    pub(crate) lexer: Lexer,
    depth: usize,
    max_depth: usize,
}

impl Compiler {
    pub(crate) fn new(input: &str, max_depth: usize) -> Self {
        Compiler {
            lexer: Lexer::new(input),
            depth: 0,
            max_depth,
        }
    }

    pub(crate) fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.max_depth,
                position: self.lexer.position(),
            });
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Fail unless only white space is left.
    pub(crate) fn finish(&mut self) -> Result<(), ParseError> {
        self.lexer.whitespace();
        match self.lexer.peek() {
            None => Ok(()),
            Some(found) => Err(ParseError::UnexpectedChar {
                found,
                position: self.lexer.position(),
            }),
        }
    }

    pub(crate) fn expect(&mut self, delimiter: char, opened_at: usize) -> Result<(), ParseError> {
        self.lexer.whitespace();
        if self.lexer.next_is(delimiter) {
            return Ok(());
        }
        Err(ParseError::MissingDelimiter {
            delimiter,
            position: self.lexer.position_at(opened_at),
        })
    }

    fn expected_expression(&self) -> ParseError {
        ParseError::ExpectedExpression(self.lexer.position())
    }

    /// An expression, tagged `!e`.
    pub(crate) fn expression(&mut self) -> Result<Node, ParseError> {
        self.enter()?;
        self.lexer.whitespace();

        let mut flat = vec![self.unary()?.ok_or_else(|| self.expected_expression())?];
        loop {
            let save = self.lexer.offset();
            self.lexer.whitespace();
            let Some(op) = self.binary_operator()? else {
                self.lexer.reset_to(save);
                break;
            };
            self.lexer.whitespace();
            let operand = self.unary()?.ok_or_else(|| self.expected_expression())?;
            flat.push(Node::new(op.symbol()));
            flat.push(operand);
        }

        let tree = reduce(flat);
        self.leave();
        Ok(Marker::Expression.node(vec![tree]))
    }

    fn unary(&mut self) -> Result<Option<Node>, ParseError> {
        if let Some(number) = self.lexer.number() {
            return self.number(&number).map(Some);
        }
        if let Some(s) = self.lexer.quoted(0)? {
            return Ok(Some(Marker::String.node(vec![Node::new(s)])));
        }
        let Some(c) = self.lexer.peek() else {
            return Ok(None);
        };
        if let Some(op) = UnaryOp::from_char(c) {
            self.lexer.read();
            self.lexer.whitespace();
            self.enter()?;
            let operand = self.unary()?.ok_or_else(|| self.expected_expression())?;
            self.leave();
            return Ok(Some(Node::with_children(op.symbol(), vec![operand])));
        }
        if c == '(' {
            let opened_at = self.lexer.offset();
            self.lexer.read();
            let inner = self.expression()?;
            self.expect(')', opened_at)?;
            return Ok(Some(inner));
        }
        if c == '[' || (is_token_char(c) && !c.is_ascii_digit()) {
            return self.path().map(Some);
        }
        Ok(None)
    }

    fn number(&self, text: &str) -> Result<Node, ParseError> {
        let scalar = if text.contains('.') {
            text.parse().map(Scalar::Float).ok()
        } else {
            text.parse()
                .map(Scalar::Integer)
                .or_else(|_| text.parse().map(Scalar::Float))
                .ok()
        };
        scalar
            .map(Node::Leaf)
            .ok_or_else(|| self.expected_expression())
    }

    /// The longest known binary operator at the start of an operator run; the
    /// rest of the run is left for the next operand.
    fn binary_operator(&mut self) -> Result<Option<BinOp>, ParseError> {
        let start = self.lexer.offset();
        let Some(run) = self.lexer.operator() else {
            return Ok(None);
        };
        let chars: Vec<char> = run.chars().collect();
        for len in (1..=chars.len()).rev() {
            let candidate: String = chars[..len].iter().collect();
            if let Some(op) = BinOp::from_symbol(&candidate) {
                self.lexer.unread(chars.len() - len);
                return Ok(Some(op));
            }
        }
        Err(ParseError::UnknownOperator {
            operator: run,
            position: self.lexer.position_at(start),
        })
    }
}

/// Second pass: fold the alternating operand/operator list into a tree.
fn reduce(mut flat: Vec<Node>) -> Node {
    for level in (0..=MAX_PRECEDENCE).rev() {
        let mut i = 1;
        while i < flat.len() {
            let binds = BinOp::from_symbol(&flat[i].this_string())
                .is_some_and(|op| op.precedence() == level);
            if !binds || i + 1 >= flat.len() {
                i += 2;
                continue;
            }
            let right = flat.remove(i + 1);
            let mut op = flat.remove(i);
            let left = flat.remove(i - 1);
            op.children_mut().extend([left, right]);
            flat.insert(i - 1, op);
        }
    }
    trace!(remaining = flat.len(), "reduced");
    flat.into_iter().next().unwrap_or_default()
}

/// Compile expression text into an `!e` tree.
///
/// ```
/// use ogdl::compile_expression;
/// use ogdl::output::to_show;
///
/// let e = compile_expression("1+2*3").unwrap();
/// assert_eq!(to_show(&e), "!e\n  +\n    1\n    *\n      2\n      3");
/// ```
#[instrument(level = "trace")]
pub fn compile_expression(text: &str) -> Result<Node, ParseError> {
    compile_expression_with_depth(text, DEFAULT_MAX_DEPTH)
}

pub fn compile_expression_with_depth(text: &str, max_depth: usize) -> Result<Node, ParseError> {
    let mut compiler = Compiler::new(text, max_depth);
    let expr = compiler.expression()?;
    compiler.finish()?;
    Ok(expr)
}
