//! OGDL text parser.
//!
//! Parsing happens in two stages:
//!
//! 1. [`Parser::records`] scans the text line by line and emits a flat list
//!    of `(scalar, depth)` [`Record`]s. Indentation bookkeeping lives here.
//! 2. [`TreeBuilder`] turns the records into the nested tree in one pass.
//!
//! # Structure rules
//!
//! - The indentation of a line decides its depth: deeper than the previous
//!   line opens a new level, equal indentation is a sibling, shallower returns
//!   to the ancestor level with matching indentation.
//! - On one line, space nests: `a b c` is the chain `a -> b -> c`.
//! - A comma makes the next element a sibling of the previous one:
//!   `a b, c` is `a` with the two children `b` and `c`.
//! - `( ... )` groups follow the same rules and occupy one position.
//! - `#` followed by white space starts a comment; `\` at the end of a line
//!   starts a literal block made of the more indented lines below.
//!
//! ```
//! use ogdl::parse;
//!
//! let tree = parse("a b, c\nd (e f, g)").unwrap();
//! assert_eq!(tree.to_string(), "a\n  b\n  c\nd\n  e\n    f\n    g");
//! ```

use std::io::Read;

use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::{
    builder::{Record, TreeBuilder},
    environment::Options,
    lexer::{LexError, Lexer, Position},
    node::{Node, Scalar},
};

/// Malformed OGDL, path or expression text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("mixed tabs and spaces in indentation at {0}")]
    NonUniformIndent(Position),

    #[error("missing '{delimiter}' for the group opened at {position}")]
    MissingDelimiter { delimiter: char, position: Position },

    #[error("unexpected '{found}' at {position}")]
    UnexpectedChar { found: char, position: Position },

    #[error("unknown operator '{operator}' at {position}")]
    UnknownOperator { operator: String, position: Position },

    #[error("expected an expression at {0}")]
    ExpectedExpression(Position),

    #[error("nesting deeper than {limit} levels at {position}")]
    TooDeep { limit: usize, position: Position },

    #[error("read error: {0}")]
    Io(String),
}

impl ParseError {
    /// Where the problem was found, when it relates to a place in the input.
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::Lex(e) => Some(e.position()),
            ParseError::NonUniformIndent(p)
            | ParseError::ExpectedExpression(p)
            | ParseError::MissingDelimiter { position: p, .. }
            | ParseError::UnexpectedChar { position: p, .. }
            | ParseError::UnknownOperator { position: p, .. }
            | ParseError::TooDeep { position: p, .. } => Some(*p),
            ParseError::Io(_) => None,
        }
    }
}

pub struct Parser {
    lexer: Lexer,
    options: Options,
    records: Vec<Record>,
    /// Indentation width of every open level, outermost first
    indents: Vec<usize>,
    level: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Self::with_options(input, &Options::default())
    }

    pub fn with_options(input: &str, options: &Options) -> Self {
        Parser {
            lexer: Lexer::new(input),
            options: options.clone(),
            records: Vec::new(),
            indents: Vec::new(),
            level: 0,
        }
    }

    /// Parse the whole input into a tree under a transparent root.
    #[instrument(level = "trace", skip(self))]
    pub fn parse(self) -> Result<Node, ParseError> {
        let records = self.records()?;
        Ok(TreeBuilder::from_records(records))
    }

    /// Scan the input into its flat record form.
    pub fn records(mut self) -> Result<Vec<Record>, ParseError> {
        while self.line()? {}
        trace!(records = self.records.len(), "scanned");
        Ok(self.records)
    }

    /// `Line ::= Space(n) Sequence? (Comment? Break | Block)?`
    ///
    /// Returns false at the end of input.
    fn line(&mut self) -> Result<bool, ParseError> {
        let line_start = self.lexer.offset();
        let sp = self.lexer.space();

        if self.lexer.is_end() {
            return Ok(false);
        }
        if self.lexer.line_break() {
            return Ok(true);
        }
        if self.lexer.comment() {
            return Ok(self.lexer.line_break());
        }
        if !sp.uniform {
            return Err(ParseError::NonUniformIndent(self.lexer.position_at(line_start)));
        }

        self.level = self.depth_for(sp.count);

        // a stray comma at the start of a line is ignored
        if self.lexer.next_is(',') {
            self.lexer.space();
        }

        if self.sequence(sp.count, true)? {
            return Ok(true);
        }

        self.lexer.space();
        self.lexer.comment();
        if self.lexer.is_end() {
            return Ok(false);
        }
        if self.lexer.line_break() {
            return Ok(true);
        }
        Err(self.unexpected())
    }

    fn depth_for(&mut self, indent: usize) -> usize {
        while self.indents.last().is_some_and(|&top| top > indent) {
            self.indents.pop();
        }
        if self.indents.last() != Some(&indent) {
            self.indents.push(indent);
        }
        self.indents.len() - 1
    }

    /// Scalars and groups separated by space or commas. Returns true when a
    /// block consumed the rest of the line.
    fn sequence(&mut self, indent: usize, allow_block: bool) -> Result<bool, ParseError> {
        loop {
            if self.group(indent)? {
                // the group restored the level it started at
            } else if let Some(block) = self.block(indent, allow_block)? {
                self.emit(Scalar::String(block))?;
                return Ok(true);
            } else if self.lexer.comment() {
                return Ok(false);
            } else if let Some(scalar) = self.scalar(indent)? {
                self.emit(scalar)?;
            } else {
                return Ok(false);
            }

            self.lexer.space();
            if self.lexer.next_is(',') {
                self.lexer.space();
            } else {
                self.level += 1;
            }
        }
    }

    fn block(&mut self, indent: usize, allow_block: bool) -> Result<Option<String>, ParseError> {
        if !allow_block {
            return Ok(None);
        }
        Ok(self.lexer.block(indent)?)
    }

    /// `Group ::= '(' Space? Sequence? Space? ')'`
    fn group(&mut self, indent: usize) -> Result<bool, ParseError> {
        let start = self.lexer.offset();
        if !self.lexer.next_is('(') {
            return Ok(false);
        }
        let level = self.level;

        self.lexer.space();
        self.sequence(indent, false)?;
        self.lexer.space();

        if !self.lexer.next_is(')') {
            return Err(ParseError::MissingDelimiter {
                delimiter: ')',
                position: self.lexer.position_at(start),
            });
        }
        self.level = level;
        Ok(true)
    }

    /// `Scalar ::= Quoted | String`
    fn scalar(&mut self, indent: usize) -> Result<Option<Scalar>, ParseError> {
        if let Some(s) = self.lexer.quoted(indent)? {
            return Ok(Some(Scalar::String(s)));
        }
        Ok(self.lexer.text().map(|s| {
            let scalar = Scalar::String(s);
            if self.options.typed_scalars {
                scalar.normalize()
            } else {
                scalar
            }
        }))
    }

    fn emit(&mut self, scalar: Scalar) -> Result<(), ParseError> {
        if self.level > self.options.max_depth {
            debug!(level = self.level, limit = self.options.max_depth, "tree too deep");
            return Err(ParseError::TooDeep {
                limit: self.options.max_depth,
                position: self.lexer.position(),
            });
        }
        self.records.push(Record {
            scalar,
            depth: self.level,
        });
        Ok(())
    }

    fn unexpected(&self) -> ParseError {
        ParseError::UnexpectedChar {
            found: self.lexer.peek().unwrap_or(' '),
            position: self.lexer.position(),
        }
    }
}

/// Parse OGDL text with default options.
pub fn parse(input: &str) -> Result<Node, ParseError> {
    Parser::new(input).parse()
}

pub fn parse_with(input: &str, options: &Options) -> Result<Node, ParseError> {
    Parser::with_options(input, options).parse()
}

/// Read the whole stream, then parse it.
pub fn parse_reader<R: Read>(mut reader: R) -> Result<Node, ParseError> {
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .map_err(|e| ParseError::Io(e.to_string()))?;
    parse(&input)
}
