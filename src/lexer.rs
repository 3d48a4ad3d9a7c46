//! Character level productions shared by the OGDL text parser and the
//! path and expression compilers.
//!
//! The lexer owns the decoded input and a cursor. Every production either
//! consumes what it recognises and returns it, or leaves the cursor where it
//! was. Arbitrary pushback is available through [`Lexer::unread`], which the
//! indentation parser uses to hand a whole run of leading white space back
//! after deciding whether a block follows.

use std::fmt;

use thiserror::Error;

/// Characters that may form an operator run.
pub const OPERATOR_CHARS: &str = "+-*/%&|!<>=~^";

/// A 1-based line and column in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors raised by the lexical productions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unterminated quoted string starting at {0}")]
    UnterminatedQuote(Position),

    #[error("mixed tabs and spaces at {0}")]
    NonUniformSpace(Position),
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnterminatedQuote(p) | LexError::NonUniformSpace(p) => *p,
        }
    }
}

/// A run of spaces and tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Space {
    /// Number of characters consumed
    pub count: usize,
    /// False when the run mixes tabs and spaces
    pub uniform: bool,
    /// The character the run is made of (a space for empty or mixed runs)
    pub fill: char,
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// The character under the cursor.
    pub fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    pub fn read(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        Some(c)
    }

    /// Push back the last `n` characters.
    pub fn unread(&mut self, n: usize) {
        self.position = self.position.saturating_sub(n);
    }

    pub fn offset(&self) -> usize {
        self.position
    }

    pub fn reset_to(&mut self, offset: usize) {
        self.position = offset.min(self.input.len());
    }

    /// Line and column of the cursor.
    pub fn position(&self) -> Position {
        self.position_at(self.position)
    }

    pub fn position_at(&self, offset: usize) -> Position {
        let mut pos = Position { line: 1, column: 1 };
        for &c in self.input.iter().take(offset) {
            if c == '\n' {
                pos.line += 1;
                pos.column = 1;
            } else {
                pos.column += 1;
            }
        }
        pos
    }

    /// Consume `c` if it is the next character.
    pub fn next_is(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// True at the end of input or on a control character that cannot
    /// appear in OGDL text.
    pub fn is_end(&self) -> bool {
        self.peek().is_none_or(is_end_char)
    }

    /// `(0x20|0x09)*`
    pub fn space(&mut self) -> Space {
        let mut spaces = 0;
        let mut tabs = 0;
        while let Some(c) = self.peek() {
            match c {
                ' ' => spaces += 1,
                '\t' => tabs += 1,
                _ => break,
            }
            self.position += 1;
        }
        Space {
            count: spaces + tabs,
            uniform: spaces == 0 || tabs == 0,
            fill: if spaces == 0 && tabs > 0 { '\t' } else { ' ' },
        }
    }

    /// LF, CR or CR+LF.
    pub fn line_break(&mut self) -> bool {
        match self.peek() {
            Some('\n') => {
                self.position += 1;
                true
            }
            Some('\r') => {
                self.position += 1;
                self.next_is('\n');
                true
            }
            _ => false,
        }
    }

    /// Spaces, tabs and line breaks.
    pub fn whitespace(&mut self) -> bool {
        let start = self.position;
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.position += 1;
        }
        self.position > start
    }

    /// A `'` or `"` quoted string, possibly spanning several lines.
    ///
    /// On every embedded line break the indentation of the continuation line
    /// is consumed and only what exceeds `indent` is kept. A backslash escapes
    /// the active quote character and is kept literally before anything else.
    pub fn quoted(&mut self, indent: usize) -> Result<Option<String>, LexError> {
        let start = self.position;
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Ok(None),
        };
        self.position += 1;

        let mut buf = String::new();
        loop {
            let Some(c) = self.peek().filter(|&c| !is_end_char(c)) else {
                return Err(LexError::UnterminatedQuote(self.position_at(start)));
            };
            if c == quote {
                self.position += 1;
                return Ok(Some(buf));
            }
            if c == '\\' && self.peek_at(1) == Some(quote) {
                buf.push(quote);
                self.position += 2;
                continue;
            }
            if c == '\n' || c == '\r' {
                self.line_break();
                buf.push('\n');
                let line_start = self.position;
                let sp = self.space();
                if !sp.uniform {
                    return Err(LexError::NonUniformSpace(self.position_at(line_start)));
                }
                for _ in indent..sp.count {
                    buf.push(sp.fill);
                }
                continue;
            }
            buf.push(c);
            self.position += 1;
        }
    }

    /// A run of letters, digits and underscores.
    pub fn token(&mut self) -> Option<String> {
        self.take_while(is_token_char)
    }

    /// Optional sign, digits and at most one decimal point.
    pub fn number(&mut self) -> Option<String> {
        let start = self.position;
        let mut buf = String::new();
        if let Some(sign @ ('-' | '+')) = self.peek() {
            if sign == '-' {
                buf.push(sign);
            }
            self.position += 1;
        }
        let mut digits = 0;
        let mut point = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => digits += 1,
                '.' if !point && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => {
                    point = true
                }
                '.' if !point && digits > 0 => point = true,
                _ => break,
            }
            buf.push(c);
            self.position += 1;
        }
        if digits == 0 {
            self.position = start;
            return None;
        }
        Some(buf)
    }

    /// A run of operator characters.
    pub fn operator(&mut self) -> Option<String> {
        self.take_while(is_operator_char)
    }

    /// `#` followed by a space, a tab or the end of the line. Consumes up to,
    /// not including, the line break.
    pub fn comment(&mut self) -> bool {
        if self.peek() != Some('#') {
            return false;
        }
        match self.peek_at(1) {
            Some(c) if c == ' ' || c == '\t' || c == '\n' || c == '\r' || is_end_char(c) => {}
            None => {}
            Some(_) => return false,
        }
        self.position += 1;
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' || is_end_char(c) {
                break;
            }
            self.position += 1;
        }
        true
    }

    /// `\` + line break, then every following line indented deeper than
    /// `reference`. The indentation of the first block line is stripped from
    /// each line and one trailing line break is dropped. The indentation of
    /// the terminating line is left unread.
    pub fn block(&mut self, reference: usize) -> Result<Option<String>, LexError> {
        let start = self.position;
        if !self.next_is('\\') {
            return Ok(None);
        }
        if !self.line_break() {
            self.position = start;
            return Ok(None);
        }

        let mut buf = String::new();
        let mut base: Option<usize> = None;
        loop {
            let line_start = self.position;
            let sp = self.space();
            if self.is_end() || sp.count <= reference {
                self.position = line_start;
                break;
            }
            if !sp.uniform {
                return Err(LexError::NonUniformSpace(self.position_at(line_start)));
            }
            let base = *base.get_or_insert(sp.count);
            for _ in base..sp.count {
                buf.push(sp.fill);
            }
            while let Some(c) = self.peek() {
                if c == '\n' || c == '\r' || is_end_char(c) {
                    break;
                }
                buf.push(c);
                self.position += 1;
            }
            if !self.line_break() {
                break;
            }
            buf.push('\n');
        }
        if buf.ends_with('\n') {
            buf.pop();
        }
        Ok(Some(buf))
    }

    /// Unquoted OGDL text: printable characters other than `(`, `)` and `,`.
    pub fn text(&mut self) -> Option<String> {
        self.take_while(is_text_char)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> Option<String> {
        let start = self.position;
        while self.peek().is_some_and(&pred) {
            self.position += 1;
        }
        if self.position == start {
            return None;
        }
        Some(self.input[start..self.position].iter().collect())
    }
}

pub fn is_end_char(c: char) -> bool {
    (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r')
}

pub fn is_text_char(c: char) -> bool {
    c > ' ' && !matches!(c, '(' | ')' | ',') && c != '\u{7f}'
}

pub fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn is_operator_char(c: char) -> bool {
    OPERATOR_CHARS.contains(c)
}
