//! OGDL text serialization.
//!
//! # Features
//!
//! - **Text output** via [`to_text()`] - canonical OGDL, two spaces per level
//! - **Debug output** via [`to_show()`] - same layout, but transparent nodes are
//!   printed as `_` so that AST shapes can be inspected
//! - **Quoting** - scalars that would not survive a re-parse as plain text are
//!   double quoted; multi-line scalars are re-indented to their own level
//! - **Blocks** - a childless scalar ending in `\` is written as a `\` block,
//!   since inside quotes the backslash would escape the closing quote
//!
//! Line breaks are written as LF. Parsing the output of [`to_text()`] gives
//! back an equal tree for every tree the parser produces.
//!
//! # Examples
//!
//! ```
//! use ogdl::{parse, Node};
//! use ogdl::output::{to_show, to_text};
//!
//! let tree = parse("a b c").unwrap();
//! assert_eq!(to_text(&tree), "a\n  b\n    c");
//! assert_eq!(to_show(&tree), "_\n  a\n    b\n      c");
//!
//! let mut n = Node::wrapper();
//! n.add("two words");
//! assert_eq!(to_text(&n), "\"two words\"");
//! ```

use crate::node::{Node, Scalar};

const INDENT: &str = "  ";

pub struct TextPrinter {
    show_wrappers: bool,
}

impl TextPrinter {
    pub fn new(show_wrappers: bool) -> Self {
        TextPrinter { show_wrappers }
    }

    pub fn print(&self, node: &Node) -> String {
        let mut lines = Vec::new();
        self.print_node(node, 0, &mut lines);
        lines.join("\n")
    }

    fn print_node(&self, node: &Node, level: usize, lines: &mut Vec<String>) {
        let child_level = match node.content() {
            Some(scalar) => {
                let text = self.print_scalar(scalar, level, node.is_empty());
                lines.push(format!("{}{}", self.indent(level), text));
                level + 1
            }
            None if self.show_wrappers => {
                lines.push(format!("{}_", self.indent(level)));
                level + 1
            }
            None => level,
        };
        for child in node.children() {
            self.print_node(child, child_level, lines);
        }
    }

    fn print_scalar(&self, scalar: &Scalar, level: usize, leaf: bool) -> String {
        let text = scalar.to_string();
        if !needs_quotes(&text) {
            return text;
        }
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        // a backslash before the closing quote would read as an escape
        if text.ends_with('\\') && leaf && !text.starts_with([' ', '\t']) {
            return self.print_block(&text, level + 1);
        }
        self.print_quoted(&text, level)
    }

    /// `"..."`, with continuation lines indented to `level`.
    fn print_quoted(&self, text: &str, level: usize) -> String {
        let mut out = String::from("\"");
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                out.push('\n');
                out.push_str(&margin(line, level));
            }
            out.push_str(&line.replace('"', "\\\""));
        }
        out.push('"');
        out
    }

    /// `\` and a line break, then the text indented to `level`.
    fn print_block(&self, text: &str, level: usize) -> String {
        let mut out = String::from("\\");
        for line in text.split('\n') {
            out.push('\n');
            out.push_str(&margin(line, level));
            out.push_str(line);
        }
        out
    }

    fn indent(&self, level: usize) -> String {
        INDENT.repeat(level)
    }
}

/// Indentation for one continuation line. The lexer only counts indentation
/// characters, so a line whose own leading white space is tabs is indented
/// with tabs to keep the run uniform.
fn margin(line: &str, level: usize) -> String {
    let fill = if line.starts_with('\t') { "\t" } else { " " };
    fill.repeat(INDENT.len() * level)
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.starts_with(['#', '\\', '\''])
        || s.chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '(' | ')' | ','))
        || s.chars().any(crate::lexer::is_end_char)
}

/// OGDL text with transparent nodes omitted.
pub fn to_text(node: &Node) -> String {
    TextPrinter::new(false).print(node)
}

/// OGDL text with transparent nodes shown as `_`.
pub fn to_show(node: &Node) -> String {
    TextPrinter::new(true).print(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting() {
        let cases = vec![
            ("plain", "plain"),
            ("", "\"\""),
            ("a b", "\"a b\""),
            ("x,y", "\"x,y\""),
            ("#x", "\"#x\""),
            ("say \"hi\"", "\"say \\\"hi\\\"\""),
            ("not#acomment", "not#acomment"),
        ];
        for (input, expected) in cases {
            let mut n = Node::wrapper();
            n.add(input);
            assert_eq!(to_text(&n), expected, "input: {:?}", input);
        }
    }

    #[test]
    fn test_multiline_reindented() {
        let mut n = Node::wrapper();
        n.add("a").add("b\nc");
        assert_eq!(to_text(&n), "a\n  \"b\n  c\"");
    }

    #[test]
    fn test_tab_led_line_indented_with_tabs() {
        let mut n = Node::wrapper();
        n.add("a").add("x\n\ty");
        assert_eq!(to_text(&n), "a\n  \"x\n\t\t\ty\"");
    }

    #[test]
    fn test_trailing_backslash_written_as_block() {
        let mut n = Node::wrapper();
        n.add("a").add("x y\\");
        n.add("b");
        assert_eq!(to_text(&n), "a\n  \\\n    x y\\\nb");
    }

    #[test]
    fn test_carriage_return_written_as_line_feed() {
        let mut n = Node::wrapper();
        n.add("x\ry");
        assert_eq!(to_text(&n), "\"x\ny\"");
    }

    #[test]
    fn test_nested_wrapper_is_transparent() {
        let mut n = Node::wrapper();
        let a = n.add("a");
        a.push(Node::Wrapper(vec![Node::new("b"), Node::new("c")]));
        assert_eq!(to_text(&n), "a\n  b\n  c");
    }
}
