//! One-call queries on trees.
//!
//! These helpers compile their path or expression argument on every call and
//! evaluate it with a default [`Environment`]. Callers that evaluate the same
//! query repeatedly, or need callables, should compile once and use an
//! [`Evaluator`] directly.
//!
//! ```
//! use ogdl::parse;
//!
//! let tree = parse("server\n  host example.org\n  port 8080\n  tls true").unwrap();
//! assert_eq!(tree.get_string("server.host").unwrap().as_deref(), Some("example.org"));
//! assert_eq!(tree.get_int("server.port").unwrap(), Some(8080));
//! assert_eq!(tree.get_bool("server.tls").unwrap(), Some(true));
//! assert_eq!(tree.get_int("server.missing").unwrap(), None);
//! ```

use regex::Regex;
use tracing::debug;

use crate::{
    ast::{compile_expression, compile_path},
    environment::Environment,
    error::{Error, Result},
    evaluator::Evaluator,
    node::Node,
    value::Value,
};

impl Node {
    /// Evaluate `path` against this node.
    pub fn get(&self, path: &str) -> Result<Option<Value>> {
        self.get_with(&Environment::new(), path)
    }

    pub fn get_with(&self, env: &Environment, path: &str) -> Result<Option<Value>> {
        let compiled = compile_path(path)?;
        Ok(Evaluator::new(env).eval_path(self, &compiled)?)
    }

    pub fn get_string(&self, path: &str) -> Result<Option<String>> {
        Ok(self.get(path)?.map(|v| v.to_string()))
    }

    pub fn get_int(&self, path: &str) -> Result<Option<i64>> {
        self.get_typed(path, "an integer", Value::to_int)
    }

    pub fn get_float(&self, path: &str) -> Result<Option<f64>> {
        self.get_typed(path, "a number", Value::to_float)
    }

    pub fn get_bool(&self, path: &str) -> Result<Option<bool>> {
        self.get_typed(path, "a boolean", Value::to_bool)
    }

    pub fn get_bytes(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.get(path)?.map(|v| v.to_bytes()))
    }

    fn get_typed<T>(
        &self,
        path: &str,
        expected: &'static str,
        convert: impl Fn(&Value) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.get(path)? {
            None => Ok(None),
            Some(v) => convert(&v).map(Some).ok_or_else(|| Error::Type {
                path: path.to_string(),
                expected,
            }),
        }
    }

    /// Compile and evaluate an expression with this node as the (writable)
    /// context.
    ///
    /// ```
    /// use ogdl::Node;
    ///
    /// let mut ctx = Node::wrapper();
    /// ctx.eval_str("a = 1").unwrap();
    /// ctx.eval_str("a += 12").unwrap();
    /// assert_eq!(ctx.get_int("a").unwrap(), Some(13));
    /// ```
    pub fn eval_str(&mut self, expr: &str) -> Result<Option<Value>> {
        let compiled = compile_expression(expr)?;
        Ok(Evaluator::new(&Environment::new()).eval_mut(self, &compiled)?)
    }

    /// Direct children whose content matches the regular expression.
    pub fn find(&self, pattern: &str) -> Result<Node> {
        let re = Regex::new(pattern)?;
        let found: Vec<Node> = self
            .children()
            .iter()
            .filter(|n| re.is_match(&n.this_string()))
            .cloned()
            .collect();
        debug!(pattern, found = found.len(), "find");
        Ok(Node::Wrapper(found))
    }

    /// Stable sort of the children by the text each one yields for `path`.
    pub fn sort_by_string(&mut self, path: &str) -> Result<()> {
        let compiled = compile_path(path)?;
        let env = Environment::new();
        let ev = Evaluator::new(&env);
        let mut keyed = Vec::with_capacity(self.len());
        for child in self.take_children() {
            let key = ev.eval_path(&child, &compiled)?.map(|v| v.to_string()).unwrap_or_default();
            keyed.push((key, child));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        self.children_mut().extend(keyed.into_iter().map(|(_, c)| c));
        Ok(())
    }

    /// Stable sort of the children by the integer each one yields for
    /// `path`; missing or non-numeric keys count as 0.
    pub fn sort_by_int(&mut self, path: &str) -> Result<()> {
        let compiled = compile_path(path)?;
        let env = Environment::new();
        let ev = Evaluator::new(&env);
        let mut keyed = Vec::with_capacity(self.len());
        for child in self.take_children() {
            let key = ev
                .eval_path(&child, &compiled)?
                .and_then(|v| v.to_int())
                .unwrap_or(0);
            keyed.push((key, child));
        }
        keyed.sort_by_key(|(key, _)| *key);
        self.children_mut().extend(keyed.into_iter().map(|(_, c)| c));
        Ok(())
    }
}
