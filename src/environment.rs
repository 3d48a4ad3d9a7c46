//! Evaluation environment: parser and evaluator options plus the registry of
//! callables that path elements can dispatch to.
//!
//! An [`Environment`] is built once by the embedding application and passed
//! by reference wherever trees are parsed or evaluated.
//!
//! ```
//! use ogdl::{Environment, Value};
//!
//! let mut env = Environment::new();
//! env.register_fn("twice", Some(1), |args: &[Value]| {
//!     let n = args[0].to_int().unwrap_or(0);
//!     Ok(Value::from(n * 2))
//! });
//! assert!(env.callable("twice").is_some());
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::{evaluator::EvalError, value::Value};

/// Default bound on tree depth and evaluation recursion.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// What `/=` and `%=` do when the assignment target does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbsentTarget {
    /// Store the strings `"infinity"` (for `/=`) and `"undefined"` (for `%=`)
    #[default]
    Sentinel,
    /// Fail with [`EvalError::AbsentTarget`]
    Error,
}

/// Knobs shared by the parser and the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Parse unquoted numbers and booleans into native scalars
    pub typed_scalars: bool,
    /// Maximum tree depth, parenthesis nesting and recursion depth
    pub max_depth: usize,
    pub absent_target: AbsentTarget,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            typed_scalars: false,
            max_depth: DEFAULT_MAX_DEPTH,
            absent_target: AbsentTarget::default(),
        }
    }
}

/// Something a path can call: a function (`f(1, 2)`) or a method bound to a
/// node carrying dispatch metadata.
pub trait Callable {
    fn call(&self, args: &[Value]) -> Result<Value, EvalError>;

    /// Number of arguments the callable expects; `None` accepts any count.
    fn arity(&self) -> Option<usize> {
        None
    }
}

impl<F> Callable for F
where
    F: Fn(&[Value]) -> Result<Value, EvalError>,
{
    fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        self(args)
    }
}

struct WithArity<F> {
    arity: Option<usize>,
    f: F,
}

impl<F> Callable for WithArity<F>
where
    F: Fn(&[Value]) -> Result<Value, EvalError>,
{
    fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        (self.f)(args)
    }

    fn arity(&self) -> Option<usize> {
        self.arity
    }
}

#[derive(Default)]
pub struct Environment {
    pub options: Options,
    callables: HashMap<String, Box<dyn Callable + Send + Sync>>,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.callables.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("options", &self.options)
            .field("callables", &names)
            .finish()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Environment {
            options,
            callables: HashMap::new(),
        }
    }

    /// Register `callable` under `name`, replacing any previous entry.
    pub fn register<C>(&mut self, name: impl Into<String>, callable: C)
    where
        C: Callable + Send + Sync + 'static,
    {
        self.callables.insert(name.into(), Box::new(callable));
    }

    /// Register a closure with an explicit arity.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, arity: Option<usize>, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.register(name, WithArity { arity, f });
    }

    pub fn callable(&self, name: &str) -> Option<&(dyn Callable + Send + Sync)> {
        self.callables.get(name).map(|c| c.as_ref())
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.callables.remove(name).is_some()
    }
}
