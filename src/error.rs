use thiserror::Error;

use crate::{evaluator::EvalError, parser::ParseError};

/// Errors of the one-call convenience API on [`Node`](crate::Node).
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A typed getter found a value it cannot convert
    #[error("'{path}' does not hold {expected}")]
    Type { path: String, expected: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;
