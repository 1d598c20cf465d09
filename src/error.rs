// error.rs

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckDigitError {
    #[error("19 characters needed but {0} supplied")]
    InvalidLength(usize),
    #[error("non-numerical characters present in positions other than 5 and 6")]
    NonNumeric,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CounterStringError {
    #[error("marker must contain at least one character")]
    EmptyMarker,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("history index out of range: {0}")]
    Index(isize),
    #[error("invalid history reference: {0:?}")]
    Format(String),
    #[error("failed to list history: {0}")]
    Output(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("no lines to format")]
    Empty,
}

/// Anything that can go wrong while evaluating one expression.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("syntax error at {pos}: {msg}")]
    Syntax { pos: usize, msg: String },
    #[error("name '{0}' is not defined")]
    Name(String),
    #[error("{0}")]
    Type(String),
    #[error("{0}")]
    Value(String),
    #[error("{0}")]
    Index(String),
    #[error("integer overflow")]
    Overflow,
    #[error("division by zero")]
    ZeroDivision,
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    CheckDigit(#[from] CheckDigitError),
    #[error(transparent)]
    CounterString(#[from] CounterStringError),
}

impl EvalError {
    pub fn syntax(pos: usize, msg: impl Into<String>) -> Self {
        EvalError::Syntax { pos, msg: msg.into() }
    }
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("failed to access clipboard: {0}")]
    Access(#[source] arboard::Error),
    #[error("failed to read clipboard: {0}")]
    Read(#[source] arboard::Error),
    #[error("failed to write clipboard: {0}")]
    Write(#[source] arboard::Error),
}
