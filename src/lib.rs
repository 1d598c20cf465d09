//! clipgen: put generated text on the clipboard.
//!
//! An interactive loop evaluates small expressions (counter strings, ASNs,
//! repeated characters, file contents, ...) and copies each result to the
//! clipboard. `add_comma` reformats clipboard lines into a quoted list.

pub mod add_comma;
pub mod annotate;
pub mod builtins;
pub mod checkdigit;
pub mod clipboard;
pub mod completion;
pub mod counterstring;
pub mod error;
pub mod eval;
pub mod history;
pub mod logging;
pub mod parser;
pub mod repl;
pub mod util;
pub mod value;

pub use crate::error::*;
pub use crate::value::Value;
