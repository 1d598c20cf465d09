// completion.rs

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Helper};

use crate::builtins::{BUILTINS, CONSTANTS};

/// Tab completion of builtin function and constant names.
pub struct BuiltinCompleter {
    names: Vec<&'static str>,
}

impl BuiltinCompleter {
    pub fn new() -> Self {
        let mut names: Vec<&'static str> = BUILTINS.iter().chain(CONSTANTS.iter()).copied().collect();
        names.sort_unstable();
        Self { names }
    }

    /// Start of the identifier that ends at `pos`, and the names it could
    /// complete to.
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<&'static str>) {
        let before = &line[..pos];
        let start = before
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
            .last()
            .map_or(pos, |(i, _)| i);
        let prefix = &before[start..];
        if prefix.is_empty() {
            return (pos, Vec::new());
        }
        let matches = self
            .names
            .iter()
            .copied()
            .filter(|n| n.starts_with(prefix))
            .collect();
        (start, matches)
    }
}

impl Default for BuiltinCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for BuiltinCompleter {
    type Candidate = Pair;
    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let (start, names) = self.candidates(line, pos);
        let completions = names
            .into_iter()
            .map(|n| Pair {
                display: n.to_string(),
                replacement: n.to_string(),
            })
            .collect();
        Ok((start, completions))
    }
}

impl Hinter for BuiltinCompleter {
    type Hint = String;
    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for BuiltinCompleter {}

impl Validator for BuiltinCompleter {
    fn validate(&self, _ctx: &mut ValidationContext) -> Result<ValidationResult, ReadlineError> {
        Ok(ValidationResult::Valid(None))
    }
}

impl Helper for BuiltinCompleter {}
