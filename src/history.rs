// history.rs

use std::io::{self, Write};

use crate::error::HistoryError;
use crate::util::writeln_ignore_broken_pipe;

pub const HISTORY_LEN: usize = 10;

/// The last `HISTORY_LEN` inputs, oldest first.
///
/// Always full: slots start out as empty strings and every append evicts
/// the oldest entry.
pub struct History {
    entries: [String; HISTORY_LEN],
    // slot holding index 0 (the oldest entry)
    head: usize,
}

/// A parsed `!` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRef {
    /// `!`
    List,
    /// `!!`
    Last,
    /// `!<N>`
    Index(isize),
}

impl HistoryRef {
    pub fn parse(text: &str) -> Result<Self, HistoryError> {
        let Some(rest) = text.strip_prefix('!') else {
            return Err(HistoryError::Format(text.to_string()));
        };
        match rest {
            "" => Ok(HistoryRef::List),
            "!" => Ok(HistoryRef::Last),
            _ => rest
                .trim()
                .parse::<isize>()
                .map(HistoryRef::Index)
                .map_err(|_| HistoryError::Format(rest.to_string())),
        }
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: Default::default(),
            head: 0,
        }
    }

    pub fn add(&mut self, entry: String) {
        // the oldest slot becomes the newest
        self.entries[self.head] = entry;
        self.head = (self.head + 1) % HISTORY_LEN;
    }

    fn normalize(&self, index: isize) -> Option<usize> {
        let len = HISTORY_LEN as isize;
        let normalized = if index < 0 { len + index } else { index };
        (0..len).contains(&normalized).then_some(normalized as usize)
    }

    /// Entry at a signed index; negative indices count back from the newest.
    pub fn get(&self, index: isize) -> Result<&str, HistoryError> {
        let pos = self.normalize(index).ok_or(HistoryError::Index(index))?;
        Ok(&self.entries[(self.head + pos) % HISTORY_LEN])
    }

    pub fn last(&self) -> &str {
        &self.entries[(self.head + HISTORY_LEN - 1) % HISTORY_LEN]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        (0..HISTORY_LEN).map(move |i| self.entries[(self.head + i) % HISTORY_LEN].as_str())
    }

    pub fn print<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln_ignore_broken_pipe(&mut out, "Last ten items:")?;
        for (index, item) in self.iter().enumerate() {
            writeln_ignore_broken_pipe(&mut out, format!("({}) {}", index, item))?;
        }
        Ok(())
    }

    /// Look up a `!` reference. `!` lists the history on `out` and
    /// resolves to an empty string.
    pub fn resolve<W: Write>(&self, reference: &str, out: W) -> Result<String, HistoryError> {
        match HistoryRef::parse(reference)? {
            HistoryRef::List => {
                self.print(out)
                    .map_err(|err| HistoryError::Output(err.to_string()))?;
                Ok(String::new())
            }
            HistoryRef::Last => Ok(self.last().to_string()),
            HistoryRef::Index(index) => self.get(index).map(str::to_string),
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
