// repl.rs

use std::io::{self, Write};

use anyhow::Context;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, Editor};
use tracing::{debug, warn};

use crate::annotate::annotate;
use crate::clipboard::{Clipboard, SystemClipboard};
use crate::completion::BuiltinCompleter;
use crate::eval::evaluate;
use crate::history::History;
use crate::util::writeln_ignore_broken_pipe;

pub const BANNER: &str = "\
clipgen
Creates types of string in clipboard ready for pasting.
Inspired by perlclip by James Bach and Danny Faught
Type help for help.";

pub const READY: &str = "<ready to paste!>";

pub struct SessionConfig {
    pub prompt: String,
    pub banner: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt: ">".to_string(),
            banner: true,
        }
    }
}

/// What one REPL cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to evaluate: blank input, `!`, or a failed history lookup.
    Idle,
    /// The result went to the clipboard.
    Copied(String),
    EvalFailed,
    ClipboardFailed,
}

/// One interactive session: the rolling history plus the clipboard results
/// are sent to.
pub struct Session<C: Clipboard> {
    history: History,
    clipboard: C,
}

impl<C: Clipboard> Session<C> {
    pub fn new(clipboard: C) -> Self {
        Self {
            history: History::new(),
            clipboard,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Run one cycle on `line`, reporting to `out`.
    pub fn handle_line(&mut self, line: &str, out: &mut dyn Write) -> Outcome {
        let mut text = annotate(line);
        debug!(input = %line, annotated = %text, "read");

        if text.starts_with('!') {
            // recalled entries are evaluated but not recorded again
            match self.history.resolve(&text, &mut *out) {
                Ok(recalled) => {
                    debug!(reference = %text, recalled = %recalled, "history recall");
                    text = recalled;
                }
                Err(err) => {
                    let _ = writeln_ignore_broken_pipe(&mut *out, format!("History error: {}", err));
                    return Outcome::Idle;
                }
            }
        } else {
            self.history.add(text.clone());
        }

        if text.is_empty() {
            return Outcome::Idle;
        }

        let result = match evaluate(&text, &mut *out) {
            Ok(value) => value.to_string(),
            Err(err) => {
                debug!(error = %err, "evaluation failed");
                let _ = writeln_ignore_broken_pipe(&mut *out, format!("Evaluation error: {}", err));
                return Outcome::EvalFailed;
            }
        };

        if let Err(err) = self.clipboard.write(&result) {
            warn!(error = %err, "clipboard write failed");
            let _ = writeln_ignore_broken_pipe(&mut *out, format!("Clipboard error: {}", err));
            return Outcome::ClipboardFailed;
        }
        debug!(len = result.len(), "copied to clipboard");
        let _ = writeln_ignore_broken_pipe(&mut *out, READY);
        Outcome::Copied(result)
    }
}

pub fn start_repl(config: SessionConfig) -> anyhow::Result<()> {
    let rl_config = Config::builder()
        .completion_type(CompletionType::List)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<BuiltinCompleter, DefaultHistory> =
        Editor::with_config(rl_config).context("failed to create line editor")?;
    rl.set_helper(Some(BuiltinCompleter::new()));

    let clipboard = SystemClipboard::new().context("clipboard unavailable")?;
    let mut session = Session::new(clipboard);

    let mut stdout = io::stdout();
    if config.banner {
        let _ = writeln_ignore_broken_pipe(&mut stdout, BANNER);
    }

    loop {
        match rl.readline(&config.prompt) {
            Ok(line) => {
                session.handle_line(&line, &mut stdout);
                let _ = stdout.flush();
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                debug!("input closed");
                break;
            }
            Err(err) => return Err(err).context("failed to read input"),
        }
    }
    Ok(())
}
