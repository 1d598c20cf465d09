// add_comma.rs

//! Quote lines and separate them with commas, ready to paste into an array
//! literal:
//!
//! ```text
//! One          'One',
//! Two    ->    'Two',
//! Three        'Three'
//! ```

use anyhow::Context;

use crate::clipboard::Clipboard;
use crate::error::FormatError;

/// Split on every line boundary, dropping the terminators. A trailing
/// terminator does not produce an empty last line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let end = match c {
            '\r' => {
                if let Some(&(_, '\n')) = chars.peek() {
                    chars.next();
                }
                true
            }
            '\n' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}'
            | '\u{2029}' => true,
            _ => false,
        };
        if end {
            lines.push(&text[start..i]);
            start = chars.peek().map_or(text.len(), |&(next, _)| next);
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

pub fn add_comma(text: &str) -> Result<String, FormatError> {
    let lines = split_lines(text);
    let Some((last, rest)) = lines.split_last() else {
        return Err(FormatError::Empty);
    };
    let mut out = String::with_capacity(text.len() + lines.len() * 4);
    for line in rest {
        out.push('\'');
        out.push_str(line);
        out.push_str("',\n");
    }
    out.push('\'');
    out.push_str(last);
    out.push_str("'\n");
    Ok(out)
}

/// Format the clipboard contents in place and return the new text.
pub fn format_clipboard<C: Clipboard>(clipboard: &mut C) -> anyhow::Result<String> {
    let text = clipboard.read()?;
    let formatted = add_comma(&text).context("clipboard is empty")?;
    clipboard.write(&formatted)?;
    Ok(formatted)
}
