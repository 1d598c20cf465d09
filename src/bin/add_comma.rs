// Quote every line on the clipboard and add trailing commas.

use std::io::{self, Write};

use anyhow::Context;
use clipgen::add_comma::format_clipboard;
use clipgen::clipboard::{Clipboard, SystemClipboard};
use clipgen::util::writeln_ignore_broken_pipe;
use tracing::debug;

fn main() -> anyhow::Result<()> {
    clipgen::logging::init();
    let mut clipboard = SystemClipboard::new().context("clipboard unavailable")?;
    let formatted = format_clipboard(&mut clipboard)?;
    debug!(lines = formatted.lines().count(), "formatted");

    let mut stdout = io::stdout();
    writeln_ignore_broken_pipe(&mut stdout, "Clipboard contents updated")?;
    stdout.flush()?;

    // on X11 and Wayland the text goes away with this process unless a
    // clipboard manager copies it, so hold it until someone else takes over
    clipboard
        .write_and_wait(&formatted)
        .context("failed to hold clipboard contents")?;
    debug!("clipboard ownership released");
    Ok(())
}
