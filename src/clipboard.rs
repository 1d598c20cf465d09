// clipboard.rs

use crate::error::ClipboardError;

/// Where generated text ends up.
pub trait Clipboard {
    fn read(&mut self) -> Result<String, ClipboardError>;
    fn write(&mut self, text: &str) -> Result<(), ClipboardError>;

    /// Write `text` and keep it available until another program replaces
    /// it. Blocks for that long where the platform ties clipboard contents
    /// to the owning process.
    fn write_and_wait(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.write(text)
    }
}

/// The desktop clipboard.
///
/// Keep it alive for as long as the copied text should stay available; on
/// some Linux setups the contents go away with the owning process.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        let inner = arboard::Clipboard::new().map_err(ClipboardError::Access)?;
        Ok(Self { inner })
    }
}

impl Clipboard for SystemClipboard {
    fn read(&mut self) -> Result<String, ClipboardError> {
        self.inner.get_text().map_err(ClipboardError::Read)
    }

    fn write(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.inner.set_text(text).map_err(ClipboardError::Write)
    }

    #[cfg(all(
        unix,
        not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
    ))]
    fn write_and_wait(&mut self, text: &str) -> Result<(), ClipboardError> {
        use arboard::SetExtLinux;

        self.inner
            .set()
            .wait()
            .text(text)
            .map_err(ClipboardError::Write)
    }
}

/// In-process clipboard, for tests and headless use.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub contents: String,
    pub writes: usize,
    /// how many of `writes` came through `write_and_wait`
    pub waits: usize,
}

impl MemoryClipboard {
    pub fn with_contents(text: impl Into<String>) -> Self {
        Self {
            contents: text.into(),
            writes: 0,
            waits: 0,
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn read(&mut self) -> Result<String, ClipboardError> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = text.to_string();
        self.writes += 1;
        Ok(())
    }

    fn write_and_wait(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.write(text)?;
        self.waits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clipboard_round_trip() {
        let mut cb = MemoryClipboard::with_contents("before");
        assert_eq!(cb.read().unwrap(), "before");
        cb.write("after").unwrap();
        assert_eq!(cb.read().unwrap(), "after");
        assert_eq!(cb.writes, 1);
        assert_eq!(cb.waits, 0);
    }

    #[test]
    fn write_and_wait_counts_as_a_write() {
        let mut cb = MemoryClipboard::default();
        cb.write_and_wait("held").unwrap();
        assert_eq!(cb.read().unwrap(), "held");
        assert_eq!((cb.writes, cb.waits), (1, 1));
    }
}
