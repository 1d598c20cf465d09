// util.rs

use std::io::Write;

/// `writeln!` that treats a closed pipe (`clipgen | head`) as success.
pub fn writeln_ignore_broken_pipe<W: std::io::Write, S: AsRef<str>>(mut w: W, s: S) -> std::io::Result<()> {
    match writeln!(w, "{}", s.as_ref()) {
        Err(ref e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn broken_pipe_is_not_an_error() {
        assert!(writeln_ignore_broken_pipe(ClosedPipe, "x").is_ok());
        let mut buf = Vec::new();
        writeln_ignore_broken_pipe(&mut buf, "x").unwrap();
        assert_eq!(buf, b"x\n");
    }
}
