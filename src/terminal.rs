use crossterm::{ExecutableCommand, terminal};
use std::io;
use std::io::Write;

/// Leaves raw mode when dropped.
pub struct RawLock {}

impl Drop for RawLock {
    fn drop(&mut self) {
        // terminal stays in raw mode but no means to repair
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::error!("Error resetting terminal {e}");
        }
    }
}

/// Set terminal to raw in best-effort mode, only log on failure,
/// so single key presses reach the program without waiting for a newline.
pub fn set_terminal_raw(mut stdout: impl Write) -> RawLock {
    if let Err(e) =
        terminal::enable_raw_mode().and_then(|()| stdout.execute(terminal::EnableLineWrap))
    {
        tracing::warn!("Could not set terminal to raw mode: {e}");
    }
    RawLock {}
}

/// Output for a terminal in raw mode, where a newline no longer returns the cursor
/// to the first column. Each `\n` is written as `\r\n`.
#[derive(Debug)]
pub struct RawModeWriter<W: Write> {
    inner: W,
}

impl<W: Write> RawModeWriter<W> {
    #[must_use]
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for RawModeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for (idx, part) in buf.split(|b| *b == b'\n').enumerate() {
            if idx > 0 {
                self.inner.write_all(b"\r\n")?;
            }
            self.inner.write_all(part)?;
        }
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
