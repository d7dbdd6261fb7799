use crate::hardware::memory::{Memory, MemoryMappedIOLocations};
use crossterm::event::{KeyCode, KeyModifiers, poll, read};
use std::io;
use std::ops::ControlFlow;
use std::time::Duration;

/// Value of the keyboard status register while a key is waiting.
pub const KEYBOARD_STATUS_READY: u16 = 1 << 15;

/// Something the host observed between two steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The user asked to stop stepping.
    Stop,
    Key(u8),
}

/// Providing Keyboard Input independent of an implementation.
pub trait KeyboardInputProvider {
    /// Returns the next pending event, does not block.
    ///
    /// # Errors
    /// - the input source failed
    fn poll_event(&mut self) -> io::Result<Option<HostEvent>>;
}

/// Keyboard input of the controlling terminal, CTRL-C and Esc stop the host loop.
pub struct TerminalInputProvider;

impl KeyboardInputProvider for TerminalInputProvider {
    fn poll_event(&mut self) -> io::Result<Option<HostEvent>> {
        if poll(Duration::from_secs(0))?
            && let Some(event) = read()?.as_key_press_event()
        {
            if event.code == KeyCode::Esc
                || (event.code == KeyCode::Char('c') && event.modifiers == KeyModifiers::CONTROL)
            {
                return Ok(Some(HostEvent::Stop));
            }
            if let Some(c) = event.code.as_char()
                && let Ok(key) = u8::try_from(c)
                && key.is_ascii()
            {
                return Ok(Some(HostEvent::Key(key)));
            }
        }
        Ok(None)
    }
}

/// Makes `key` visible to the program through the keyboard status and data registers.
pub fn signal_key(memory: &mut Memory, key: u8) {
    memory.write(
        MemoryMappedIOLocations::Kbsr.address(),
        KEYBOARD_STATUS_READY,
    );
    memory.write(MemoryMappedIOLocations::Kbdr.address(), u16::from(key));
}

/// Handles at most one pending event of `input`, breaks if the host should stop stepping.
///
/// # Errors
/// - the input source failed
pub fn pump(
    input: &mut impl KeyboardInputProvider,
    memory: &mut Memory,
) -> io::Result<ControlFlow<()>> {
    match input.poll_event()? {
        Some(HostEvent::Stop) => Ok(ControlFlow::Break(())),
        Some(HostEvent::Key(key)) => {
            signal_key(memory, key);
            Ok(ControlFlow::Continue(()))
        }
        None => Ok(ControlFlow::Continue(())),
    }
}
