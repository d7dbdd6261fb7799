use crate::config::EmulatorConfig;
use crate::emulator::Emulator;
use crate::hardware::keyboard::{HostEvent, KeyboardInputProvider};
use std::collections::VecDeque;
use std::io;
use std::io::Write;

/// Output surface capturing everything written and when it was flushed.
pub struct StringWriter {
    vec: Vec<u8>,
    flush_count: usize,
    flushed_len: usize,
    fail: bool,
}
impl Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "output closed"));
        }
        self.vec.write(data)
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        self.flush_count += 1;
        self.flushed_len = self.vec.len();
        Ok(())
    }
}
impl StringWriter {
    pub fn new() -> Self {
        let vec = Vec::<u8>::with_capacity(120);
        Self {
            vec,
            flush_count: 0,
            flushed_len: 0,
            fail: false,
        }
    }
    /// A writer refusing every write.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.vec.clone()).unwrap()
    }
    pub const fn flush_count(&self) -> usize {
        self.flush_count
    }
    /// Number of bytes written before the last flush.
    pub const fn flushed_len(&self) -> usize {
        self.flushed_len
    }
}

/// Emulator with captured output and `program` loaded at `0x3000`.
pub fn emulator_with_program(program: &[u16]) -> Emulator<StringWriter> {
    emulator_with_config(EmulatorConfig::default(), program)
}

pub fn emulator_with_config(config: EmulatorConfig, program: &[u16]) -> Emulator<StringWriter> {
    let mut emu = Emulator::with_config(config, StringWriter::new());
    emu.load_words(0x3000, program);
    emu
}

/// Keyboard input replaying a fixed list of events.
pub struct FakeKeyboardInputProvider(VecDeque<HostEvent>);
impl FakeKeyboardInputProvider {
    pub fn new(events: &[HostEvent]) -> Self {
        Self(events.iter().copied().collect())
    }
}
impl KeyboardInputProvider for FakeKeyboardInputProvider {
    fn poll_event(&mut self) -> io::Result<Option<HostEvent>> {
        Ok(self.0.pop_front())
    }
}
