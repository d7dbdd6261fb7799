use crate::hardware::memory::{MEMORY_SIZE, Memory};
use crate::hardware::registers::Registers;
use std::io;
use std::io::Write;

/// Routines reachable through `TRAP`, selected by the low 8 bits of the instruction.
#[repr(u8)]
#[derive(enumn::N, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrapVector {
    /// Read a single character from the keyboard, not implemented.
    Getc = 0x20,
    /// Write the character in R0[7:0], not implemented.
    Out = 0x21,
    /// Print the null terminated string at R0, one character per word.
    Puts = 0x22,
    /// Prompt for and read a single character, not implemented.
    In = 0x23,
    /// Print a string packed two characters per word, not implemented.
    Putsp = 0x24,
    /// End the program.
    Halt = 0x25,
}

/// PUTS: print null-delimited char* from register 0's address.
///
/// Each word contributes its low byte as one character, writing stops at the first zero word
/// and output is flushed afterwards. Memory is scanned without memory mapped side effects
/// and at most once around the address space.
///
/// # Errors
/// - writing to or flushing `stdout` failed
pub fn put_s(regs: &Registers, mem: &Memory, stdout: &mut impl Write) -> io::Result<()> {
    let mut address = regs.get(0);
    for _ in 0..MEMORY_SIZE {
        let word = mem.peek(address);
        if word == 0 {
            break;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "Truncation is what is expected here"
        )]
        let c = word as u8;
        stdout.write_all(&[c])?;
        address = address.wrapping_add(1);
    }
    stdout.flush()
}

/// HALT: End program by clearing the running flag.
pub fn halt(running: &mut bool) {
    *running = false;
}
