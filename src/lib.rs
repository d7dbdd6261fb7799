//! # LC-3 Engine.
//!
//! `lc3-engine` executes programs for the LC-3 system one instruction at a time.
//! Usage starts with loading an image via [`emulator::Emulator::load_image`],
//! the host then calls [`emulator::Emulator::step`] as long as
//! [`emulator::Emulator::is_running`] holds.
//!
//!  # Example
//! ```
//! use lc3_engine::emulator::{Emulator, StepOutcome};
//! // .ORIG x3000 ; LEA R0, #2 ; PUTS ; HALT ; .STRINGZ "Hi"
//! let image = [
//!     0x30, 0x00, 0xE0, 0x02, 0xF0, 0x22, 0xF0, 0x25, 0x00, 0x48, 0x00, 0x69, 0x00, 0x00,
//! ];
//! let mut emu = Emulator::with_output(Vec::new());
//! emu.load_image_bytes(&image).unwrap();
//! while emu.is_running() {
//!     emu.step().unwrap();
//! }
//! assert_eq!(emu.step().unwrap(), StepOutcome::Idle);
//! assert_eq!(emu.output().as_slice(), b"Hi");
//! ```
//! # Errors
//! - Image file cannot be opened or read, or is missing its origin
//! - Program output cannot be written
//! - Unsupported instruction when configured with [`config::UnknownInstructionPolicy::Halt`]

pub mod config;
pub mod emulator;
pub mod errors;
pub mod hardware;
pub mod host;
pub(crate) mod numbers;
pub mod terminal;
