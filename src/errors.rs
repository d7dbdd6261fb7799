use crate::emulator::instruction::Opcode;
use std::io;
use std::path::PathBuf;

/// Errors from loading an LC-3 image into memory.
#[derive(displaydoc::Display, thiserror::Error, Debug)]
pub enum LoadImageError {
    /// Could not open image file {path:?}: {source}
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Could not read image file {path:?}: {source}
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Image is missing its origin header, got {length} bytes while 2 are required
    MissingOrigin { length: usize },
}

/// Errors stopping execution of a loaded program.
#[derive(displaydoc::Display, thiserror::Error, Debug)]
pub enum ExecutionError {
    /// Error writing program output: {0}
    Output(#[from] io::Error),
    /// Illegal instruction {instruction:#06X} ({opcode:?}) at address {address:#06X}
    IllegalInstruction {
        instruction: u16,
        opcode: Opcode,
        address: u16,
    },
}

/// Errors ending the interactive host loop.
#[derive(displaydoc::Display, thiserror::Error, Debug)]
pub enum HostError {
    /// Error polling keyboard input: {0}
    Input(#[from] io::Error),
    /// {0}
    Execution(#[from] ExecutionError),
}
