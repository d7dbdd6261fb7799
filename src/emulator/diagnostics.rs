//! Observable record of input the engine tolerates instead of failing on.
use crate::emulator::instruction::Opcode;
use crate::emulator::trap_routines::TrapVector;

#[derive(displaydoc::Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// Unsupported opcode {opcode:?} at {address:#06X}
    UnknownOpcode { opcode: Opcode, address: u16 },
    /// Unimplemented trap {trap:?} at {address:#06X}
    UnimplementedTrap { trap: TrapVector, address: u16 },
    /// Unknown trap vector {vector:#04X} at {address:#06X}
    UnknownTrapVector { vector: u8, address: u16 },
    /// Image at {origin:#06X} truncated, {dropped_words} words did not fit into memory
    ImageTruncated { origin: u16, dropped_words: usize },
}

/// Counts of recorded [`Diagnostic`]s per kind.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiagnosticCounters {
    pub unknown_opcodes: u64,
    pub unimplemented_traps: u64,
    pub unknown_trap_vectors: u64,
    pub truncated_images: u64,
    last: Option<Diagnostic>,
}

impl DiagnosticCounters {
    /// Counts and logs `diagnostic`.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        let counter = match diagnostic {
            Diagnostic::UnknownOpcode { .. } => &mut self.unknown_opcodes,
            Diagnostic::UnimplementedTrap { .. } => &mut self.unimplemented_traps,
            Diagnostic::UnknownTrapVector { .. } => &mut self.unknown_trap_vectors,
            Diagnostic::ImageTruncated { .. } => &mut self.truncated_images,
        };
        *counter += 1;
        tracing::warn!(%diagnostic, "tolerated");
        self.last = Some(diagnostic);
    }
    #[must_use]
    pub const fn last(&self) -> Option<Diagnostic> {
        self.last
    }
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.unknown_opcodes
            + self.unimplemented_traps
            + self.unknown_trap_vectors
            + self.truncated_images
    }
}
