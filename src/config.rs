//! Settings of an [`crate::emulator::Emulator`].
use crate::hardware::memory::PROGRAM_SECTION_START;

/// What happens on reserved opcodes, `RTI` and traps without a routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownInstructionPolicy {
    /// Record a diagnostic and continue with the next instruction.
    #[default]
    Ignore,
    /// Record a diagnostic, stop running and report an
    /// [`crate::errors::ExecutionError::IllegalInstruction`].
    Halt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmulatorConfig {
    pub unknown_instruction_policy: UnknownInstructionPolicy,
    /// `PC` after init and reset.
    pub initial_pc: u16,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            unknown_instruction_policy: UnknownInstructionPolicy::default(),
            initial_pc: PROGRAM_SECTION_START,
        }
    }
}

impl EmulatorConfig {
    /// Configuration stopping at the first unsupported instruction.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            unknown_instruction_policy: UnknownInstructionPolicy::Halt,
            ..Self::default()
        }
    }
}
