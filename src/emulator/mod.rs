pub mod diagnostics;
pub mod instruction;
pub mod opcodes;
#[cfg(test)]
pub(crate) mod test_helpers;
pub mod trap_routines;

use crate::config::{EmulatorConfig, UnknownInstructionPolicy};
use crate::emulator::diagnostics::{Diagnostic, DiagnosticCounters};
use crate::emulator::instruction::{Instruction, Opcode};
use crate::emulator::trap_routines::TrapVector;
use crate::errors::{ExecutionError, LoadImageError};
use crate::hardware::memory::{LoadReport, Memory};
use crate::hardware::registers::Registers;
use std::io::{Stdout, Write, stdout};
use std::path::Path;
use tracing::{debug, info};

/// What a single [`Emulator::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// One instruction was executed and the emulator is still running.
    Executed(Opcode),
    /// `HALT` was executed, further steps are idle.
    Halted,
    /// Not running, nothing was touched.
    Idle,
}

/// The public facing emulator used to run LC-3 programs.
///
/// Owns memory, registers, the running flag and the output surface. Every call to
/// [`Emulator::step`] executes exactly one instruction, pacing is up to the caller.
pub struct Emulator<W: Write = Stdout> {
    memory: Memory,
    registers: Registers,
    running: bool,
    config: EmulatorConfig,
    diagnostics: DiagnosticCounters,
    output: W,
}

impl Default for Emulator<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator<Stdout> {
    /// Emulator writing program output to stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_output(stdout())
    }
}

impl<W: Write> Emulator<W> {
    pub fn with_output(output: W) -> Self {
        Self::with_config(EmulatorConfig::default(), output)
    }
    /// Zeroed memory and registers, `COND` at `Zero`, `PC` at `config.initial_pc`, running.
    pub fn with_config(config: EmulatorConfig, output: W) -> Self {
        Self {
            memory: Memory::new(),
            registers: Registers::with_pc(config.initial_pc),
            running: true,
            config,
            diagnostics: DiagnosticCounters::default(),
            output,
        }
    }
    /// Back to the state right after construction, keeping config and output.
    pub fn reset(&mut self) {
        self.memory.clear();
        self.registers = Registers::with_pc(self.config.initial_pc);
        self.running = true;
        self.diagnostics = DiagnosticCounters::default();
    }

    /// Loads the image file at `path`, see [`Memory::load_image_bytes`] for the format.
    /// Nothing is written to memory unless the whole file could be read.
    ///
    /// # Errors
    /// - File cannot be opened or read
    /// - Image is shorter than the 2 byte origin
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<LoadReport, LoadImageError> {
        let report = self.memory.load_image(path.as_ref())?;
        info!(path = %path.as_ref().display(), ?report, "image loaded");
        Ok(self.check_truncation(report))
    }
    /// Loads an in-memory image, a big-endian origin followed by big-endian words.
    ///
    /// # Errors
    /// - Image is shorter than the 2 byte origin
    pub fn load_image_bytes(&mut self, image: &[u8]) -> Result<LoadReport, LoadImageError> {
        let report = self.memory.load_image_bytes(image)?;
        Ok(self.check_truncation(report))
    }
    /// Places already decoded words at `origin`.
    pub fn load_words(&mut self, origin: u16, words: &[u16]) -> LoadReport {
        let report = self.memory.load_words(origin, words);
        self.check_truncation(report)
    }
    fn check_truncation(&mut self, report: LoadReport) -> LoadReport {
        if report.is_truncated() {
            self.diagnostics.record(Diagnostic::ImageTruncated {
                origin: report.origin,
                dropped_words: report.words_truncated,
            });
        }
        report
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Fetches the instruction at `PC`, advances `PC` by one and executes it.
    /// Does nothing once halted.
    ///
    /// # Errors
    /// - Output of `PUTS` could not be written
    /// - Unsupported instruction with [`UnknownInstructionPolicy::Halt`]
    pub fn step(&mut self) -> Result<StepOutcome, ExecutionError> {
        if !self.running {
            return Ok(StepOutcome::Idle);
        }
        let address = self.registers.fetch_pc();
        let i = Instruction::from(self.memory.read(address));
        debug!("{address:#06X}: {i:?}");
        let regs = &mut self.registers;
        let mem = &mut self.memory;
        let opcode = i.op_code();
        match opcode {
            Opcode::Add => opcodes::add(i, regs),
            Opcode::And => opcodes::and(i, regs),
            Opcode::Not => opcodes::not(i, regs),
            Opcode::Br => opcodes::br(i, regs),
            Opcode::Jmp => opcodes::jmp_or_ret(i, regs),
            Opcode::Jsr => opcodes::jsr(i, regs),
            Opcode::Ld => opcodes::ld(i, regs, mem),
            Opcode::Ldi => opcodes::ldi(i, regs, mem),
            Opcode::Ldr => opcodes::ldr(i, regs, mem),
            Opcode::Lea => opcodes::lea(i, regs),
            Opcode::St => opcodes::st(i, regs, mem),
            Opcode::Sti => opcodes::sti(i, regs, mem),
            Opcode::Str => opcodes::str(i, regs, mem),
            Opcode::Trap => return self.trap(i, address),
            Opcode::Rti | Opcode::Res => {
                self.unsupported(i, address, Diagnostic::UnknownOpcode { opcode, address })?;
            }
        }
        Ok(StepOutcome::Executed(opcode))
    }

    fn trap(&mut self, i: Instruction, address: u16) -> Result<StepOutcome, ExecutionError> {
        let vector = i.trap_vector();
        match TrapVector::n(vector) {
            Some(TrapVector::Puts) => {
                trap_routines::put_s(&self.registers, &self.memory, &mut self.output)?;
            }
            Some(TrapVector::Halt) => {
                trap_routines::halt(&mut self.running);
                info!("halted at {address:#06X}");
                return Ok(StepOutcome::Halted);
            }
            Some(trap) => {
                self.unsupported(i, address, Diagnostic::UnimplementedTrap { trap, address })?;
            }
            None => {
                self.unsupported(i, address, Diagnostic::UnknownTrapVector { vector, address })?;
            }
        }
        Ok(StepOutcome::Executed(Opcode::Trap))
    }

    fn unsupported(
        &mut self,
        i: Instruction,
        address: u16,
        diagnostic: Diagnostic,
    ) -> Result<(), ExecutionError> {
        self.diagnostics.record(diagnostic);
        match self.config.unknown_instruction_policy {
            UnknownInstructionPolicy::Ignore => Ok(()),
            UnknownInstructionPolicy::Halt => {
                self.running = false;
                Err(ExecutionError::IllegalInstruction {
                    instruction: i.bits(),
                    opcode: i.op_code(),
                    address,
                })
            }
        }
    }

    /// Steps until halted or `max_steps` instructions were executed,
    /// returns the number of executed instructions.
    ///
    /// # Errors
    /// - see [`Emulator::step`]
    pub fn run(&mut self, max_steps: Option<u64>) -> Result<u64, ExecutionError> {
        let mut executed = 0;
        while self.running && max_steps.is_none_or(|max| executed < max) {
            match self.step()? {
                StepOutcome::Executed(_) | StepOutcome::Halted => executed += 1,
                StepOutcome::Idle => break,
            }
        }
        Ok(executed)
    }

    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }
    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }
    /// Write access for hosts, e.g. to signal a key press in the keyboard registers.
    pub const fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }
    #[must_use]
    pub const fn diagnostics(&self) -> &DiagnosticCounters {
        &self.diagnostics
    }
    #[must_use]
    pub const fn config(&self) -> &EmulatorConfig {
        &self.config
    }
    #[must_use]
    pub const fn output(&self) -> &W {
        &self.output
    }
    pub fn into_output(self) -> W {
        self.output
    }
}

#[expect(clippy::unusual_byte_groupings)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::test_helpers::{emulator_with_config, emulator_with_program};
    use crate::hardware::registers::ConditionFlag;
    use googletest::prelude::*;

    const HALT: u16 = 0xF025;
    const PUTS: u16 = 0xF022;

    #[gtest]
    pub fn test_init() {
        let emu = Emulator::with_output(Vec::new());
        expect_that!(emu.is_running(), eq(true));
        expect_that!(emu.registers().pc(), eq(0x3000));
        expect_that!(
            emu.registers().get_conditional_register(),
            eq(ConditionFlag::Zero)
        );
        expect_that!(emu.memory().peek(0x3000), eq(0));
    }
    #[gtest]
    pub fn test_step_advances_pc_before_execution() {
        // LEA R0, #0 => R0 is the address after the LEA
        let mut emu = emulator_with_program(&[0b1110_000_000000000]);
        let outcome = emu.step().unwrap();
        expect_that!(outcome, eq(StepOutcome::Executed(Opcode::Lea)));
        expect_that!(emu.registers().pc(), eq(0x3001));
        expect_that!(emu.registers().get(0), eq(0x3001));
    }
    #[gtest]
    pub fn test_jsr_saves_pc_after_fetch() {
        // JSR #5
        let mut emu = emulator_with_program(&[0b0100_1_00000000101]);
        emu.step().unwrap();
        expect_that!(emu.registers().get(7), eq(0x3001));
        expect_that!(emu.registers().pc(), eq(0x3006));
    }
    #[gtest]
    pub fn test_ldi_through_pointer() {
        // LDI R2, #1 ; HALT ; .FILL 0x4000
        let mut emu = emulator_with_program(&[0b1010_010_000000001, HALT, 0x4000]);
        emu.memory_mut().write(0x4000, 0xBEEF);
        emu.step().unwrap();
        expect_that!(emu.registers().get(2), eq(0xBEEF));
        expect_that!(
            emu.registers().get_conditional_register(),
            eq(ConditionFlag::Neg)
        );
    }
    #[gtest]
    pub fn test_puts_then_halt() {
        // LEA R0, #2 ; PUTS ; HALT ; "Hi"
        let program = [
            0b1110_000_000000010,
            PUTS,
            HALT,
            u16::from(b'H'),
            u16::from(b'i'),
            0,
        ];
        let mut emu = emulator_with_program(&program);
        let executed = emu.run(None).unwrap();
        expect_that!(executed, eq(3));
        expect_that!(emu.is_running(), eq(false));
        expect_that!(emu.output().get_string(), eq("Hi"));
        expect_that!(emu.output().flushed_len(), eq(2));
    }
    #[gtest]
    pub fn test_step_after_halt_changes_nothing() {
        let mut emu = emulator_with_program(&[HALT, 0b0001_000_000_1_00001]);
        expect_that!(emu.step().unwrap(), eq(StepOutcome::Halted));
        let registers = emu.registers().clone();
        let memory = emu.memory().clone();
        expect_that!(emu.step().unwrap(), eq(StepOutcome::Idle));
        expect_that!(emu.step().unwrap(), eq(StepOutcome::Idle));
        assert!(emu.registers() == &registers);
        assert!(emu.memory() == &memory);
    }
    #[gtest]
    pub fn test_unknown_opcodes_are_ignored_and_counted() {
        // RTI ; reserved ; ADD R0, R0, #1
        let mut emu = emulator_with_program(&[0x8000, 0xD123, 0b0001_000_000_1_00001]);
        expect_that!(emu.step().unwrap(), eq(StepOutcome::Executed(Opcode::Rti)));
        expect_that!(emu.step().unwrap(), eq(StepOutcome::Executed(Opcode::Res)));
        emu.step().unwrap();
        expect_that!(emu.registers().get(0), eq(1));
        expect_that!(emu.diagnostics().unknown_opcodes, eq(2));
        expect_that!(
            emu.diagnostics().last(),
            eq(Some(Diagnostic::UnknownOpcode {
                opcode: Opcode::Res,
                address: 0x3001
            }))
        );
    }
    #[gtest]
    pub fn test_unimplemented_traps_are_ignored_and_counted() {
        // GETC ; OUT ; IN ; PUTSP ; TRAP x30 ; HALT
        let mut emu = emulator_with_program(&[0xF020, 0xF021, 0xF023, 0xF024, 0xF030, HALT]);
        let executed = emu.run(None).unwrap();
        expect_that!(executed, eq(6));
        expect_that!(emu.diagnostics().unimplemented_traps, eq(4));
        expect_that!(emu.diagnostics().unknown_trap_vectors, eq(1));
        expect_that!(emu.output().get_string(), eq(""));
    }
    #[gtest]
    pub fn test_strict_policy_halts_on_unknown_opcode() {
        let mut emu = emulator_with_config(EmulatorConfig::strict(), &[0xD000, HALT]);
        let err = emu.step().unwrap_err();
        expect_that!(
            err.to_string(),
            eq("Illegal instruction 0xD000 (Res) at address 0x3000")
        );
        expect_that!(emu.is_running(), eq(false));
        expect_that!(emu.step().unwrap(), eq(StepOutcome::Idle));
        expect_that!(emu.diagnostics().unknown_opcodes, eq(1));
    }
    #[gtest]
    pub fn test_strict_policy_halts_on_unimplemented_trap() {
        let mut emu = emulator_with_config(EmulatorConfig::strict(), &[0xF020]);
        let err = emu.run(None).unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::IllegalInstruction {
                opcode: Opcode::Trap,
                address: 0x3000,
                ..
            }
        ));
    }
    #[gtest]
    pub fn test_run_with_step_limit() {
        // BRnzp #-1 loops forever
        let mut emu = emulator_with_program(&[0b0000_111_111111111]);
        let executed = emu.run(Some(10)).unwrap();
        expect_that!(executed, eq(10));
        expect_that!(emu.is_running(), eq(true));
        expect_that!(emu.registers().pc(), eq(0x3000));
    }
    #[gtest]
    pub fn test_puts_output_error() {
        let mut emu = Emulator::with_output(test_helpers::StringWriter::failing());
        emu.load_words(0x3000, &[0b1110_000_000000010, PUTS, HALT, u16::from(b'x'), 0]);
        emu.step().unwrap();
        let err = emu.step().unwrap_err();
        expect_that!(err.to_string(), eq("Error writing program output: output closed"));
    }
    #[gtest]
    pub fn test_truncated_load_is_recorded() {
        let mut emu = Emulator::with_output(Vec::new());
        let report = emu.load_words(0xFFFF, &[1, 2]);
        expect_that!(report.words_truncated, eq(1));
        expect_that!(emu.diagnostics().truncated_images, eq(1));
    }
    #[gtest]
    pub fn test_reset() {
        let mut emu = emulator_with_program(&[HALT]);
        emu.step().unwrap();
        emu.reset();
        expect_that!(emu.is_running(), eq(true));
        expect_that!(emu.registers().pc(), eq(0x3000));
        expect_that!(emu.memory().peek(0x3000), eq(0));
    }
    #[gtest]
    pub fn test_fetch_reads_through_keyboard_status() {
        let mut emu = Emulator::with_output(Vec::new());
        // ADD R1, R1, #1 placed in KBSR, fetching it consumes the value
        emu.memory_mut().write(0xFE00, 0b0001_001_001_1_00001);
        emu.registers_mut().set_pc(0xFE00);
        emu.step().unwrap();
        expect_that!(emu.registers().get(1), eq(1));
        expect_that!(emu.memory().peek(0xFE00), eq(0));
    }
}
