use crate::emulator::Emulator;
use crate::errors::HostError;
use crate::hardware::keyboard::{self, KeyboardInputProvider};
use std::io::Write;
use tracing::info;

/// Keyboard is polled once per this many steps.
pub const POLL_INTERVAL: u64 = 1024;

/// How an interactive run ended.
#[derive(Debug)]
pub struct HostRun {
    /// Instructions executed, including the failing one.
    pub steps: u64,
    pub stopped_by_user: bool,
    pub error: Option<HostError>,
}

/// Steps `emu` until it halts, `max_steps` is reached, `input` asks to stop or an error
/// occurs. Key presses of `input` are signalled to the program between steps.
///
/// Errors end the run but are returned inside [`HostRun`], so the caller can still report
/// the steps and diagnostics gathered up to that point.
pub fn drive<W: Write>(
    emu: &mut Emulator<W>,
    input: &mut impl KeyboardInputProvider,
    max_steps: Option<u64>,
) -> HostRun {
    let mut run = HostRun {
        steps: 0,
        stopped_by_user: false,
        error: None,
    };
    while emu.is_running() && max_steps.is_none_or(|max| run.steps < max) {
        if run.steps.is_multiple_of(POLL_INTERVAL) {
            match keyboard::pump(input, emu.memory_mut()) {
                Ok(flow) if flow.is_break() => {
                    info!("stopped by user after {} steps", run.steps);
                    run.stopped_by_user = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    run.error = Some(e.into());
                    break;
                }
            }
        }
        let result = emu.step();
        run.steps += 1;
        if let Err(e) = result {
            run.error = Some(e.into());
            break;
        }
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmulatorConfig;
    use crate::emulator::test_helpers::{
        FakeKeyboardInputProvider, emulator_with_config, emulator_with_program,
    };
    use crate::hardware::keyboard::HostEvent;
    use googletest::prelude::*;

    #[gtest]
    pub fn test_drive_until_halt() {
        // ADD R0, R0, #1 ; HALT
        let mut emu = emulator_with_program(&[0x1021, 0xF025]);
        let mut input = FakeKeyboardInputProvider::new(&[]);
        let run = drive(&mut emu, &mut input, None);
        expect_that!(run.steps, eq(2));
        expect_that!(run.stopped_by_user, eq(false));
        expect_that!(run.error.is_none(), eq(true));
        expect_that!(emu.is_running(), eq(false));
    }
    #[gtest]
    pub fn test_drive_keeps_diagnostics_on_error() {
        // ADD R0, R0, #1 ; reserved opcode
        let mut emu = emulator_with_config(EmulatorConfig::strict(), &[0x1021, 0xD000]);
        let mut input = FakeKeyboardInputProvider::new(&[]);
        let run = drive(&mut emu, &mut input, None);
        expect_that!(run.steps, eq(2));
        expect_that!(
            run.error.map(|e| e.to_string()),
            some(eq("Illegal instruction 0xD000 (Res) at address 0x3001"))
        );
        expect_that!(emu.diagnostics().unknown_opcodes, eq(1));
        expect_that!(emu.registers().get(0), eq(1));
    }
    #[gtest]
    pub fn test_drive_stop_event() {
        let mut emu = emulator_with_program(&[0x0FFF]);
        let mut input = FakeKeyboardInputProvider::new(&[HostEvent::Stop]);
        let run = drive(&mut emu, &mut input, None);
        expect_that!(run.steps, eq(0));
        expect_that!(run.stopped_by_user, eq(true));
        expect_that!(emu.is_running(), eq(true));
    }
    #[gtest]
    pub fn test_drive_signals_key_and_respects_limit() {
        // LDI R0, #1 ; BR #-2 ; .FILL xFE02
        let mut emu = emulator_with_program(&[0xA001, 0x0FFE, 0xFE02]);
        let mut input = FakeKeyboardInputProvider::new(&[HostEvent::Key(b'q')]);
        let run = drive(&mut emu, &mut input, Some(10));
        expect_that!(run.steps, eq(10));
        expect_that!(run.error.is_none(), eq(true));
        expect_that!(emu.registers().get(0), eq(u16::from(b'q')));
    }
}
