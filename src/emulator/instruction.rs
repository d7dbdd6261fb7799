use crate::numbers::{sign_extend, twos_complement_to_decimal};
use std::fmt::{Debug, Formatter};

/// The 16 LC-3 opcodes, selected by bits `[15:12]` of an instruction.
#[repr(u8)]
#[derive(enumn::N, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Br = 0b0000,
    Add = 0b0001,
    Ld = 0b0010,
    St = 0b0011,
    Jsr = 0b0100,
    And = 0b0101,
    Ldr = 0b0110,
    Str = 0b0111,
    /// Return from interrupt, not supported without an interrupt model
    Rti = 0b1000,
    Not = 0b1001,
    Ldi = 0b1010,
    Sti = 0b1011,
    Jmp = 0b1100,
    /// Reserved
    Res = 0b1101,
    Lea = 0b1110,
    Trap = 0b1111,
}

/// Wrapper for LC-3 u16 instruction.
/// format is: `OOOO_DDD_P_PPPP_PPPP`
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Instruction(u16);

impl Instruction {
    /// Gives the value of only the specified bit range.
    ///
    /// # Parameters
    /// - `from`: starting index
    /// - `to`: end index (inclusive), mut be greater or equal to `from`
    ///
    /// # Panics
    /// - asserts that to is greater or equal from and both are valid indexes
    #[must_use]
    pub fn get_bit_range(self, from: u8, to: u8) -> u16 {
        debug_assert!(
            to >= from,
            "wrong direction of from: {from:?} and to: {to:?}"
        );
        debug_assert!(
            (0..u16::BITS).contains(&u32::from(to)),
            "index: {to:?} to u16 is greater than maximum value {:?}",
            u16::BITS - 1
        );
        let width = u32::from(to - from + 1);
        let mask = u16::MAX.checked_shr(u16::BITS - width).unwrap_or(0);
        (self.0 >> from) & mask
    }
    /// Register index from a 3 bit field starting at `from`.
    fn register_at(self, from: u8) -> u8 {
        self.get_bit_range(from, from + 2).to_le_bytes()[0]
    }
    #[must_use]
    pub fn get_bit(self, index: u8) -> bool {
        self.get_bit_range(index, index) & 1 != 0
    }
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }
    #[must_use]
    pub fn op_code(self) -> Opcode {
        let raw = self.0.to_be_bytes()[0] >> 4;
        // every 4 bit value is an opcode
        Opcode::n(raw).unwrap_or(Opcode::Res)
    }
    /// Destination register, also the source register of `ST`, `STI` and `STR`.
    #[must_use]
    pub fn dr_number(self) -> u8 {
        self.register_at(9)
    }
    /// First source register, also `BaseR` of `JMP`, `JSRR`, `LDR` and `STR`.
    #[must_use]
    pub fn sr1_number(self) -> u8 {
        self.register_at(6)
    }
    #[must_use]
    pub fn sr2_number(self) -> u8 {
        self.register_at(0)
    }
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.get_bit(5)
    }
    /// Sign extended `imm5`.
    #[must_use]
    pub fn get_immediate(self) -> u16 {
        sign_extend(self.get_bit_range(0, 4), 5)
    }
    /// Sign extended offset in the lowest `len` bits, as a wrapping addend.
    #[must_use]
    pub fn offset(self, len: u8) -> u16 {
        sign_extend(self.get_bit_range(0, len - 1), len)
    }
    /// Offset to add to program counter PC.
    /// Can be positive or negative.
    #[must_use]
    pub fn pc_offset(self, len: u8) -> i16 {
        twos_complement_to_decimal(self.offset(len))
    }
    /// The `nzp` mask of `BR`, comparable with [`crate::hardware::ConditionFlag::bits`].
    #[must_use]
    pub fn condition_mask(self) -> u16 {
        self.get_bit_range(9, 11)
    }
    /// Bit 11 of `JSR` selects `PCOffset11` over `BaseR`.
    #[must_use]
    pub fn is_long_jump(self) -> bool {
        self.get_bit(11)
    }
    #[must_use]
    pub fn trap_vector(self) -> u8 {
        self.0.to_le_bytes()[0]
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} {:#06X}: DR: {:03b}, SR1: {:03b}, PC_Off: {}",
            self.op_code(),
            self.0,
            self.dr_number(),
            self.sr1_number(),
            self.pc_offset(9)
        )
    }
}

impl From<u16> for Instruction {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}
