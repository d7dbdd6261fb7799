use crate::hardware::memory::PROGRAM_SECTION_START;
use std::fmt::{Debug, Formatter};

/// Index of the register holding the return address after `JSR`/`JSRR`.
pub const RETURN_ADDRESS_REGISTER: u8 = 7;

/// General purpose registers `R0`-`R7`, program counter and condition register.
#[derive(Clone, PartialEq, Eq)]
pub struct Registers {
    general_purpose: [u16; 8],
    pc: u16,
    cond: ConditionFlag,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Registers {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PC: {:#06X}, COND: {:?}, ", self.pc, self.cond)?;
        f.debug_list()
            .entries(self.general_purpose.iter().map(|r| format!("{r:#06X}")))
            .finish()
    }
}

impl Registers {
    /// Zeroed registers, `PC` at the start of the program section and `COND` at `Zero`.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_pc(PROGRAM_SECTION_START)
    }
    #[must_use]
    pub const fn with_pc(pc: u16) -> Self {
        Self {
            general_purpose: [0u16; 8],
            pc,
            cond: ConditionFlag::Zero,
        }
    }

    /// # Panics
    /// - `r` is not a register index in `0..=7`
    #[must_use]
    pub fn get(&self, r: u8) -> u16 {
        assert!(r <= 7, "Invalid general purpose register get: {r}");
        self.general_purpose[usize::from(r)]
    }
    /// # Panics
    /// - `r` is not a register index in `0..=7`
    pub fn set(&mut self, r: u8, value: u16) {
        assert!(r <= 7, "Invalid general purpose register set: {r}");
        self.general_purpose[usize::from(r)] = value;
    }
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }
    /// Returns the current `PC` and advances it by one, wrapping at the end of memory.
    pub const fn fetch_pc(&mut self) -> u16 {
        let current = self.pc;
        self.pc = current.wrapping_add(1);
        current
    }
    #[must_use]
    pub const fn get_conditional_register(&self) -> ConditionFlag {
        self.cond
    }
    /// Sets the condition register from the sign of register `r`.
    pub fn update_conditional_register(&mut self, r: u8) {
        self.cond = ConditionFlag::from(self.get(r));
    }
}

/// Exactly one of these is set after every register defining instruction.
/// The discriminants match the `n`, `z` and `p` bits of `BR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ConditionFlag {
    /// Positive
    Pos = 1 << 0,
    Zero = 1 << 1,
    /// Negative
    Neg = 1 << 2,
}

impl ConditionFlag {
    #[must_use]
    pub const fn bits(self) -> u16 {
        self as u16
    }
}

impl From<u16> for ConditionFlag {
    fn from(value: u16) -> Self {
        if value == 0 {
            Self::Zero
        } else if value >> 15 == 1 {
            // leftmost bit is 1 for negative numbers
            Self::Neg
        } else {
            Self::Pos
        }
    }
}
