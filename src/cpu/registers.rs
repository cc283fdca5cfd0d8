//! LS-8 CPU registers.
//!
//! The LS-8 has:
//! - R0-R7: eight 8-bit general purpose registers (R7 doubles as the stack pointer)
//! - PC: 8-bit program counter
//! - FL: flag register, `00000LGE`, written by CMP

use serde::{Serialize, Deserialize};

/// Number of general purpose registers.
pub const NUM_REGISTERS: usize = 8;

/// Register index holding the stack pointer.
pub const SP: Reg = Reg(7);

/// Initial stack pointer value.
pub const SP_INIT: u8 = 0xF4;

/// A validated register index (0-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reg(u8);

impl Reg {
    /// Create from a raw operand byte. Returns `None` for indices above 7.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < NUM_REGISTERS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// The register number.
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// The flag register.
#[derive(Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flags(u8);

impl Flags {
    /// Equal: bit 0
    pub const EQUAL: u8 = 0b001;
    /// Greater-than: bit 1
    pub const GREATER: u8 = 0b010;
    /// Less-than: bit 2
    pub const LESS: u8 = 0b100;

    /// Build from raw bits. Only the low 3 bits are kept.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b111)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn equal(self) -> bool {
        self.0 & Self::EQUAL != 0
    }

    pub const fn greater(self) -> bool {
        self.0 & Self::GREATER != 0
    }

    pub const fn less(self) -> bool {
        self.0 & Self::LESS != 0
    }
}

impl std::fmt::Debug for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FL={:03b} ({}{}{})",
            self.0,
            if self.less() { 'L' } else { '-' },
            if self.greater() { 'G' } else { '-' },
            if self.equal() { 'E' } else { '-' },
        )
    }
}

/// The LS-8 register file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// R0-R7
    pub gpr: [u8; NUM_REGISTERS],

    /// Program counter
    pub pc: u8,

    /// Flags set by the last CMP
    pub fl: Flags,
}

impl Registers {
    /// Create a register file in its power-on state.
    pub fn new() -> Self {
        let mut gpr = [0; NUM_REGISTERS];
        gpr[SP.index() as usize] = SP_INIT;

        Self {
            gpr,
            pc: 0,
            fl: Flags::default(),
        }
    }

    /// Reset to the power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub fn get(&self, reg: Reg) -> u8 {
        self.gpr[reg.index() as usize]
    }

    #[inline]
    pub fn set(&mut self, reg: Reg, value: u8) {
        self.gpr[reg.index() as usize] = value;
    }

    /// Current stack pointer (R7).
    #[inline]
    pub fn sp(&self) -> u8 {
        self.get(SP)
    }

    #[inline]
    pub fn set_sp(&mut self, value: u8) {
        self.set(SP, value);
    }

    /// Advance the program counter by `n` bytes, wrapping at 256.
    /// Returns the old value.
    pub fn advance_pc(&mut self, n: u8) -> u8 {
        let old = self.pc;
        self.pc = self.pc.wrapping_add(n);
        old
    }

    /// Set the program counter to an absolute address.
    pub fn jump(&mut self, addr: u8) {
        self.pc = addr;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
