//! # LS-8 Emulator
//!
//! An emulator for the LS-8, a small 8-bit computer with 256 bytes of
//! memory, eight registers and a stack that grows down from `0xF4`.
//!
//! Programs are text files holding one binary byte per line; see
//! [`asm::program`] for the format.

pub mod cpu;
pub mod asm;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use cpu::{Cpu, CpuConfig, CpuState, CpuError, Memory, Registers, Reg, Flags, Instruction};
pub use asm::{disassemble, ProgramFile, LoadError, load_program, parse_program, save_program};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
