//! CPU emulation for the LS-8.
//!
//! This module implements the complete LS-8 machine:
//! - 256 byte-wide memory cells
//! - 8 general purpose registers, R7 doubling as the stack pointer
//! - a 13-instruction set with register operands and an ALU for ADD/MUL/CMP

pub mod memory;
pub mod registers;
pub mod decode;
pub mod alu;
pub mod config;
pub mod execute;

pub use memory::{Memory, MemoryError};
pub use registers::{Registers, Reg, Flags};
pub use decode::{Instruction, Opcode, DecodeError};
pub use alu::AluOp;
pub use config::{CpuConfig, ConfigError};
pub use execute::{Cpu, CpuError, CpuState};
