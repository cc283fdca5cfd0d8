//! Program files and disassembly.
//!
//! This module provides:
//! - The program loader (binary-text file → bytes) and writer
//! - A disassembler (bytes → readable text)

pub mod disasm;
pub mod program;

pub use disasm::disassemble;
pub use program::{ProgramFile, LoadError, load_program, parse_program, save_program};
