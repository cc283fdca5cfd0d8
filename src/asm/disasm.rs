//! Disassembler for LS-8 programs.
//!
//! Converts machine bytes back to readable assembly.

use crate::cpu::decode::{decode, Instruction};
use crate::cpu::memory::{Memory, MEMORY_SIZE};

/// Disassemble the instruction at `addr`.
///
/// Returns the text and the number of bytes it occupies. Bytes that do not
/// decode are shown as `???` and count as one byte.
pub fn disassemble_at(mem: &Memory, addr: u8) -> (String, u8) {
    match decode(mem, addr) {
        Ok(instr) => (format_instruction(&instr), instr.size()),
        Err(_) => (format!("??? ; {:#04X}", mem.read(addr)), 1),
    }
}

/// Linear sweep over `bytes`, yielding `(address, text, size)` per instruction.
///
/// Sizes are clamped so every instruction stays within `bytes`.
pub fn disassemble_listing(bytes: &[u8]) -> Vec<(u8, String, u8)> {
    let len = bytes.len().min(MEMORY_SIZE);
    let mut mem = Memory::new();
    for (i, &b) in bytes[..len].iter().enumerate() {
        mem.write(i as u8, b);
    }

    let mut listing = Vec::new();
    let mut addr = 0usize;
    while addr < len {
        let (text, size) = disassemble_at(&mem, addr as u8);
        let size = size.min((len - addr) as u8);
        listing.push((addr as u8, text, size));
        addr += size as usize;
    }
    listing
}

/// Disassemble a program to a listing.
pub fn disassemble(bytes: &[u8]) -> String {
    let mut output = String::new();
    output.push_str("; LS-8 Disassembly\n");
    output.push_str("; ----------------\n\n");

    for (addr, text, size) in disassemble_listing(bytes) {
        let raw: Vec<String> = bytes[addr as usize..addr as usize + size as usize]
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect();
        output.push_str(&format!("{:03}: {:<16} ; {}\n", addr, text, raw.join(" ")));
    }

    output
}

/// Format a decoded instruction as assembly text.
pub fn format_instruction(instr: &Instruction) -> String {
    let m = instr.mnemonic();
    match instr {
        Instruction::Ldi { reg, imm } => format!("{} {}, {}", m, reg, imm),

        Instruction::Add { a, b }
        | Instruction::Mul { a, b }
        | Instruction::Cmp { a, b } => format!("{} {}, {}", m, a, b),

        Instruction::Prn { reg }
        | Instruction::Push { reg }
        | Instruction::Pop { reg }
        | Instruction::Call { reg }
        | Instruction::Jmp { reg }
        | Instruction::Jeq { reg }
        | Instruction::Jne { reg } => format!("{} {}", m, reg),

        Instruction::Ret { operand } => match instr.ret_register() {
            Some(reg) => format!("{} {}", m, reg),
            None => format!("{} {:#04X}", m, operand),
        },

        Instruction::Hlt => m.to_string(),
    }
}
