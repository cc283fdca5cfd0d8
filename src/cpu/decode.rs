//! Instruction decoder for the LS-8.
//!
//! Every instruction is an opcode byte followed by zero, one or two operand
//! bytes. The operand count is fixed per opcode. The high two bits of each
//! opcode happen to encode that count, but decoding goes through an explicit
//! table rather than trusting the bit layout.

use crate::cpu::memory::Memory;
use crate::cpu::registers::Reg;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Decoded LS-8 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    // ==================== Data ====================

    /// Load immediate: reg := imm
    Ldi { reg: Reg, imm: u8 },

    /// Print reg as an unsigned decimal
    Prn { reg: Reg },

    // ==================== ALU ====================

    /// a := a + b
    Add { a: Reg, b: Reg },

    /// a := a * b
    Mul { a: Reg, b: Reg },

    /// FL := compare(a, b)
    Cmp { a: Reg, b: Reg },

    // ==================== Stack ====================

    /// SP -= 1; [SP] := reg
    Push { reg: Reg },

    /// reg := [SP]; SP += 1
    Pop { reg: Reg },

    // ==================== Control Flow ====================

    /// Push return address, PC := reg
    Call { reg: Reg },

    /// Pop return address into PC.
    ///
    /// Always two bytes. The operand byte is kept raw and only read by legacy
    /// RET mode, which writes the return address to it when it names a
    /// register.
    Ret { operand: u8 },

    /// PC := reg
    Jmp { reg: Reg },

    /// if FL.E then PC := reg
    Jeq { reg: Reg },

    /// if !FL.E then PC := reg
    Jne { reg: Reg },

    /// Halt execution
    Hlt,
}

impl Instruction {
    /// Total encoded size in bytes (opcode plus operands).
    pub fn size(&self) -> u8 {
        match self {
            Instruction::Hlt => 1,
            Instruction::Prn { .. }
            | Instruction::Push { .. }
            | Instruction::Pop { .. }
            | Instruction::Call { .. }
            | Instruction::Ret { .. }
            | Instruction::Jmp { .. }
            | Instruction::Jeq { .. }
            | Instruction::Jne { .. } => 2,
            Instruction::Ldi { .. }
            | Instruction::Add { .. }
            | Instruction::Mul { .. }
            | Instruction::Cmp { .. } => 3,
        }
    }

    /// Opcode byte.
    pub fn opcode(&self) -> u8 {
        match self {
            Instruction::Ldi { .. } => Opcode::LDI,
            Instruction::Prn { .. } => Opcode::PRN,
            Instruction::Add { .. } => Opcode::ADD,
            Instruction::Mul { .. } => Opcode::MUL,
            Instruction::Cmp { .. } => Opcode::CMP,
            Instruction::Push { .. } => Opcode::PUSH,
            Instruction::Pop { .. } => Opcode::POP,
            Instruction::Call { .. } => Opcode::CALL,
            Instruction::Ret { .. } => Opcode::RET,
            Instruction::Jmp { .. } => Opcode::JMP,
            Instruction::Jeq { .. } => Opcode::JEQ,
            Instruction::Jne { .. } => Opcode::JNE,
            Instruction::Hlt => Opcode::HLT,
        }
    }

    /// Assembly mnemonic.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Ldi { .. } => "LDI",
            Instruction::Prn { .. } => "PRN",
            Instruction::Add { .. } => "ADD",
            Instruction::Mul { .. } => "MUL",
            Instruction::Cmp { .. } => "CMP",
            Instruction::Push { .. } => "PUSH",
            Instruction::Pop { .. } => "POP",
            Instruction::Call { .. } => "CALL",
            Instruction::Ret { .. } => "RET",
            Instruction::Jmp { .. } => "JMP",
            Instruction::Jeq { .. } => "JEQ",
            Instruction::Jne { .. } => "JNE",
            Instruction::Hlt => "HLT",
        }
    }

    /// The register named by RET's operand byte, if any.
    pub fn ret_register(&self) -> Option<Reg> {
        match *self {
            Instruction::Ret { operand } => Reg::new(operand),
            _ => None,
        }
    }
}

/// Opcode byte values.
pub struct Opcode;

impl Opcode {
    pub const LDI: u8 = 0b1000_0010;
    pub const PRN: u8 = 0b0100_0111;
    pub const HLT: u8 = 0b0000_0001;
    pub const MUL: u8 = 0b1010_0010;
    pub const ADD: u8 = 0b1010_0000;
    pub const CMP: u8 = 0b1010_0111;
    pub const PUSH: u8 = 0b0100_0101;
    pub const POP: u8 = 0b0100_0110;
    pub const CALL: u8 = 0b0101_0000;
    pub const RET: u8 = 0b0001_0001;
    pub const JMP: u8 = 0b0101_0100;
    pub const JEQ: u8 = 0b0101_0101;
    pub const JNE: u8 = 0b0101_0110;
}

/// Decode the instruction whose opcode sits at `pc`.
///
/// Operand bytes are read from the following addresses, wrapping at 256.
pub fn decode(mem: &Memory, pc: u8) -> Result<Instruction, DecodeError> {
    let opcode = mem.read(pc);
    let op1 = mem.read(pc.wrapping_add(1));
    let op2 = mem.read(pc.wrapping_add(2));

    let reg = |raw: u8| Reg::new(raw).ok_or(DecodeError::InvalidRegister { reg: raw, pc });

    let instruction = match opcode {
        Opcode::LDI => Instruction::Ldi { reg: reg(op1)?, imm: op2 },
        Opcode::PRN => Instruction::Prn { reg: reg(op1)? },
        Opcode::HLT => Instruction::Hlt,
        Opcode::MUL => Instruction::Mul { a: reg(op1)?, b: reg(op2)? },
        Opcode::ADD => Instruction::Add { a: reg(op1)?, b: reg(op2)? },
        Opcode::CMP => Instruction::Cmp { a: reg(op1)?, b: reg(op2)? },
        Opcode::PUSH => Instruction::Push { reg: reg(op1)? },
        Opcode::POP => Instruction::Pop { reg: reg(op1)? },
        Opcode::CALL => Instruction::Call { reg: reg(op1)? },
        Opcode::RET => Instruction::Ret { operand: op1 },
        Opcode::JMP => Instruction::Jmp { reg: reg(op1)? },
        Opcode::JEQ => Instruction::Jeq { reg: reg(op1)? },
        Opcode::JNE => Instruction::Jne { reg: reg(op1)? },
        _ => return Err(DecodeError::UnknownInstruction { opcode, pc }),
    };

    Ok(instruction)
}

/// Encode an instruction to its byte sequence.
pub fn encode(instr: &Instruction) -> Vec<u8> {
    let mut bytes = vec![instr.opcode()];

    match *instr {
        Instruction::Ldi { reg, imm } => bytes.extend([reg.index(), imm]),
        Instruction::Add { a, b }
        | Instruction::Mul { a, b }
        | Instruction::Cmp { a, b } => bytes.extend([a.index(), b.index()]),
        Instruction::Prn { reg }
        | Instruction::Push { reg }
        | Instruction::Pop { reg }
        | Instruction::Call { reg }
        | Instruction::Jmp { reg }
        | Instruction::Jeq { reg }
        | Instruction::Jne { reg } => bytes.push(reg.index()),
        Instruction::Ret { operand } => bytes.push(operand),
        Instruction::Hlt => {}
    }

    bytes
}

/// Encode a sequence of instructions back to back.
pub fn encode_program(instructions: &[Instruction]) -> Vec<u8> {
    instructions.iter().flat_map(encode).collect()
}

/// Errors that can occur during decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown instruction {opcode:#010b} ({opcode}) at address {pc}")]
    UnknownInstruction { opcode: u8, pc: u8 },

    #[error("invalid register operand {reg} at address {pc}")]
    InvalidRegister { reg: u8, pc: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(i: u8) -> Reg {
        Reg::new(i).unwrap()
    }

    fn mem_with(bytes: &[u8]) -> Memory {
        let mut mem = Memory::new();
        mem.load_program(bytes).unwrap();
        mem
    }

    #[test]
    fn test_decode_ldi() {
        let mem = mem_with(&[0b1000_0010, 0, 8]);
        assert_eq!(decode(&mem, 0), Ok(Instruction::Ldi { reg: r(0), imm: 8 }));
    }

    #[test]
    fn test_decode_print8_program() {
        let mem = mem_with(&[
            0b1000_0010, 0b0000_0000, 0b0000_1000,
            0b0100_0111, 0b0000_0000,
            0b0000_0001,
        ]);
        assert_eq!(decode(&mem, 0).unwrap().size(), 3);
        assert_eq!(decode(&mem, 3), Ok(Instruction::Prn { reg: r(0) }));
        assert_eq!(decode(&mem, 5), Ok(Instruction::Hlt));
    }

    #[test]
    fn test_decode_alu_ops() {
        let mem = mem_with(&[Opcode::CMP, 3, 4]);
        assert_eq!(decode(&mem, 0), Ok(Instruction::Cmp { a: r(3), b: r(4) }));
    }

    #[test]
    fn test_decode_unknown() {
        let mem = mem_with(&[0xFF]);
        assert_eq!(
            decode(&mem, 0),
            Err(DecodeError::UnknownInstruction { opcode: 0xFF, pc: 0 })
        );
    }

    #[test]
    fn test_zero_byte_is_unknown() {
        let mem = Memory::new();
        assert!(matches!(
            decode(&mem, 17),
            Err(DecodeError::UnknownInstruction { opcode: 0, pc: 17 })
        ));
    }

    #[test]
    fn test_decode_invalid_register() {
        let mem = mem_with(&[Opcode::PUSH, 8]);
        assert_eq!(
            decode(&mem, 0),
            Err(DecodeError::InvalidRegister { reg: 8, pc: 0 })
        );
    }

    #[test]
    fn test_decode_operands_wrap() {
        let mut mem = Memory::new();
        mem.write(255, Opcode::LDI);
        mem.write(0, 2);
        mem.write(1, 99);
        assert_eq!(decode(&mem, 255), Ok(Instruction::Ldi { reg: r(2), imm: 99 }));
    }

    #[test]
    fn test_decode_ret_operand() {
        // RET never faults on its operand, whatever the byte holds
        let ret = decode(&mem_with(&[Opcode::RET, Opcode::LDI]), 0).unwrap();
        assert_eq!(ret, Instruction::Ret { operand: Opcode::LDI });
        assert_eq!(ret.size(), 2);
        assert_eq!(ret.ret_register(), None);

        let ret = decode(&mem_with(&[Opcode::RET, 3]), 0).unwrap();
        assert_eq!(ret.size(), 2);
        assert_eq!(ret.ret_register(), Some(r(3)));
    }

    #[test]
    fn test_encode_matches_len() {
        let all = [
            Instruction::Ldi { reg: r(1), imm: 200 },
            Instruction::Prn { reg: r(1) },
            Instruction::Add { a: r(0), b: r(1) },
            Instruction::Mul { a: r(0), b: r(1) },
            Instruction::Cmp { a: r(0), b: r(1) },
            Instruction::Push { reg: r(2) },
            Instruction::Pop { reg: r(3) },
            Instruction::Call { reg: r(4) },
            Instruction::Ret { operand: 0 },
            Instruction::Ret { operand: 0xFF },
            Instruction::Jmp { reg: r(5) },
            Instruction::Jeq { reg: r(5) },
            Instruction::Jne { reg: r(5) },
            Instruction::Hlt,
        ];

        for instr in all {
            let bytes = encode(&instr);
            assert_eq!(bytes.len(), instr.size() as usize, "{}", instr.mnemonic());
            assert_eq!(decode(&mem_with(&bytes), 0), Ok(instr));
        }
    }
}
