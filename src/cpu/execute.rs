//! CPU execution engine for the LS-8.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::cpu::{Memory, Registers, CpuConfig};
use crate::cpu::alu::{alu, AluOp};
use crate::cpu::decode::{self, Instruction, DecodeError};
use crate::cpu::memory::MemoryError;
use crate::cpu::registers::{Reg, NUM_REGISTERS};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// CPU execution state.
///
/// `Halted` and `Faulted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// Built (and possibly loaded) but not started.
    Constructed,
    /// Fetching and executing.
    Running,
    /// Executed HLT.
    Halted,
    /// Stopped on an instruction that could not be decoded.
    Faulted,
}

/// The LS-8 CPU.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Current execution state.
    pub state: CpuState,
    /// Instruction count.
    pub cycles: u64,
    /// Behavior switches.
    pub config: CpuConfig,
    /// Values printed by PRN, in execution order.
    output: Vec<u8>,
    /// Last executed instruction (for debugging).
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a new CPU in its power-on state.
    pub fn new() -> Self {
        Self::with_config(CpuConfig::default())
    }

    pub fn with_config(config: CpuConfig) -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            state: CpuState::Constructed,
            cycles: 0,
            config,
            output: Vec::new(),
            last_instr: None,
        }
    }

    /// Reset the CPU to its power-on state. Configuration is kept.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.state = CpuState::Constructed;
        self.cycles = 0;
        self.output.clear();
        self.last_instr = None;
    }

    /// Load a program into memory starting at address 0.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        self.mem.load_program(program)?;
        log::debug!("loaded {} bytes", program.len());
        Ok(())
    }

    #[inline]
    pub fn ram_read(&self, addr: u8) -> u8 {
        self.mem.read(addr)
    }

    #[inline]
    pub fn ram_write(&mut self, addr: u8, value: u8) {
        self.mem.write(addr, value);
    }

    /// Execute a single instruction.
    ///
    /// Returns the instruction that was executed, or an error. A decode
    /// error moves the CPU to `Faulted`.
    pub fn step(&mut self) -> Result<Instruction, CpuError> {
        self.start()?;

        let pc = self.regs.pc;
        log::trace!("{}", self.trace_line());

        let instr = match decode::decode(&self.mem, pc) {
            Ok(instr) => instr,
            Err(e) => {
                self.state = CpuState::Faulted;
                log::debug!("fault after {} cycles: {}", self.cycles, e);
                return Err(e.into());
            }
        };

        self.execute(instr);

        self.cycles += 1;
        self.last_instr = Some(instr);

        Ok(instr)
    }

    /// Run until halt or error.
    ///
    /// Returns the number of instructions executed. A program that never
    /// halts never returns.
    pub fn run(&mut self) -> Result<u64, CpuError> {
        self.start()?;
        let start_cycles = self.cycles;

        while self.state == CpuState::Running {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, CpuError> {
        self.start()?;
        let start_cycles = self.cycles;
        let limit = self.cycles.saturating_add(max_cycles);

        while self.state == CpuState::Running && self.cycles < limit {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    fn start(&mut self) -> Result<(), CpuError> {
        match self.state {
            CpuState::Constructed => {
                self.state = CpuState::Running;
                Ok(())
            }
            CpuState::Running => Ok(()),
            state => Err(CpuError::NotRunning(state)),
        }
    }

    /// Execute a decoded instruction.
    fn execute(&mut self, instr: Instruction) {
        let size = instr.size();

        match instr {
            // ==================== Data ====================

            Instruction::Ldi { reg, imm } => {
                self.regs.set(reg, imm);
                self.regs.advance_pc(size);
            }

            Instruction::Prn { reg } => {
                self.output.push(self.regs.get(reg));
                self.regs.advance_pc(size);
            }

            // ==================== ALU ====================

            Instruction::Add { a, b } => {
                alu(&mut self.regs, AluOp::Add, a, b);
                self.regs.advance_pc(size);
            }

            Instruction::Mul { a, b } => {
                alu(&mut self.regs, AluOp::Mul, a, b);
                self.regs.advance_pc(size);
            }

            Instruction::Cmp { a, b } => {
                alu(&mut self.regs, AluOp::Cmp, a, b);
                self.regs.advance_pc(size);
            }

            // ==================== Stack ====================

            Instruction::Push { reg } => {
                self.push(self.regs.get(reg));
                self.regs.advance_pc(size);
            }

            Instruction::Pop { reg } => {
                let value = self.pop();
                self.regs.set(reg, value);
                self.regs.advance_pc(size);
            }

            // ==================== Control Flow ====================

            Instruction::Call { reg } => {
                let target = self.regs.get(reg);
                self.push(self.regs.pc.wrapping_add(size));
                self.regs.jump(target);
            }

            Instruction::Ret { .. } => {
                let ret_addr = self.pop();
                if self.config.legacy_ret {
                    if let Some(reg) = instr.ret_register() {
                        self.regs.set(reg, ret_addr);
                    }
                }
                self.regs.jump(ret_addr);
            }

            Instruction::Jmp { reg } => {
                self.regs.jump(self.regs.get(reg));
            }

            Instruction::Jeq { reg } => {
                if self.regs.fl.equal() {
                    self.regs.jump(self.regs.get(reg));
                } else {
                    self.regs.advance_pc(size);
                }
            }

            Instruction::Jne { reg } => {
                if !self.regs.fl.equal() {
                    self.regs.jump(self.regs.get(reg));
                } else {
                    self.regs.advance_pc(size);
                }
            }

            Instruction::Hlt => {
                self.regs.advance_pc(size);
                self.state = CpuState::Halted;
                log::debug!("halted after {} cycles", self.cycles + 1);
            }
        }
    }

    /// SP -= 1; [SP] := value
    fn push(&mut self, value: u8) {
        let sp = self.regs.sp().wrapping_sub(1);
        self.regs.set_sp(sp);
        self.mem.write(sp, value);
    }

    /// value := [SP]; SP += 1
    fn pop(&mut self) -> u8 {
        let sp = self.regs.sp();
        let value = self.mem.read(sp);
        self.regs.set_sp(sp.wrapping_add(1));
        value
    }

    /// One-line state summary:
    /// `TRACE: PC | [PC] [PC+1] [PC+2] | R0 .. R7`, all in hex.
    pub fn trace_line(&self) -> String {
        let pc = self.regs.pc;
        let mut line = format!(
            "TRACE: {:02X} | {:02X} {:02X} {:02X} |",
            pc,
            self.mem.read(pc),
            self.mem.read(pc.wrapping_add(1)),
            self.mem.read(pc.wrapping_add(2)),
        );
        for i in 0..NUM_REGISTERS as u8 {
            if let Some(reg) = Reg::new(i) {
                line.push_str(&format!(" {:02X}", self.regs.get(reg)));
            }
        }
        line
    }

    /// Everything printed so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Drain the printed values.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU can still execute instructions.
    pub fn is_running(&self) -> bool {
        matches!(self.state, CpuState::Constructed | CpuState::Running)
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("{0}")]
    Decode(#[from] DecodeError),
}
