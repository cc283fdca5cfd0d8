//! WebAssembly bindings for the LS-8 emulator.
//!
//! This module provides JavaScript-friendly wrappers around the core emulator.

use wasm_bindgen::prelude::*;
use crate::{Cpu, CpuConfig};
use crate::asm::parse_program;
use crate::asm::disasm::{disassemble_at, format_instruction};
use crate::cpu::registers::Reg;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly CPU wrapper.
#[wasm_bindgen]
pub struct WasmCpu {
    cpu: Cpu,
    program: Vec<u8>,
}

#[wasm_bindgen]
impl WasmCpu {
    /// Create a new CPU instance.
    #[wasm_bindgen(constructor)]
    pub fn new(legacy_ret: bool) -> Self {
        Self {
            cpu: Cpu::with_config(CpuConfig { legacy_ret }),
            program: Vec::new(),
        }
    }

    /// Load a program from binary-text source. Returns its size in bytes.
    #[wasm_bindgen]
    pub fn load(&mut self, source: &str) -> Result<usize, JsError> {
        let program = parse_program(source)
            .map_err(|e| JsError::new(&e.to_string()))?;

        self.program = program.bytes;
        self.cpu.reset();
        self.cpu.load_program(&self.program)
            .map_err(|e| JsError::new(&e.to_string()))?;

        Ok(self.program.len())
    }

    /// Step one instruction. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        let instr = self.cpu.step()
            .map_err(|e| JsError::new(&e.to_string()))?;

        Ok(format_instruction(&instr))
    }

    /// Run until halt or max cycles. Returns the total cycle count.
    #[wasm_bindgen]
    pub fn run(&mut self, max_cycles: u32) -> Result<u64, JsError> {
        self.cpu.run_limited(max_cycles as u64)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(self.cpu.cycles)
    }

    /// Reset CPU to initial state with loaded program.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.cpu.reset();
        let _ = self.cpu.load_program(&self.program);
    }

    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.cpu.is_running()
    }

    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    #[wasm_bindgen]
    pub fn pc(&self) -> u8 {
        self.cpu.regs.pc
    }

    /// Register value, or 0 for an index above 7.
    #[wasm_bindgen]
    pub fn register(&self, index: u8) -> u8 {
        Reg::new(index).map(|r| self.cpu.regs.get(r)).unwrap_or(0)
    }

    #[wasm_bindgen]
    pub fn flags(&self) -> u8 {
        self.cpu.regs.fl.bits()
    }

    /// Get state as string.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        format!("{:?}", self.cpu.state)
    }

    #[wasm_bindgen]
    pub fn memory_at(&self, addr: u8) -> u8 {
        self.cpu.mem.read(addr)
    }

    /// All 256 memory cells.
    #[wasm_bindgen]
    pub fn memory_all(&self) -> Vec<u8> {
        self.cpu.mem.as_slice().to_vec()
    }

    /// Values printed by PRN so far.
    #[wasm_bindgen]
    pub fn output(&self) -> Vec<u8> {
        self.cpu.output().to_vec()
    }

    /// Disassemble the instruction at `addr`.
    #[wasm_bindgen]
    pub fn disassemble_at(&self, addr: u8) -> String {
        disassemble_at(&self.cpu.mem, addr).0
    }

    /// Full machine snapshot as JSON.
    #[wasm_bindgen]
    pub fn snapshot_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.cpu).map_err(|e| JsError::new(&e.to_string()))
    }
}

impl Default for WasmCpu {
    fn default() -> Self {
        Self::new(false)
    }
}
