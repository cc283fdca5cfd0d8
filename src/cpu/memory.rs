//! LS-8 memory subsystem.
//!
//! 256 byte-wide cells addressed by a single `u8`, so every address the
//! machine can form is in range.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of memory cells in the LS-8.
pub const MEMORY_SIZE: usize = 256;

/// LS-8 memory: 256 eight-bit cells.
#[derive(Clone, Serialize, Deserialize)]
pub struct Memory {
    cells: Vec<u8>,
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read a cell.
    #[inline]
    pub fn read(&self, addr: u8) -> u8 {
        self.cells[addr as usize]
    }

    /// Write a cell.
    #[inline]
    pub fn write(&mut self, addr: u8, value: u8) {
        self.cells[addr as usize] = value;
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Place a program at address 0, in order.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        if program.len() > MEMORY_SIZE {
            return Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                capacity: MEMORY_SIZE,
            });
        }

        self.cells[..program.len()].copy_from_slice(program);
        Ok(())
    }

    /// Dump memory contents (for debugging).
    pub fn dump(&self, start: u8, count: usize) -> Vec<(u8, u8)> {
        let end = (start as usize + count).min(MEMORY_SIZE);
        (start as usize..end)
            .map(|i| (i as u8, self.cells[i]))
            .collect()
    }

    /// All 256 cells in address order.
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.cells.iter().filter(|&&b| b != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Program does not fit in memory.
    #[error("program size {size} exceeds memory capacity {capacity}")]
    ProgramTooLarge { size: usize, capacity: usize },
}
