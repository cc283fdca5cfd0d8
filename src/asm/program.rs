//! LS-8 program file format.
//!
//! A plain-text format:
//! - One byte per line, written as a binary literal (`10000010`)
//! - `#` starts a comment that runs to the end of the line
//! - Blank and comment-only lines are ignored

use crate::asm::disasm::disassemble_listing;
use crate::cpu::memory::MEMORY_SIZE;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

/// A loaded program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramFile {
    /// The program bytes, in load order.
    pub bytes: Vec<u8>,
    /// Source line number (1-based) of each byte.
    pub source_lines: Vec<usize>,
}

impl ProgramFile {
    /// Create a new empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a byte.
    pub fn push(&mut self, byte: u8, line: usize) {
        self.bytes.push(byte);
        self.source_lines.push(line);
    }

    /// Number of bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Parse program text.
pub fn parse_program(text: &str) -> Result<ProgramFile, LoadError> {
    let mut program = ProgramFile::new();

    for (line_num, line) in text.lines().enumerate() {
        parse_line(&mut program, line, line_num + 1)?;
    }

    Ok(program)
}

/// Load a program file from disk.
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<ProgramFile, LoadError> {
    let path = path.as_ref();
    let io_error = |e: std::io::Error| LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let file = std::fs::File::open(path).map_err(io_error)?;
    let reader = BufReader::new(file);

    let mut program = ProgramFile::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(io_error)?;
        parse_line(&mut program, &line, line_num + 1)?;
    }

    log::debug!("read {} bytes from {}", program.len(), path.display());
    Ok(program)
}

fn parse_line(program: &mut ProgramFile, line: &str, line_num: usize) -> Result<(), LoadError> {
    let value = match line.split_once('#') {
        Some((code, _comment)) => code,
        None => line,
    }
    .trim();

    if value.is_empty() {
        return Ok(());
    }

    if !value.chars().all(|c| c == '0' || c == '1') {
        return Err(LoadError::Parse {
            line: line_num,
            message: format!("`{}` is not a binary literal", value),
        });
    }

    let byte = u8::from_str_radix(value, 2).map_err(|_| LoadError::Parse {
        line: line_num,
        message: format!("`{}` does not fit in 8 bits", value),
    })?;

    if program.len() == MEMORY_SIZE {
        return Err(LoadError::TooLarge { size: MEMORY_SIZE + 1 });
    }

    program.push(byte, line_num);
    Ok(())
}

/// Save a program to disk, one byte per line, annotated with its disassembly.
pub fn save_program<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), LoadError> {
    let path = path.as_ref();
    let io_error = |e: std::io::Error| LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut file = std::fs::File::create(path).map_err(io_error)?;
    file.write_all(render_program(bytes).as_bytes()).map_err(io_error)?;
    Ok(())
}

/// Render bytes in program file format.
pub fn render_program(bytes: &[u8]) -> String {
    let mut out = String::from("# LS-8 program\n");

    for (addr, text, size) in disassemble_listing(bytes) {
        for offset in 0..size {
            let i = addr as usize + offset as usize;
            if offset == 0 {
                out.push_str(&format!("{:08b} # {:03}: {}\n", bytes[i], addr, text));
            } else {
                out.push_str(&format!("{:08b}\n", bytes[i]));
            }
        }
    }

    out
}

/// Errors that can occur while loading a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("program is too large ({size} bytes, memory holds {})", MEMORY_SIZE)]
    TooLarge { size: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRINT8: &str = "\
# print8.ls8: Print the number 8 on the screen

10000010 # LDI R0,8
00000000
00001000
01000111 # PRN R0
00000000
00000001 # HLT
";

    #[test]
    fn test_parse_print8() {
        let program = parse_program(PRINT8).unwrap();
        assert_eq!(
            program.bytes,
            vec![0b1000_0010, 0, 8, 0b0100_0111, 0, 1]
        );
        assert_eq!(program.source_lines, vec![3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_whitespace_and_comments() {
        let program = parse_program("  101  \n\t# only a comment\n\n11#x\n").unwrap();
        assert_eq!(program.bytes, vec![5, 3]);
    }

    #[test]
    fn test_leading_zeros() {
        let program = parse_program("000000001\n").unwrap();
        assert_eq!(program.bytes, vec![1]);
    }

    #[test]
    fn test_invalid_digit() {
        assert_eq!(
            parse_program("10000010\n1000002\n"),
            Err(LoadError::Parse {
                line: 2,
                message: "`1000002` is not a binary literal".into(),
            })
        );
    }

    #[test]
    fn test_sign_rejected() {
        assert!(matches!(parse_program("+1\n"), Err(LoadError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_too_wide() {
        assert!(matches!(
            parse_program("100000000\n"),
            Err(LoadError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_too_large() {
        let text = "1\n".repeat(MEMORY_SIZE + 1);
        assert_eq!(parse_program(&text), Err(LoadError::TooLarge { size: 257 }));

        let text = "1\n".repeat(MEMORY_SIZE);
        assert_eq!(parse_program(&text).unwrap().len(), MEMORY_SIZE);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_program("/nonexistent/program.ls8"),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("ls8-save-{}.ls8", std::process::id()));
        let bytes = parse_program(PRINT8).unwrap().bytes;

        save_program(&path, &bytes).unwrap();
        let loaded = load_program(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.bytes, bytes);
    }

    fn run_source(source: &str) -> crate::Cpu {
        let program = parse_program(source).unwrap();
        let mut cpu = crate::Cpu::new();
        cpu.load_program(&program.bytes).unwrap();
        cpu.run().unwrap();
        assert!(cpu.is_halted());
        cpu
    }

    #[test]
    fn test_bundled_programs() {
        let cases: [(&str, &[u8]); 5] = [
            (include_str!("../../programs/print8.ls8"), &[8]),
            (include_str!("../../programs/mult.ls8"), &[72]),
            (include_str!("../../programs/stack.ls8"), &[2, 4, 1]),
            (include_str!("../../programs/call.ls8"), &[20, 30, 36, 60]),
            (include_str!("../../programs/cmp.ls8"), &[1, 2]),
        ];

        for (source, expected) in cases {
            let cpu = run_source(source);
            assert_eq!(cpu.output(), expected);
            assert_eq!(cpu.regs.sp(), crate::cpu::registers::SP_INIT);
        }
    }

    #[test]
    fn test_render_annotates_opcodes() {
        let text = render_program(&[0b1000_0010, 0, 8, 1]);
        assert!(text.contains("10000010 # 000: LDI R0, 8"));
        assert!(text.contains("00000001 # 003: HLT"));
    }
}
