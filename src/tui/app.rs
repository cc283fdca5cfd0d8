//! Debugger application state and logic.

use crate::{Cpu, CpuConfig};
use crate::asm::disasm::{disassemble_at, format_instruction};
use crate::cpu::decode::Instruction;
use std::collections::HashSet;

/// Memory rows shown per screen line.
pub const BYTES_PER_ROW: usize = 8;

/// Debugger application state.
pub struct DebuggerApp {
    /// The CPU being debugged.
    pub cpu: Cpu,
    /// Program bytes, reloaded on reset.
    pub program: Vec<u8>,
    /// Breakpoints (by address).
    pub breakpoints: HashSet<u8>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Memory view scroll offset, in rows.
    pub mem_scroll: usize,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    pub fn new(program: Vec<u8>, config: CpuConfig) -> Self {
        let mut cpu = Cpu::with_config(config);
        let status = match cpu.load_program(&program) {
            Ok(()) => "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            Err(e) => format!("Load failed: {}", e),
        };

        Self {
            cpu,
            program,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status,
            mem_scroll: 0,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if !self.cpu.is_running() {
            self.status = format!("CPU stopped: {:?}", self.cpu.state);
            self.running = false;
            return;
        }

        let pc = self.cpu.regs.pc;
        match self.cpu.step() {
            Ok(instr) => {
                self.status = format!("PC={:03}: {}", pc, format_instruction(&instr));
                if let Instruction::Hlt = instr {
                    self.running = false;
                }
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
            }
        }
    }

    /// Run until halt, breakpoint, or error.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();

        // Leave a breakpoint we are already sitting on
        if self.breakpoints.contains(&self.cpu.regs.pc) {
            self.step();
        }
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if !self.cpu.is_running() {
            self.running = false;
            self.status = format!("Stopped after {} cycles", self.cpu.cycles);
            return;
        }

        let pc = self.cpu.regs.pc;
        if self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at PC={:03}", pc);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.cpu.regs.pc;
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={:03}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={:03}", pc);
        }
    }

    /// Reset CPU to initial state.
    pub fn reset(&mut self) {
        self.cpu.reset();
        let _ = self.cpu.load_program(&self.program);
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Scroll the memory view.
    pub fn scroll(&mut self, delta: isize) {
        let max = 256 / BYTES_PER_ROW - 1;
        self.mem_scroll = self.mem_scroll.saturating_add_signed(delta).min(max);
    }

    /// Disassembly from the current PC onward.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(u8, String, bool)> {
        let pc = self.cpu.regs.pc;
        let mut addr = pc;
        let mut out = Vec::with_capacity(lines);

        for _ in 0..lines {
            let (text, size) = disassemble_at(&self.cpu.mem, addr);
            out.push((addr, text, addr == pc));
            addr = addr.wrapping_add(size);
            if addr == pc {
                break;
            }
        }

        out
    }
}

/// Run the debugger with a program.
pub fn run_debugger(program: Vec<u8>, config: CpuConfig) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(program, config);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => app.scroll(-1),
                        KeyCode::Down => app.scroll(1),
                        _ => {}
                    }
                }
            }
        }

        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
