//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::cpu::registers::Reg;
use crate::CpuState;
use super::app::{DebuggerApp, BYTES_PER_ROW};

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(55),
            Constraint::Percentage(45),
        ])
        .split(frame.area());

    // Left side: code, registers and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(7),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_disassembly(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_status(frame, left_chunks[2], app);

    // Right side: memory, output and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(4),
        ])
        .split(chunks[1]);

    draw_memory(frame, right_chunks[0], app);
    draw_output(frame, right_chunks[1], app);
    draw_help(frame, right_chunks[2]);
}

/// Draw disassembly starting at PC.
fn draw_disassembly(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let disasm = app.get_disassembly((area.height as usize).saturating_sub(2));

    let items: Vec<ListItem> = disasm
        .iter()
        .map(|(addr, instr, is_current)| {
            let prefix = if *is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(addr) { "●" } else { " " };
            let text = format!("{}{:03}: {}", prefix, addr, instr);

            let style = if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(addr) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(format!("{} {}", bp, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Disassembly ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

/// Draw register file, flags and machine state.
fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = &app.cpu.regs;

    let mut gpr_lines = Vec::new();
    for row in 0..2u8 {
        let spans: Vec<Span> = (row * 4..row * 4 + 4)
            .filter_map(Reg::new)
            .map(|reg| {
                Span::styled(
                    format!("{}={:02X} ({:>3})  ", reg, regs.get(reg), regs.get(reg)),
                    Style::default().fg(Color::White),
                )
            })
            .collect();
        gpr_lines.push(Line::from(spans));
    }

    let mut content = gpr_lines;
    content.push(Line::from(vec![
        Span::raw("PC: "),
        Span::styled(format!("{:03}", regs.pc), Style::default().fg(Color::Yellow)),
        Span::raw("   SP: "),
        Span::styled(format!("{:02X}", regs.sp()), Style::default().fg(Color::Magenta)),
        Span::raw("   "),
        Span::styled(format!("{:?}", regs.fl), Style::default().fg(Color::Cyan)),
    ]));
    content.push(Line::from(vec![
        Span::raw("Cycles: "),
        Span::styled(format!("{}", app.cpu.cycles), Style::default().fg(Color::Cyan)),
        Span::raw("   State: "),
        Span::styled(format!("{:?}", app.cpu.state), state_style(app.cpu.state)),
    ]));

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw memory view, eight bytes per row.
fn draw_memory(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    let start = app.mem_scroll;
    let end = (start + visible_rows).min(256 / BYTES_PER_ROW);
    let pc = app.cpu.regs.pc as usize;
    let sp = app.cpu.regs.sp() as usize;

    let items: Vec<ListItem> = (start..end)
        .map(|row| {
            let base = row * BYTES_PER_ROW;
            let mut spans = vec![Span::raw(format!("{:02X}: ", base))];

            for addr in base..base + BYTES_PER_ROW {
                let value = app.cpu.mem.read(addr as u8);
                let style = if addr == pc {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else if addr == sp {
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
                } else if value != 0 {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                spans.push(Span::styled(format!("{:02X} ", value), style));
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" Memory ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
}

/// Draw values printed by PRN, most recent last.
fn draw_output(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let visible = (area.height as usize).saturating_sub(2);
    let output = app.cpu.output();
    let lines: Vec<Line> = output[output.len().saturating_sub(visible)..]
        .iter()
        .map(|v| Line::from(v.to_string()))
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(Block::default()
            .title(" Output ")
            .borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint"),
        Line::from("x: Reset  ↑↓: Scroll memory  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}

fn state_style(state: CpuState) -> Style {
    match state {
        CpuState::Constructed | CpuState::Running => Style::default().fg(Color::Green),
        CpuState::Halted => Style::default().fg(Color::Yellow),
        CpuState::Faulted => Style::default().fg(Color::Red),
    }
}
