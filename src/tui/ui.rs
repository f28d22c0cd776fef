//! UI rendering for the debugger.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::memory::{map, MemoryBlock};
use super::app::DebuggerApp;

/// Main draw function.
///
/// ```text
/// ┌ Disassembly ─────┐┌ Screen ─────────┐
/// │                  ││                 │
/// ├ Registers ───────┤├ Memory ─────────┤
/// ├ Status ──────────┤├ Help ───────────┤
/// ```
pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let [left, right] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .areas(frame.area());

    let [code, regs, status] = Layout::vertical([
        Constraint::Min(8),
        Constraint::Length(6),
        Constraint::Length(3),
    ])
    .areas(left);

    let [screen, memory, help] = Layout::vertical([
        Constraint::Length(18),
        Constraint::Min(6),
        Constraint::Length(4),
    ])
    .areas(right);

    draw_disassembly(frame, code, app);
    draw_registers(frame, regs, app);
    frame.render_widget(
        Paragraph::new(app.status.as_str()).block(panel(" Status ", Color::White)),
        status,
    );
    draw_screen(frame, screen, app);
    draw_memory(frame, memory, app);
    draw_help(frame, help);
}

fn panel(title: &str, colour: Color) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colour))
}

fn highlight() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

/// Disassembly around the PC, with breakpoint markers.
fn draw_disassembly(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let items: Vec<ListItem> = app
        .get_disassembly((area.height as usize).saturating_sub(2))
        .into_iter()
        .map(|(addr, text, is_current)| {
            let has_bp = app.breakpoints.contains(&addr);
            let marker = match (is_current, has_bp) {
                (true, true) => "●▶",
                (true, false) => " ▶",
                (false, true) => "● ",
                (false, false) => "  ",
            };
            let style = match (is_current, has_bp) {
                (true, _) => highlight(),
                (false, true) => Style::default().fg(Color::Red),
                (false, false) => Style::default(),
            };
            ListItem::new(format!("{} {:05}: {}", marker, addr, text)).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(panel(" Disassembly ", Color::Cyan)), area);
}

fn draw_registers(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let regs = &app.computer.cpu.regs;
    let value = |name: &'static str, word: crate::Word| {
        Line::from(vec![
            Span::raw(name),
            Span::styled(word.to_string(), Style::default().fg(Color::White)),
            Span::raw(format!(" = {}", word.to_i16())),
        ])
    };

    let state_style = if app.computer.is_running() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };

    let content = vec![
        value("A:  ", regs.a.out()),
        value("D:  ", regs.d.out()),
        Line::from(vec![
            Span::raw("PC: "),
            Span::styled(regs.pc.out().to_string(), highlight()),
            Span::raw("   KBD: "),
            Span::styled(app.computer.keyboard().bits().to_string(), Style::default().fg(Color::Cyan)),
            Span::raw("   Cycles: "),
            Span::styled(app.computer.cycles.to_string(), Style::default().fg(Color::Cyan)),
            Span::raw("   "),
            Span::styled(format!("{:?}", app.computer.state), state_style),
        ]),
    ];

    frame.render_widget(Paragraph::new(content).block(panel(" Registers ", Color::Green)), area);
}

/// Scaled-down view of the 512x256 screen: a cell is lit if any pixel it
/// covers is black.
fn draw_screen(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let cols = usize::from(area.width.saturating_sub(2)).max(1);
    let rows = usize::from(area.height.saturating_sub(2)).max(1);
    let words_per_row = map::SCREEN_WIDTH / 16;
    let cell_w = map::SCREEN_WIDTH.div_ceil(cols);
    let cell_h = map::SCREEN_HEIGHT.div_ceil(rows);

    let pixel = |x: usize, y: usize| {
        app.computer
            .screen_word(y * words_per_row + x / 16)
            .is_some_and(|word| word.bit(x % 16))
    };

    let lines: Vec<Line> = (0..rows)
        .map(|r| {
            let text: String = (0..cols)
                .map(|c| {
                    let lit = (r * cell_h..((r + 1) * cell_h).min(map::SCREEN_HEIGHT)).any(|y| {
                        (c * cell_w..((c + 1) * cell_w).min(map::SCREEN_WIDTH)).any(|x| pixel(x, y))
                    });
                    if lit { '█' } else { ' ' }
                })
                .collect();
            Line::from(text)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(panel(" Screen ", Color::Blue)), area);
}

/// RAM words from the scroll position; the word A points at is highlighted.
fn draw_memory(frame: &mut Frame, area: Rect, app: &DebuggerApp) {
    let rows = (area.height as usize).saturating_sub(2);
    let a = usize::from(app.computer.cpu.address());

    let items: Vec<ListItem> = app
        .computer
        .ram
        .dump(app.mem_scroll, rows)
        .into_iter()
        .map(|(addr, word)| {
            let style = if addr == a {
                highlight()
            } else if word.is_zero() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!("{:05}: {} = {}", addr, word, word.to_i16())).style(style)
        })
        .collect();

    let title = if app.mem_scroll >= usize::from(map::SCREEN) { " RAM (screen) " } else { " RAM " };
    frame.render_widget(List::new(items).block(panel(title, Color::Magenta)), area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s step  r run  p pause  b breakpoint  x reset  X power  q quit"),
        Line::from("k/0 press/release key  ↑↓ PgUp PgDn Home End scroll RAM"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(panel(" Help ", Color::DarkGray));

    frame.render_widget(help, area);
}
