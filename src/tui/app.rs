//! Debugger application state and logic.

use crate::{Computer, Word};
use crate::asm::disasm::disassemble_instruction;
use crate::memory::map;
use std::collections::HashSet;

/// Cycles executed per UI tick while running.
const CYCLES_PER_TICK: u32 = 500;

/// Debugger application state.
pub struct DebuggerApp {
    /// The computer being debugged.
    pub computer: Computer,
    /// Original program for reference.
    pub program: Vec<Word>,
    /// Breakpoints (by ROM address).
    pub breakpoints: HashSet<u16>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// First RAM address shown in the memory view.
    pub mem_scroll: usize,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    pub fn new(program: Vec<Word>) -> Result<Self, crate::ComputerError> {
        let computer = Computer::with_program(&program)?;

        Ok(Self {
            computer,
            program,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            mem_scroll: 0,
        })
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        let pc = self.computer.cpu.pc();
        let instr = self.computer.rom().read(pc);
        let out = self.computer.cycle(false);

        self.status = format!("PC={:05}: {}", pc, disassemble_instruction(instr));
        if out.write_m {
            self.status.push_str(&format!("  RAM[{}]={}", out.address_m, out.out_m.to_i16()));
        }
    }

    /// Run until halt or breakpoint.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
    }

    /// Run one batch of continuous execution.
    pub fn tick(&mut self) {
        for _ in 0..CYCLES_PER_TICK {
            if !self.running {
                return;
            }

            if self.computer.is_halted() {
                self.running = false;
                self.status = format!("Halted after {} cycles", self.computer.cycles);
                return;
            }

            let pc = self.computer.cpu.pc();
            if self.breakpoints.contains(&pc) {
                self.running = false;
                self.status = format!("Breakpoint at PC={}", pc);
                return;
            }

            self.computer.cycle(false);
        }
    }

    /// Toggle breakpoint at current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.computer.cpu.pc();
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={}", pc);
        }
    }

    /// Hold a key down, or release it with `None`.
    pub fn set_key(&mut self, key: Option<char>) {
        let code = key.map_or(0, |c| c as u16);
        self.computer.set_keyboard(Word::new(code));
        self.status = format!("KBD={}", code);
    }

    /// Assert the reset line: the program restarts, data is kept.
    pub fn reset(&mut self) {
        self.computer.reset();
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Power-cycle the machine: registers and RAM cleared.
    pub fn power_on(&mut self) {
        self.computer.power_on();
        self.running = false;
        self.status = "Powered on. Ready.".into();
    }

    /// Scroll the memory view by `delta` words.
    pub fn scroll_memory(&mut self, delta: isize) {
        let max = usize::from(map::KBD);
        self.mem_scroll = self.mem_scroll.saturating_add_signed(delta).min(max);
    }

    /// Apply one key press.
    pub fn handle_key(&mut self, code: crossterm::event::KeyCode) {
        use crossterm::event::KeyCode;

        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('s') => {
                self.running = false;
                self.step();
            }
            KeyCode::Char('r') => self.run(),
            KeyCode::Char('p') => {
                self.running = false;
                self.status = "Paused.".into();
            }
            KeyCode::Char('b') => self.toggle_breakpoint(),
            KeyCode::Char('x') => self.reset(),
            KeyCode::Char('X') => self.power_on(),
            KeyCode::Char('k') => self.set_key(Some('K')),
            KeyCode::Char('0') => self.set_key(None),
            KeyCode::Up => self.scroll_memory(-1),
            KeyCode::Down => self.scroll_memory(1),
            KeyCode::PageUp => self.scroll_memory(-64),
            KeyCode::PageDown => self.scroll_memory(64),
            KeyCode::Home => self.mem_scroll = 0,
            KeyCode::End => self.mem_scroll = usize::from(map::SCREEN),
            _ => {}
        }
    }

    /// Get disassembly around current PC.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(u16, String, bool)> {
        let pc = self.computer.cpu.pc();
        let start = pc.saturating_sub((lines / 2) as u16);

        (0..lines as u16)
            .map(|i| start.saturating_add(i))
            .filter(|&addr| usize::from(addr) < self.program.len())
            .map(|addr| {
                let disasm = disassemble_instruction(self.computer.rom().read(addr));
                (addr, disasm, addr == pc)
            })
            .collect()
    }
}

/// Run the debugger with a program.
pub fn run_debugger(program: Vec<Word>) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    let mut app = DebuggerApp::new(program)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    while !app.should_quit {
        terminal.draw(|frame| super::ui::draw(frame, &app))?;

        if event::poll(Duration::from_millis(30))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }

        if app.running {
            app.tick();
        }
    }

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble;

    fn app(source: &str) -> DebuggerApp {
        DebuggerApp::new(assemble(source).unwrap()).unwrap()
    }

    #[test]
    fn test_breakpoint_stops_run() {
        let mut app = app("@1\nD=A\n@2\nD=D+A\n(END)\n@END\n0;JMP");
        app.breakpoints.insert(2);
        app.run();
        app.tick();
        assert!(!app.running);
        assert_eq!(app.computer.cpu.pc(), 2);
        assert_eq!(app.computer.cpu.regs.d.out().bits(), 1);
    }

    #[test]
    fn test_run_until_halt() {
        let mut app = app("@1\nD=A\n(END)\n@END\n0;JMP");
        app.run();
        app.tick();
        assert!(!app.running);
        assert!(app.computer.is_halted());
        assert!(app.status.starts_with("Halted"));
    }

    #[test]
    fn test_disassembly_window() {
        let app = app("@1\nD=A\n@2");
        let lines = app.get_disassembly(10);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], (0, "@1".to_string(), true));
        assert_eq!(lines[1].1, "D=A");
    }

    #[test]
    fn test_keys_drive_the_machine() {
        use crossterm::event::KeyCode;

        let mut app = app("@KBD\nD=M\n(END)\n@END\n0;JMP");
        app.handle_key(KeyCode::Char('k'));
        app.handle_key(KeyCode::Char('s'));
        app.handle_key(KeyCode::Char('s'));
        assert_eq!(app.computer.cpu.regs.d.out().bits(), u16::from(b'K'));

        app.handle_key(KeyCode::Char('x'));
        assert_eq!(app.computer.cpu.pc(), 0);

        app.handle_key(KeyCode::End);
        assert_eq!(app.mem_scroll, 0x4000);
        app.handle_key(KeyCode::PageDown);
        assert_eq!(app.mem_scroll, 0x4040);

        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_step_reports_write() {
        let mut app = app("@5\nM=-1");
        app.step();
        app.step();
        assert!(app.status.contains("RAM[5]=-1"));
    }
}
