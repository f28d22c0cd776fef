//! The complete Hack computer: CPU, instruction ROM, data RAM and keyboard.
//!
//! [`Computer::cycle`] is the clock. It fetches, settles the CPU's
//! combinational signals, and only then applies one edge to RAM and the
//! CPU registers together.

use crate::cpu::{Cpu, CpuInput, CpuOutput, Instruction};
use crate::cpu::decode::decode;
use crate::logic::{Address, Word};
use crate::memory::{map, MemoryBlock, MemoryError, Ram32K, Rom};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Whether the program is still doing work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// The program is executing normally.
    Running,
    /// The PC reached a terminal idle loop: `(END) @END 0;JMP`.
    Halted,
}

/// The Hack computer.
pub struct Computer {
    /// The CPU.
    pub cpu: Cpu,
    /// Data memory, including the screen region.
    pub ram: Ram32K,
    /// Instruction memory.
    rom: Rom,
    /// Key code currently held down (0 when none).
    keyboard: Word,
    /// Current run state.
    pub state: RunState,
    /// Cycles executed since the last reset.
    pub cycles: u64,
}

impl Computer {
    /// Create a computer with an empty ROM and zeroed RAM.
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            ram: Ram32K::new(),
            rom: Rom::new(),
            keyboard: Word::zero(),
            state: RunState::Running,
            cycles: 0,
        }
    }

    /// Create a computer with a program burned into ROM.
    pub fn with_program(program: &[Word]) -> Result<Self, ComputerError> {
        let mut computer = Self::new();
        computer.load_program(program)?;
        Ok(computer)
    }

    /// Burn a program into ROM and restart execution from address 0.
    pub fn load_program(&mut self, program: &[Word]) -> Result<(), ComputerError> {
        self.rom = Rom::from_program(program)?;
        self.cpu.regs.pc.jump(0);
        self.state = RunState::Running;
        self.cycles = 0;
        tracing::debug!(words = program.len(), "program loaded");
        Ok(())
    }

    /// Restart the program: the PC goes to 0 and A, D and RAM are kept.
    pub fn reset(&mut self) {
        self.cpu.regs.pc.jump(0);
        self.state = RunState::Running;
        tracing::debug!(cycles = self.cycles, "reset");
    }

    /// Return the machine to its power-on state. The ROM is kept.
    pub fn power_on(&mut self) {
        self.cpu = Cpu::new();
        self.ram = Ram32K::new();
        self.keyboard = Word::zero();
        self.state = RunState::Running;
        self.cycles = 0;
    }

    /// Run one clock cycle. `reset` forces the next PC to 0 and nothing else.
    pub fn cycle(&mut self, reset: bool) -> CpuOutput {
        let pc = self.cpu.pc();
        let input = CpuInput {
            instruction: self.rom.read(pc),
            in_m: self.read_data(self.cpu.address()),
            reset,
        };

        let signals = self.cpu.evaluate(&input);

        // One edge for everything clocked.
        self.ram.tick(signals.address_m, signals.alu.out, signals.write_m);
        self.cpu.commit(&signals);

        self.cycles += 1;

        tracing::trace!(
            cycle = self.cycles,
            pc,
            instruction = ?signals.instruction,
            a = self.cpu.regs.a.out().to_i16(),
            d = self.cpu.regs.d.out().to_i16(),
            write_m = signals.write_m,
            "cycle"
        );

        if reset {
            self.state = RunState::Running;
        } else if self.state == RunState::Running && self.at_idle_loop() {
            self.state = RunState::Halted;
            tracing::debug!(cycles = self.cycles, pc = self.cpu.pc(), "reached idle loop");
        }

        signals.output()
    }

    /// Run for at most `max_cycles` cycles, stopping early on halt.
    ///
    /// Returns the number of cycles executed.
    pub fn run_limited(&mut self, max_cycles: u64) -> u64 {
        let start_cycles = self.cycles;
        let limit = self.cycles.saturating_add(max_cycles);

        while self.state == RunState::Running && self.cycles < limit {
            self.cycle(false);
        }

        self.cycles - start_cycles
    }

    /// Run until halt, failing if `max_cycles` pass first.
    pub fn run_until_halt(&mut self, max_cycles: u64) -> Result<u64, ComputerError> {
        let executed = self.run_limited(max_cycles);
        if self.state != RunState::Halted {
            return Err(ComputerError::CycleLimit { limit: max_cycles });
        }
        Ok(executed)
    }

    /// The data memory word the CPU sees at `address`.
    ///
    /// The keyboard word is driven by the keyboard rather than stored in RAM.
    pub fn read_data(&self, address: Address) -> Word {
        if address == map::KBD {
            self.keyboard
        } else {
            self.ram.read(address)
        }
    }

    /// Host-side RAM write, committed immediately (for test setup and debuggers).
    pub fn poke(&mut self, address: usize, value: Word) -> Result<(), ComputerError> {
        self.ram.poke(address, value)?;
        Ok(())
    }

    /// Hold a key down. Pass zero to release.
    pub fn set_keyboard(&mut self, key: Word) {
        self.keyboard = key;
    }

    /// The key code currently held.
    pub fn keyboard(&self) -> Word {
        self.keyboard
    }

    /// One 16-pixel word of the screen region, or `None` past its end.
    pub fn screen_word(&self, index: usize) -> Option<Word> {
        (index < map::SCREEN_WORDS).then(|| self.ram.read(map::SCREEN + index as Address))
    }

    /// The whole screen region, row-major, 32 words per row.
    pub fn screen(&self) -> Vec<Word> {
        self.ram
            .dump(usize::from(map::SCREEN), map::SCREEN_WORDS)
            .into_iter()
            .map(|(_, word)| word)
            .collect()
    }

    /// Render the screen as text, one line per pixel row: `#` black, `.` white.
    ///
    /// Bit 0 of each word is the leftmost of its 16 pixels.
    pub fn render_screen(&self) -> String {
        let words_per_row = map::SCREEN_WIDTH / 16;
        let mut out = String::with_capacity((map::SCREEN_WIDTH + 1) * map::SCREEN_HEIGHT);

        for row in self.screen().chunks(words_per_row) {
            for word in row {
                for bit in 0..16 {
                    out.push(if word.bit(bit) { '#' } else { '.' });
                }
            }
            out.push('\n');
        }

        out
    }

    /// The loaded ROM.
    pub fn rom(&self) -> &Rom {
        &self.rom
    }

    /// Check if the program reached its terminal idle loop.
    pub fn is_halted(&self) -> bool {
        self.state == RunState::Halted
    }

    /// Check if the program is still running.
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// A serializable summary of the machine.
    pub fn snapshot(&self) -> MachineState {
        let ram = self
            .ram
            .dump(0, Ram32K::CAPACITY)
            .into_iter()
            .filter(|(_, word)| !word.is_zero())
            .map(|(address, word)| (address, word.to_i16()))
            .collect();

        MachineState {
            a: self.cpu.regs.a.out().to_i16(),
            d: self.cpu.regs.d.out().to_i16(),
            pc: self.cpu.pc(),
            cycles: self.cycles,
            state: self.state,
            ram,
        }
    }

    /// True when the PC sits on `@p` at address `p` followed by an
    /// unconditional jump that stores nothing.
    fn at_idle_loop(&self) -> bool {
        let pc = self.cpu.pc();
        if decode(self.rom.read(pc)) != Instruction::Address(pc) {
            return false;
        }

        match decode(self.rom.read(pc.wrapping_add(1))) {
            Instruction::Compute { dest, jump, .. } => jump.is_unconditional() && dest.is_empty(),
            Instruction::Address(_) => false,
        }
    }
}

impl Default for Computer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Computer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computer")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("regs", &self.cpu.regs)
            .field("rom", &self.rom)
            .finish()
    }
}

/// Serializable machine summary: registers plus every non-zero RAM word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    pub a: i16,
    pub d: i16,
    pub pc: Address,
    pub cycles: u64,
    pub state: RunState,
    /// (address, value) for every non-zero word.
    pub ram: Vec<(usize, i16)>,
}

/// Errors that can occur while driving the computer.
#[derive(Debug, Clone, Error)]
pub enum ComputerError {
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("program did not halt within {limit} cycles")]
    CycleLimit { limit: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::assemble;

    fn computer(source: &str) -> Computer {
        Computer::with_program(&assemble(source).unwrap()).unwrap()
    }

    #[test]
    fn test_add_program() {
        let mut c = computer(
            "
            @2
            D=A
            @3
            D=D+A
            @0
            M=D
            (END)
            @END
            0;JMP
            ",
        );

        c.run_until_halt(100).unwrap();
        assert_eq!(c.ram.read(0).bits(), 5);
        assert!(c.is_halted());
    }

    #[test]
    fn test_memory_write_uses_address_before_edge() {
        // AM=M+1 writes to the old A, then A takes the new value.
        let mut c = computer(
            "
            @7
            AM=M+1
            ",
        );
        c.poke(7, Word::new(40)).unwrap();
        c.cycle(false);
        let out = c.cycle(false);

        assert_eq!(out.address_m, 7);
        assert_eq!(c.ram.read(7).bits(), 41);
        assert_eq!(c.cpu.regs.a.out().bits(), 41);
        assert_eq!(c.ram.read(41), Word::zero());
    }

    #[test]
    fn test_keyboard_is_read_through_kbd() {
        let mut c = computer(
            "
            @KBD
            D=M
            ",
        );
        c.set_keyboard(Word::new(75));
        c.run_limited(2);
        assert_eq!(c.cpu.regs.d.out().bits(), 75);
    }

    #[test]
    fn test_reset_cycle_restarts_without_clearing() {
        let mut c = computer(
            "
            @9
            D=A
            M=D
            D;JGT
            ",
        );
        c.poke(100, Word::from_i16(-3)).unwrap();
        c.run_limited(3);
        assert_eq!(c.cpu.pc(), 3);

        // The jump would be taken; reset wins and nothing else changes.
        let out = c.cycle(true);
        assert_eq!(out.pc, 0);
        assert!(!out.write_m);
        assert_eq!(c.cpu.regs.a.out().bits(), 9);
        assert_eq!(c.cpu.regs.d.out().bits(), 9);
        assert_eq!(c.ram.read(9).bits(), 9);
        assert_eq!(c.ram.read(100).to_i16(), -3);
        assert!(c.is_running());
    }

    #[test]
    fn test_loop_that_stores_is_not_halted() {
        let mut c = computer(
            "
            @0
            D=A
            (END)
            @END
            MD=M+1;JMP
            ",
        );
        let err = c.run_until_halt(100).unwrap_err();
        assert!(matches!(err, ComputerError::CycleLimit { limit: 100 }));
        assert!(c.is_running());
        assert_eq!(c.ram.read(2).bits(), 49);
        assert_eq!(c.cpu.regs.d.out().bits(), 49);
    }

    #[test]
    fn test_run_until_halt_reports_limit() {
        let mut c = computer(
            "
            (LOOP)
            @LOOP
            D;JEQ
            @LOOP
            0;JMP
            ",
        );
        // D is zero: the first jump is taken, but the pattern isn't terminal
        // because it is conditional.
        let err = c.run_until_halt(50).unwrap_err();
        assert!(matches!(err, ComputerError::CycleLimit { limit: 50 }));
    }

    #[test]
    fn test_screen_render() {
        let mut c = Computer::new();
        c.poke(usize::from(map::SCREEN), Word::new(0b101)).unwrap();
        assert_eq!(c.screen_word(0), Some(Word::new(0b101)));
        assert_eq!(c.screen_word(map::SCREEN_WORDS), None);
        assert_eq!(c.screen().len(), map::SCREEN_WORDS);

        let rendered = c.render_screen();
        let first_row = rendered.lines().next().unwrap();
        assert_eq!(first_row.len(), map::SCREEN_WIDTH);
        assert!(first_row.starts_with("#.#..."));
        assert_eq!(rendered.lines().count(), map::SCREEN_HEIGHT);
    }

    #[test]
    fn test_reset_keeps_data() {
        let mut c = computer(
            "
            @5
            D=A
            @0
            M=D
            (END)
            @END
            0;JMP
            ",
        );
        c.run_until_halt(20).unwrap();
        c.reset();
        assert_eq!(c.cpu.pc(), 0);
        assert!(c.is_running());
        assert_eq!(c.ram.read(0).bits(), 5);

        c.power_on();
        assert_eq!(c.ram.read(0), Word::zero());
        assert_eq!(c.cycles, 0);
    }

    #[test]
    fn test_snapshot_lists_non_zero_ram() {
        let mut c = Computer::new();
        c.poke(3, Word::from_i16(-2)).unwrap();
        let snap = c.snapshot();
        assert_eq!(snap.ram, vec![(3, -2)]);
        assert_eq!(snap.state, RunState::Running);
    }
}
