//! WebAssembly bindings for the Hack emulator.
//!
//! This module provides JavaScript-friendly wrappers around the core emulator.

use wasm_bindgen::prelude::*;
use crate::{Computer, Word};
use crate::asm::assembler::assemble;
use crate::asm::disasm::disassemble_instruction;
use crate::asm::hackfile::parse_hack;
use crate::memory::MemoryBlock;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly computer wrapper.
#[wasm_bindgen]
pub struct WasmComputer {
    computer: Computer,
}

#[wasm_bindgen]
impl WasmComputer {
    /// Create a new computer with an empty ROM.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            computer: Computer::new(),
        }
    }

    /// Load a program from assembly source code.
    #[wasm_bindgen]
    pub fn load_asm(&mut self, source: &str) -> Result<usize, JsError> {
        let program = assemble(source)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.load(&program)
    }

    /// Load a program from `.hack` text.
    #[wasm_bindgen]
    pub fn load_hack(&mut self, text: &str) -> Result<usize, JsError> {
        let hack = parse_hack(text)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.load(&hack.instructions)
    }

    /// Run one cycle. Returns the disassembled instruction that executed.
    #[wasm_bindgen]
    pub fn step(&mut self) -> String {
        let pc = self.computer.cpu.pc();
        let instr = self.computer.rom().read(pc);
        self.computer.cycle(false);
        disassemble_instruction(instr)
    }

    /// Run until halt or max cycles. Returns the total cycle count.
    #[wasm_bindgen]
    pub fn run(&mut self, max_cycles: u32) -> u64 {
        self.computer.run_limited(u64::from(max_cycles));
        self.computer.cycles
    }

    /// Assert reset: the program restarts, RAM is kept.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.computer.reset();
    }

    /// Clear registers and RAM, keeping the program.
    #[wasm_bindgen]
    pub fn power_on(&mut self) {
        self.computer.power_on();
    }

    /// Hold a key down (0 releases it).
    #[wasm_bindgen]
    pub fn set_keyboard(&mut self, key: u16) {
        self.computer.set_keyboard(Word::new(key));
    }

    /// Check if the program is running.
    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.computer.is_running()
    }

    /// Check if the program reached its idle loop.
    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.computer.is_halted()
    }

    /// Get cycle count.
    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.computer.cycles
    }

    /// Get program counter.
    #[wasm_bindgen]
    pub fn pc(&self) -> u16 {
        self.computer.cpu.pc()
    }

    /// Get the A register as a signed value.
    #[wasm_bindgen]
    pub fn a(&self) -> i16 {
        self.computer.cpu.regs.a.out().to_i16()
    }

    /// Get the D register as a signed value.
    #[wasm_bindgen]
    pub fn d(&self) -> i16 {
        self.computer.cpu.regs.d.out().to_i16()
    }

    /// Get state as string.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        format!("{:?}", self.computer.state)
    }

    /// Get a RAM word as a signed value. Out-of-range addresses read 0.
    #[wasm_bindgen]
    pub fn memory_at(&self, address: usize) -> i16 {
        self.computer
            .ram
            .peek(address)
            .map(Word::to_i16)
            .unwrap_or(0)
    }

    /// Get the screen region as raw words, 32 per pixel row.
    #[wasm_bindgen]
    pub fn screen(&self) -> js_sys::Uint16Array {
        let words: Vec<u16> = self.computer.screen().into_iter().map(Word::bits).collect();
        js_sys::Uint16Array::from(&words[..])
    }

    /// Get registers and non-zero RAM as a JSON string.
    #[wasm_bindgen]
    pub fn snapshot_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.computer.snapshot())
            .map_err(|e| JsError::new(&format!("{}", e)))
    }
}

impl WasmComputer {
    fn load(&mut self, program: &[Word]) -> Result<usize, JsError> {
        self.computer = Computer::with_program(program)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        Ok(program.len())
    }
}

impl Default for WasmComputer {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble source code and return the program as `.hack` text.
#[wasm_bindgen]
pub fn wasm_assemble(source: &str) -> Result<String, JsError> {
    let program = assemble(source)
        .map_err(|e| JsError::new(&format!("{}", e)))?;
    Ok(crate::asm::hackfile::to_hack_text(&program))
}

/// Disassemble a single 16-bit word.
#[wasm_bindgen]
pub fn wasm_disassemble(value: u16) -> String {
    disassemble_instruction(Word::new(value))
}
