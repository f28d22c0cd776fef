//! TUI debugger for the Hack emulator.
//!
//! Provides an interactive terminal-based debugger with:
//! - A, D, PC and keyboard register view
//! - RAM view, including the screen region
//! - Step/run/breakpoint controls
//! - Disassembly around the PC

mod app;
mod ui;

pub use app::{DebuggerApp, run_debugger};
