//! Hack Emulator - CLI Entry Point
//!
//! Commands:
//! - `hack-emu run <program>` - Run a `.hack` or `.asm` file
//! - `hack-emu debug <program>` - Interactive debugger
//! - `hack-emu asm <source>` - Assemble to `.hack`
//! - `hack-emu disasm <hack>` - Disassemble `.hack`
//! - `hack-emu test` - Built-in self-test
//!
//! Library logging goes to stderr, filtered by `RUST_LOG` (default `warn`).

use clap::{Parser, Subcommand};
use hack::Word;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hack-emu")]
#[command(version = "0.1.0")]
#[command(about = "A cycle-accurate emulator of the 16-bit Hack computer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it reaches its idle loop
    Run {
        /// Path to the .hack or .asm file to execute
        program: String,
        /// Maximum number of cycles to run
        #[arg(short, long, default_value = "1000000")]
        max_cycles: u64,
        /// Print every executed instruction
        #[arg(short, long)]
        trace: bool,
        /// Key code held on the keyboard for the whole run
        #[arg(short, long, default_value = "0")]
        key: u16,
        /// Print the final machine state as JSON
        #[arg(long)]
        json: bool,
        /// Print the screen as text after the run
        #[arg(long)]
        screen: bool,
    },
    /// Interactive debugger
    Debug {
        /// Path to the .hack or .asm file to debug
        program: String,
    },
    /// Assemble source to .hack
    Asm {
        /// Path to the source file
        source: String,
        /// Output .hack file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Disassemble .hack to readable text
    Disasm {
        /// Path to the .hack file
        hack: String,
    },
    /// Run the built-in self-test
    Test,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { program, max_cycles, trace, key, json, screen }) => {
            run_program(&program, max_cycles, trace, key, json, screen);
        }
        Some(Commands::Debug { program }) => {
            debug_program(&program);
        }
        Some(Commands::Asm { source, output }) => {
            assemble_file(&source, output);
        }
        Some(Commands::Disasm { hack }) => {
            disassemble_file(&hack);
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("Hack Emulator v0.1.0");
            println!("A 16-bit Hack computer emulator");
            println!();
            println!("Use --help for available commands");
        }
    }
}

/// Load a program, assembling it first if it is `.asm` source. Exits on failure.
fn load_program(path: &str, quiet: bool) -> Vec<Word> {
    use hack::{assemble, load_hack};

    let program = if path.ends_with(".asm") {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to read file: {}", e);
                std::process::exit(1);
            }
        };

        match assemble(&source) {
            Ok(program) => {
                if !quiet {
                    println!("📝 Assembled {} instructions", program.len());
                }
                program
            }
            Err(e) => {
                eprintln!("❌ Assembly error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match load_hack(path) {
            Ok(hack) => {
                if !quiet {
                    println!("📂 Loaded {} instructions", hack.len());
                }
                hack.instructions
            }
            Err(e) => {
                eprintln!("❌ Failed to load .hack file: {}", e);
                std::process::exit(1);
            }
        }
    };

    if program.is_empty() {
        eprintln!("❌ No instructions to execute");
        std::process::exit(1);
    }

    program
}

fn run_program(path: &str, max_cycles: u64, trace: bool, key: u16, json: bool, screen: bool) {
    use hack::Computer;
    use hack::asm::disasm::disassemble_instruction;

    if !json {
        println!("🔧 Running: {}", path);
    }

    let program = load_program(path, json);

    let mut computer = match Computer::with_program(&program) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Failed to load program: {}", e);
            std::process::exit(1);
        }
    };
    computer.set_keyboard(Word::new(key));

    if !json {
        println!();
        println!("━━━ Execution ━━━");
    }

    while computer.is_running() && computer.cycles < max_cycles {
        let pc = computer.cpu.pc();
        let instr = computer.rom().read(pc);
        let out = computer.cycle(false);

        if trace && !json {
            let write = if out.write_m {
                format!("  RAM[{}]={}", out.address_m, out.out_m.to_i16())
            } else {
                String::new()
            };
            println!(
                "{:05}: {:<14} A={} D={}{}",
                pc,
                disassemble_instruction(instr),
                computer.cpu.regs.a.out().to_i16(),
                computer.cpu.regs.d.out().to_i16(),
                write
            );
        }
    }

    if json {
        match serde_json::to_string_pretty(&computer.snapshot()) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to serialize state: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        let regs = &computer.cpu.regs;
        println!();
        println!("━━━ Result ━━━");
        println!("Cycles: {}", computer.cycles);
        println!("State: {:?}", computer.state);
        println!("A:  {} ({})", regs.a.out(), regs.a.out().to_i16());
        println!("D:  {} ({})", regs.d.out(), regs.d.out().to_i16());
        println!("PC: {}", regs.pc.out());
        println!("R0..R3: {} {} {} {}",
            computer.read_data(0).to_i16(),
            computer.read_data(1).to_i16(),
            computer.read_data(2).to_i16(),
            computer.read_data(3).to_i16());
    }

    if screen {
        println!();
        print!("{}", computer.render_screen());
    }

    if computer.is_running() && !json {
        println!();
        println!("⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.", max_cycles);
    }
}

#[cfg(feature = "tui")]
fn debug_program(path: &str) {
    use hack::tui::run_debugger;

    println!("🔍 Loading: {}", path);
    let program = load_program(path, false);

    println!("🚀 Launching debugger...");
    println!();

    if let Err(e) = run_debugger(program) {
        eprintln!("❌ Debugger error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn debug_program(_path: &str) {
    eprintln!("❌ Debugger not available: built without the `tui` feature");
    std::process::exit(1);
}

fn assemble_file(source_path: &str, output: Option<String>) {
    use hack::{assemble, save_hack};

    let out_path = output.unwrap_or_else(|| {
        match source_path.strip_suffix(".asm") {
            Some(stem) => format!("{}.hack", stem),
            None => format!("{}.hack", source_path),
        }
    });

    println!("📝 Assembling: {} → {}", source_path, out_path);

    let source = match std::fs::read_to_string(source_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    };

    let program = match assemble(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("❌ Assembly error: {}", e);
            std::process::exit(1);
        }
    };

    println!("✓ Assembled {} instructions", program.len());

    if let Err(e) = save_hack(&out_path, &program) {
        eprintln!("❌ Failed to save .hack file: {}", e);
        std::process::exit(1);
    }

    println!("✓ Saved to {}", out_path);
}

fn disassemble_file(hack_path: &str) {
    use hack::{disassemble, load_hack};

    println!("📖 Disassembling: {}", hack_path);
    println!();

    let hack = match load_hack(hack_path) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("❌ Failed to load .hack file: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", disassemble(&hack.instructions));
}

fn run_self_test() {
    use hack::{assemble, Computer, MemoryBlock};
    use hack::logic::{alu, AluControl};
    use hack::memory::Ram4K;

    println!("━━━ Hack Emulator Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    let mut report = |name: &str, ok: bool, detail: String| {
        print!("{}... ", name);
        if ok {
            println!("✓");
            passed += 1;
        } else {
            println!("✗ {}", detail);
            failed += 1;
        }
    };

    // ALU: x+y wraps
    let out = alu(Word::new(0x7FFF), Word::new(1), AluControl::from_bits(0b000010));
    report("ALU add wraps and flags negative", out.out.bits() == 0x8000 && out.ng && !out.zr,
        format!("(got {:?})", out));

    // ALU: x-y
    let out = alu(Word::from_i16(5), Word::from_i16(9), AluControl::from_bits(0b010011));
    report("ALU subtract", out.out.to_i16() == -4, format!("(got {})", out.out.to_i16()));

    // Memory isolation
    let mut ram = Ram4K::new();
    for address in 0..Ram4K::CAPACITY as u16 {
        ram.tick(address, Word::new(address ^ 0x5555), true);
    }
    let ok = (0..Ram4K::CAPACITY as u16).all(|a| ram.read(a).bits() == a ^ 0x5555);
    report("RAM4K holds every word independently", ok, String::new());

    // Program: multiply
    let source = "@6\nD=A\n@R0\nM=D\n@7\nD=A\n@R1\nM=D\n@R2\nM=0\n\
                  (LOOP)\n@R0\nD=M\n@END\nD;JEQ\n@R1\nD=M\n@R2\nM=D+M\n@R0\nM=M-1\n@LOOP\n0;JMP\n\
                  (END)\n@END\n0;JMP";
    let result = assemble(source)
        .map_err(|e| e.to_string())
        .and_then(|p| Computer::with_program(&p).map_err(|e| e.to_string()))
        .and_then(|mut c| {
            c.run_until_halt(10_000).map_err(|e| e.to_string())?;
            Ok(c.read_data(2).to_i16())
        });
    report("Program: 6 × 7", result == Ok(42), format!("(got {:?})", result));

    // Keyboard is visible at KBD
    let result = assemble("@KBD\nD=M\n@R0\nM=D\n(END)\n@END\n0;JMP")
        .map_err(|e| e.to_string())
        .and_then(|p| Computer::with_program(&p).map_err(|e| e.to_string()))
        .and_then(|mut c| {
            c.set_keyboard(Word::new(65));
            c.run_until_halt(100).map_err(|e| e.to_string())?;
            Ok(c.read_data(0).bits())
        });
    report("Keyboard read through KBD", result == Ok(65), format!("(got {:?})", result));

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
