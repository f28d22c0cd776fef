//! `.hack` file format for Hack programs.
//!
//! A simple text format:
//! - One instruction per line, as 16 binary digits
//! - Lines starting with `//` are comments, and trailing `//` comments are allowed
//! - Blank lines are ignored

use crate::logic::Word;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// A loaded `.hack` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HackFile {
    /// The program instructions.
    pub instructions: Vec<Word>,
    /// Source line number of each instruction (for error reporting and debugging).
    pub source_lines: Vec<usize>,
}

impl HackFile {
    /// Create a new empty file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instruction.
    pub fn push(&mut self, instr: Word, line: usize) {
        self.instructions.push(instr);
        self.source_lines.push(line);
    }

    /// Get the number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Parse `.hack` text.
pub fn parse_hack(text: &str) -> Result<HackFile, HackFileError> {
    let mut hack = HackFile::new();

    for (line_num, line) in text.lines().enumerate() {
        let code = match line.find("//") {
            Some(idx) => &line[..idx],
            None => line,
        };
        let trimmed = code.trim();

        if trimmed.is_empty() {
            continue;
        }

        let instr = Word::parse(trimmed).map_err(|e| HackFileError::ParseError {
            line: line_num + 1,
            message: e.to_string(),
        })?;

        hack.push(instr, line_num + 1);
    }

    Ok(hack)
}

/// Load a `.hack` file from disk.
pub fn load_hack<P: AsRef<Path>>(path: P) -> Result<HackFile, HackFileError> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| HackFileError::IoError(e.to_string()))?;
    let hack = parse_hack(&text)?;
    tracing::debug!(path = %path.as_ref().display(), words = hack.len(), "loaded .hack file");
    Ok(hack)
}

/// Render a program in `.hack` format: exactly one word per line, no comments.
pub fn to_hack_text(program: &[Word]) -> String {
    let mut text = String::with_capacity(program.len() * 17);
    for word in program {
        text.push_str(&word.to_string());
        text.push('\n');
    }
    text
}

/// Save a program to disk in `.hack` format.
pub fn save_hack<P: AsRef<Path>>(path: P, program: &[Word]) -> Result<(), HackFileError> {
    let mut file = std::fs::File::create(path.as_ref())
        .map_err(|e| HackFileError::IoError(e.to_string()))?;

    file.write_all(to_hack_text(program).as_bytes())
        .map_err(|e| HackFileError::IoError(e.to_string()))?;

    Ok(())
}

/// Errors that can occur during `.hack` file operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HackFileError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hack() {
        let text = "// header\n0000000000000010\n\n1110110000010000 // D=A\n";
        let hack = parse_hack(text).unwrap();
        assert_eq!(hack.instructions, vec![Word::new(2), Word::new(0xEC10)]);
        assert_eq!(hack.source_lines, vec![2, 4]);
    }

    #[test]
    fn test_parse_errors_name_the_line() {
        let err = parse_hack("0000000000000000\n00000000000000002\n").unwrap_err();
        assert!(matches!(err, HackFileError::ParseError { line: 2, .. }));

        let err = parse_hack("000000000000000x").unwrap_err();
        assert!(matches!(err, HackFileError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_text_format() {
        let text = to_hack_text(&[Word::new(2), Word::new(0xFFFF)]);
        assert_eq!(text, "0000000000000010\n1111111111111111\n");
        assert_eq!(parse_hack(&text).unwrap().len(), 2);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("hack-emu-test-{}.hack", std::process::id()));
        let program = [Word::new(7), Word::new(0xE308)];
        save_hack(&path, &program).unwrap();
        let loaded = load_hack(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.instructions, program.to_vec());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_hack("/nonexistent/dir/prog.hack"),
            Err(HackFileError::IoError(_))
        ));
    }
}
