//! Reading program images
//!
//! An image is a text file holding one 32-bit word per line, written in hex
//! with or without a `0x` prefix. Blank lines and `#` comments are skipped.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::LoadError;

/// Reads and parses the program file at `path`
pub fn load_program(path: &Path) -> Result<Vec<u32>, LoadError> {
    let text = fs::read_to_string(path)
        .map_err(|e| LoadError::FileReadError(path.to_path_buf(), e))?;
    parse_program(&text, path)
}

/// Parses an image already in memory; `path` only labels errors
pub fn parse_program(text: &str, path: &Path) -> Result<Vec<u32>, LoadError> {
    let mut words = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let content = match line.split_once('#') {
            Some((before, _)) => before,
            None => line,
        }
        .trim();
        if content.is_empty() {
            continue;
        }

        let word = parse_word(content).ok_or_else(|| LoadError::ParseError {
            path: path.to_path_buf(),
            line: index + 1,
            text: content.to_string(),
        })?;
        debug!("word {:#010x} from line {}", word, index + 1);
        words.push(word);
    }
    Ok(words)
}

fn parse_word(text: &str) -> Option<u32> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16).ok()
}
