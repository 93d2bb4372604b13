// SPDX-FileCopyrightText: 2025 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Conversion helpers for programs that speak ASCII over their input and output

use thiserror::Error;

/// Text or output that couldn't be converted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AsciiError {
    /// Input text contained a character outside of ASCII
    #[error("{0:?} is not a valid ASCII character")]
    InvalidAsciiChar(char),
    /// Program output contained an integer outside of the ASCII range
    #[error("{0} is not a valid ASCII character")]
    InvalidAsciiInt(i64),
}

/// Encode `text` as one input value per character
///
/// ```
/// use intcode::ascii::encode_ascii;
/// assert_eq!(encode_ascii("NOT A J\n"), Ok(vec![78, 79, 84, 32, 65, 32, 74, 10]));
/// ```
pub fn encode_ascii(text: &str) -> Result<Vec<i64>, AsciiError> {
    if let Some(bad_char) = text.chars().find(|c| !c.is_ascii()) {
        return Err(AsciiError::InvalidAsciiChar(bad_char));
    }
    Ok(text.bytes().map(i64::from).collect())
}

/// Decode program output into text
pub fn decode_ascii(output: &[i64]) -> Result<String, AsciiError> {
    output
        .iter()
        .map(|&i| {
            u8::try_from(i)
                .ok()
                .filter(u8::is_ascii)
                .map(char::from)
                .ok_or(AsciiError::InvalidAsciiInt(i))
        })
        .collect()
}
