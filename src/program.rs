// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Parsing the comma-separated program encoding

use std::num::ParseIntError;
use std::ops::Deref;
use std::str::FromStr;
use thiserror::Error;

/// An Intcode program: the initial contents of memory, starting at address `0`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program(Vec<i64>);

/// A field of the program text wasn't a valid integer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field {index} ({token:?}) is not a valid integer: {source}")]
pub struct ParseProgramError {
    /// Zero-based position of the field within the program
    pub index: usize,
    /// The offending text, with surrounding whitespace removed
    pub token: Box<str>,
    source: ParseIntError,
}

impl FromStr for Program {
    type Err = ParseProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }
        s.split(',')
            .map(str::trim)
            .enumerate()
            .map(|(index, token)| {
                token.parse().map_err(|source| ParseProgramError {
                    index,
                    token: token.into(),
                    source,
                })
            })
            .collect::<Result<Vec<i64>, _>>()
            .map(Self)
    }
}

/// Parse comma-separated decimal integers into a [Program]
///
/// ```
/// use intcode::parse_program;
/// assert_eq!(parse_program("1,0,0,0,99\n").unwrap().as_ref(), &[1, 0, 0, 0, 99]);
/// assert_eq!(parse_program("1,x").unwrap_err().index, 1);
/// ```
pub fn parse_program(s: &str) -> Result<Program, ParseProgramError> {
    s.parse()
}

impl From<Vec<i64>> for Program {
    fn from(code: Vec<i64>) -> Self {
        Self(code)
    }
}

impl From<Program> for Vec<i64> {
    fn from(program: Program) -> Self {
        program.0
    }
}

impl FromIterator<i64> for Program {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Deref for Program {
    type Target = [i64];
    fn deref(&self) -> &[i64] {
        &self.0
    }
}

impl AsRef<[i64]> for Program {
    fn as_ref(&self) -> &[i64] {
        &self.0
    }
}

impl IntoIterator for Program {
    type Item = i64;
    type IntoIter = std::vec::IntoIter<i64>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = i64;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, i64>>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerates_whitespace() {
        let program: Program = " 109, -1,\t204 ,1\n".parse().unwrap();
        assert_eq!(&*program, &[109, -1, 204, 1]);
    }

    #[test]
    fn empty_text_is_empty_program() {
        assert!(parse_program("\n").unwrap().is_empty());
    }

    #[test]
    fn reports_bad_field() {
        let err = parse_program("1,2,,4").unwrap_err();
        assert_eq!(err.index, 2);
        assert_eq!(&*err.token, "");
        let err = parse_program("1,2,99999999999999999999").unwrap_err();
        assert_eq!(err.index, 2);
        assert!(err.to_string().starts_with("field 2 (\"99999999999999999999\")"));
    }

    #[test]
    fn borrowed_iteration() {
        let program = Program::from(vec![4, 5]);
        let doubled: Vec<i64> = (&program).into_iter().map(|i| i * 2).collect();
        assert_eq!(doubled, vec![8, 10]);
        assert_eq!(Vec::from(program), vec![4, 5]);
    }
}
