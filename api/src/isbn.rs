//! ISBN-10 / ISBN-13 identifiers.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reasons an ISBN fails validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IsbnError {
    /// Wrong number of characters after removing separators
    #[error("ISBN must have 10 or 13 digits, got {0}")]
    InvalidLength(usize),

    /// A character other than a digit (or a trailing `X` for ISBN-10)
    #[error("Invalid character {0:?} in ISBN")]
    InvalidCharacter(char),

    /// Digits are well-formed but the check digit does not match
    #[error("ISBN checksum mismatch: {0}")]
    Checksum(String),
}

fn strip_separators(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .collect()
}

fn digit(c: char) -> Result<u32, IsbnError> {
    c.to_digit(10).ok_or(IsbnError::InvalidCharacter(c))
}

/// A checksum-valid ISBN-10
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Isbn10(String);

impl Isbn10 {
    /// Parse and validate an ISBN-10 (`-` and spaces are ignored)
    ///
    /// # Errors
    ///
    /// Returns an [`IsbnError`] on bad length, characters, or checksum.
    pub fn parse(input: &str) -> Result<Self, IsbnError> {
        let isbn = strip_separators(input).to_ascii_uppercase();
        let chars: Vec<char> = isbn.chars().collect();
        if chars.len() != 10 {
            return Err(IsbnError::InvalidLength(chars.len()));
        }

        let mut total = 0;
        for (weight, &c) in (1..).zip(chars.iter()) {
            let value = if c == 'X' && weight == 10 { 10 } else { digit(c)? };
            total += weight * value;
        }

        if total % 11 == 0 {
            Ok(Self(isbn))
        } else {
            Err(IsbnError::Checksum(isbn))
        }
    }

    /// The normalized identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A checksum-valid ISBN-13
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Isbn13(String);

impl Isbn13 {
    /// Parse and validate an ISBN-13 (`-` and spaces are ignored)
    ///
    /// # Errors
    ///
    /// Returns an [`IsbnError`] on bad length, characters, or checksum.
    pub fn parse(input: &str) -> Result<Self, IsbnError> {
        let isbn = strip_separators(input);
        let chars: Vec<char> = isbn.chars().collect();
        if chars.len() != 13 {
            return Err(IsbnError::InvalidLength(chars.len()));
        }

        let mut total = 0;
        for (i, &c) in chars.iter().enumerate() {
            let weight = if i % 2 == 0 { 1 } else { 3 };
            total += weight * digit(c)?;
        }

        if total % 10 == 0 {
            Ok(Self(isbn))
        } else {
            Err(IsbnError::Checksum(isbn))
        }
    }

    /// The normalized identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Either form of book identifier accepted by `GET /book/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BookId {
    /// ISBN-10
    Isbn10(Isbn10),
    /// ISBN-13 (canonical identity key)
    Isbn13(Isbn13),
}

impl BookId {
    /// Parse an ISBN-10 or ISBN-13, chosen by length
    ///
    /// # Errors
    ///
    /// Returns an [`IsbnError`] if the input is neither a valid ISBN-10 nor ISBN-13.
    pub fn parse(input: &str) -> Result<Self, IsbnError> {
        match strip_separators(input).chars().count() {
            10 => Isbn10::parse(input).map(Self::Isbn10),
            13 => Isbn13::parse(input).map(Self::Isbn13),
            n => Err(IsbnError::InvalidLength(n)),
        }
    }

    /// The normalized identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Isbn10(isbn) => isbn.as_str(),
            Self::Isbn13(isbn) => isbn.as_str(),
        }
    }
}

impl FromStr for BookId {
    type Err = IsbnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
