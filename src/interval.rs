//! Core entry and strand types.

use crate::error::{IndexError, Result};
use std::fmt;
use std::str::FromStr;

/// Strand orientation.
///
/// Entries carry `Plus`, `Minus` or `Unknown`. On the query side `Unknown`
/// stands for an unspecified strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strand {
    Plus,
    Minus,
    #[default]
    Unknown,
}

impl Strand {
    pub fn from_char(c: char) -> Self {
        match c {
            '+' => Strand::Plus,
            '-' => Strand::Minus,
            _ => Strand::Unknown,
        }
    }

    /// Decode the numeric strand codes used by the tuple interface
    /// (`0` = plus, `1` = minus, `3` = unknown).
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Strand::Plus),
            1 => Ok(Strand::Minus),
            3 => Ok(Strand::Unknown),
            other => Err(IndexError::UnknownStrand(other.to_string())),
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Strand::Plus => 0,
            Strand::Minus => 1,
            Strand::Unknown => 3,
        }
    }

    /// True for `Plus` and `Minus`.
    #[inline]
    pub fn is_known(self) -> bool {
        self != Strand::Unknown
    }
}

impl FromStr for Strand {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.as_bytes() {
            [c @ (b'+' | b'-' | b'.')] => Ok(Strand::from_char(*c as char)),
            [c @ b'0'..=b'9'] => Strand::from_code(c - b'0'),
            _ => Err(IndexError::UnknownStrand(s.to_string())),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
            Strand::Unknown => write!(f, "."),
        }
    }
}

/// One indexed feature. Coordinates are 0-based, half-open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub start: u64,
    pub end: u64,
    pub name: String,
    pub strand: Strand,
    pub group: u32,
}

impl Entry {
    /// Create a new entry, rejecting empty or inverted bounds.
    pub fn new(
        start: u64,
        end: u64,
        name: impl Into<String>,
        strand: Strand,
        group: u32,
    ) -> Result<Self> {
        if start >= end {
            return Err(IndexError::InvalidInterval { start, end });
        }
        Ok(Self {
            start,
            end,
            name: name.into(),
            strand,
            group,
        })
    }

    /// Returns the length of the entry.
    #[inline]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Always false: entries are never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Half-open overlap test against `[start, end)`.
    #[inline]
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        self.start < end && self.end > start
    }
}

/// One query hit: the entry's bounds, name and group index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub start: u64,
    pub end: u64,
    pub name: String,
    pub group: u32,
}

impl Match {
    pub(crate) fn from_entry(entry: &Entry) -> Self {
        Self {
            start: entry.start,
            end: entry.end,
            name: entry.name.clone(),
            group: entry.group,
        }
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}\t{}", self.start, self.end, self.name, self.group)
    }
}
