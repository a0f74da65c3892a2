//! Match-type and strand-type filters applied to overlapping entries.

use crate::error::{IndexError, Result};
use crate::interval::Strand;
use std::fmt;
use std::str::FromStr;

/// How an entry's bounds must relate to the query window.
///
/// Every variant is applied on top of the half-open overlap test, so an
/// entry that does not overlap the query never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchType {
    /// Any overlap.
    #[default]
    Any,
    /// Same start and same end.
    Exact,
    /// Entry contains the query.
    Contain,
    /// Entry lies within the query.
    Within,
    /// Same start.
    Start,
    /// Same end.
    End,
}

impl MatchType {
    pub const ALL: [MatchType; 6] = [
        MatchType::Any,
        MatchType::Exact,
        MatchType::Contain,
        MatchType::Within,
        MatchType::Start,
        MatchType::End,
    ];

    #[inline]
    pub fn code(self) -> u8 {
        match self {
            MatchType::Any => 0,
            MatchType::Exact => 1,
            MatchType::Contain => 2,
            MatchType::Within => 3,
            MatchType::Start => 4,
            MatchType::End => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MatchType::Any => "any",
            MatchType::Exact => "exact",
            MatchType::Contain => "contain",
            MatchType::Within => "within",
            MatchType::Start => "start",
            MatchType::End => "end",
        }
    }

    /// Test an already-overlapping entry `[start, end)` against the query
    /// window `[query_start, query_end)`.
    #[inline]
    pub fn matches(self, start: u64, end: u64, query_start: u64, query_end: u64) -> bool {
        match self {
            MatchType::Any => true,
            MatchType::Exact => start == query_start && end == query_end,
            MatchType::Contain => start <= query_start && end >= query_end,
            MatchType::Within => start >= query_start && end <= query_end,
            MatchType::Start => start == query_start,
            MatchType::End => end == query_end,
        }
    }
}

impl TryFrom<u8> for MatchType {
    type Error = IndexError;

    fn try_from(code: u8) -> Result<Self> {
        MatchType::ALL
            .into_iter()
            .find(|m| m.code() == code)
            .ok_or(IndexError::UnknownMatchType(code))
    }
}

impl FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        MatchType::ALL
            .into_iter()
            .find(|m| m.name() == lower)
            .ok_or_else(|| {
                format!(
                    "unknown match type '{}' (expected one of: any, exact, contain, within, start, end)",
                    s
                )
            })
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an entry's strand must relate to the query strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrandType {
    /// Strand is not considered.
    #[default]
    Ignore,
    /// Same known strand. An unspecified query strand matches nothing.
    Same,
    /// One plus, one minus.
    Opposite,
    /// Identical strand, where an unknown entry strand matches an
    /// unspecified query strand.
    ExactSame,
}

impl StrandType {
    pub const ALL: [StrandType; 4] = [
        StrandType::Ignore,
        StrandType::Same,
        StrandType::Opposite,
        StrandType::ExactSame,
    ];

    #[inline]
    pub fn code(self) -> u8 {
        match self {
            StrandType::Ignore => 0,
            StrandType::Same => 1,
            StrandType::Opposite => 2,
            StrandType::ExactSame => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StrandType::Ignore => "ignore",
            StrandType::Same => "same",
            StrandType::Opposite => "opposite",
            StrandType::ExactSame => "exact-same",
        }
    }

    #[inline]
    pub fn matches(self, entry: Strand, query: Strand) -> bool {
        match self {
            StrandType::Ignore => true,
            StrandType::Same => query.is_known() && entry == query,
            StrandType::Opposite => matches!(
                (entry, query),
                (Strand::Plus, Strand::Minus) | (Strand::Minus, Strand::Plus)
            ),
            StrandType::ExactSame => entry == query,
        }
    }
}

impl TryFrom<u8> for StrandType {
    type Error = IndexError;

    fn try_from(code: u8) -> Result<Self> {
        StrandType::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or(IndexError::UnknownStrandType(code))
    }
}

impl FromStr for StrandType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace('_', "-");
        StrandType::ALL
            .into_iter()
            .find(|t| t.name() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown strand type '{}' (expected one of: ignore, same, opposite, exact-same)",
                    s
                )
            })
    }
}

impl fmt::Display for StrandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
