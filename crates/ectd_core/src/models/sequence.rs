use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Sequence Number
// Four digits, zero padded. "0000" doubles as the "no prior sequence" base.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SequenceNumber(u16);

impl SequenceNumber {
    pub const ZERO: SequenceNumber = SequenceNumber(0);
    pub const MAX: SequenceNumber = SequenceNumber(9999);

    pub fn new(value: u16) -> Result<Self> {
        if value > Self::MAX.0 {
            return Err(Error::InvalidSequence(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn successor(&self) -> Result<Self> {
        if *self >= Self::MAX {
            return Err(Error::SequenceExhausted(*self));
        }
        Ok(Self(self.0 + 1))
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl FromStr for SequenceNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.len() > 4 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidSequence(s.to_string()));
        }
        let value: u16 = trimmed
            .parse()
            .map_err(|_| Error::InvalidSequence(s.to_string()))?;
        Self::new(value)
    }
}

impl Serialize for SequenceNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SequenceNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Computes the sequence that follows `base`.
///
/// An absent base, or the `0000` sentinel, means no prior sequence exists and
/// the new sequence is `0000`.
pub fn next_sequence(base: Option<&SequenceNumber>) -> Result<SequenceNumber> {
    match base {
        None => Ok(SequenceNumber::ZERO),
        Some(b) if *b == SequenceNumber::ZERO => Ok(SequenceNumber::ZERO),
        Some(b) => b.successor(),
    }
}

/// Allocates the next sequence given the caller's `base` and the last sequence
/// actually recorded.
///
/// The caller must have observed the current state: an empty history matches
/// an absent or `0000` base, otherwise `base` must equal `last`. Once `0000`
/// has been recorded, a `0000` base refers to it and allocates `0001`.
pub fn allocate(base: Option<SequenceNumber>, last: Option<SequenceNumber>) -> Result<SequenceNumber> {
    match (base, last) {
        (b, None) if b.unwrap_or(SequenceNumber::ZERO) == SequenceNumber::ZERO => next_sequence(b.as_ref()),
        (Some(b), Some(l)) if b == l => l.successor(),
        (b, l) => Err(Error::SequenceConflict {
            base: b.unwrap_or(SequenceNumber::ZERO),
            last: l,
        }),
    }
}

// ---------------------------------------------------------------------------
// Submission Sequence
// One row per build. Never mutated after creation.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSequence {
    pub sequence_number: SequenceNumber,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub document_count: u32,
    pub directory_path: String,
}
