//! # Score — Fixed-Point Bounded Score
//!
//! A score is a value in `[0, 100]` with exactly two decimal digits. It is
//! stored as centipoints (`0..=10_000`) so that:
//!
//! - the two-decimal contract holds by construction, not by repeated
//!   rounding;
//! - the canonical digest path (which rejects floats) can carry scores;
//! - the 3-byte big-endian wire encoding in the binding message is exact.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::VerisError;

/// Maximum score in centipoints (100.00).
pub const MAX_CENTI: u32 = 10_000;

/// A bounded score with two decimal digits, stored as centipoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(u32);

impl Score {
    /// Clamp a raw model output into `[0, 100]` and round to two decimals.
    ///
    /// This is the scoring engine's construction path: any real-valued
    /// model output maps to a valid score. NaN maps to zero rather than
    /// propagating.
    pub fn from_raw(value: f64) -> Self {
        if value.is_nan() {
            return Self(0);
        }
        let clamped = value.clamp(0.0, 100.0);
        Self((clamped * 100.0).round() as u32)
    }

    /// Construct from centipoints, rejecting out-of-range values.
    ///
    /// This is the deserialization path: persisted records must already be
    /// in range, and out-of-range values indicate corruption rather than
    /// something to silently clamp.
    pub fn from_centi(centi: u32) -> Result<Self, VerisError> {
        if centi > MAX_CENTI {
            return Err(VerisError::Validation(format!(
                "score out of range: {centi} centipoints (max {MAX_CENTI})"
            )));
        }
        Ok(Self(centi))
    }

    /// The score in centipoints (`0..=10_000`).
    pub fn centi(&self) -> u32 {
        self.0
    }

    /// The score as a float, for display and model comparisons only —
    /// never for the digest or wire paths.
    pub fn value(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// The fixed-width 3-byte big-endian encoding used in the binding
    /// message. Verifiers must reproduce this layout exactly.
    pub fn to_be3(&self) -> [u8; 3] {
        let b = self.0.to_be_bytes();
        [b[1], b[2], b[3]]
    }

    fn parse(s: &str) -> Result<Self, VerisError> {
        let invalid =
            || VerisError::Validation(format!("score must be a 2-decimal string, got {s:?}"));
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() || frac_part.len() > 2 {
            return Err(invalid());
        }
        let int: u32 = int_part.parse().map_err(|_| invalid())?;
        let frac: u32 = if frac_part.is_empty() {
            0
        } else {
            let parsed: u32 = frac_part.parse().map_err(|_| invalid())?;
            if frac_part.len() == 1 {
                parsed * 10
            } else {
                parsed
            }
        };
        let centi = int
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(invalid)?;
        Self::from_centi(centi)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// Scores serialize as 2-decimal strings ("75.25") — the canonical pipeline
// rejects floats, and a string survives every JSON implementation intact.
impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
