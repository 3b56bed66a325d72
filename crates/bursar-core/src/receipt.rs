//! # Receipt Numbers
//!
//! Receipt numbers are `REC` followed by a zero-padded six-digit sequence:
//! `REC000001`, `REC000002`, ...
//!
//! The store owns the sequence (see `bursar-db`); this module only knows the
//! format. Sequences beyond 999999 still render, just with more digits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Prefix of every receipt number.
pub const RECEIPT_PREFIX: &str = "REC";

/// Minimum digit count after the prefix.
pub const RECEIPT_DIGITS: usize = 6;

/// A parsed receipt number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReceiptNumber(u64);

impl ReceiptNumber {
    /// Wraps a sequence value. Sequence values start at 1.
    pub fn from_sequence(sequence: u64) -> CoreResult<Self> {
        if sequence == 0 {
            return Err(CoreError::InvalidReceiptNumber {
                value: format!("{}{:0width$}", RECEIPT_PREFIX, 0, width = RECEIPT_DIGITS),
                reason: "sequence starts at 1".to_string(),
            });
        }
        Ok(ReceiptNumber(sequence))
    }

    /// Parses `REC` + digits.
    ///
    /// ## Example
    /// ```rust
    /// use bursar_core::ReceiptNumber;
    ///
    /// let receipt = ReceiptNumber::parse("REC000007").unwrap();
    /// assert_eq!(receipt.sequence(), 7);
    /// assert_eq!(receipt.next().to_string(), "REC000008");
    /// assert!(ReceiptNumber::parse("R-7").is_err());
    /// ```
    pub fn parse(value: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidReceiptNumber {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let digits = value
            .strip_prefix(RECEIPT_PREFIX)
            .ok_or_else(|| invalid("must start with REC"))?;

        if digits.len() < RECEIPT_DIGITS {
            return Err(invalid("expected at least six digits"));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected digits after REC"));
        }

        let sequence: u64 = digits
            .parse()
            .map_err(|_| invalid("sequence out of range"))?;

        Self::from_sequence(sequence).map_err(|_| invalid("sequence starts at 1"))
    }

    /// The numeric part.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.0
    }

    /// The receipt that follows this one.
    #[inline]
    pub fn next(&self) -> Self {
        ReceiptNumber(self.0 + 1)
    }
}

impl fmt::Display for ReceiptNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:0width$}", RECEIPT_PREFIX, self.0, width = RECEIPT_DIGITS)
    }
}

impl FromStr for ReceiptNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReceiptNumber::parse(s)
    }
}

impl TryFrom<String> for ReceiptNumber {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ReceiptNumber::parse(&value)
    }
}

impl From<ReceiptNumber> for String {
    fn from(receipt: ReceiptNumber) -> Self {
        receipt.to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_receipt() {
        assert_eq!(ReceiptNumber::from_sequence(1).unwrap().to_string(), "REC000001");
    }

    #[test]
    fn test_display_pads_and_grows() {
        assert_eq!(ReceiptNumber::from_sequence(42).unwrap().to_string(), "REC000042");
        assert_eq!(
            ReceiptNumber::from_sequence(1_234_567).unwrap().to_string(),
            "REC1234567"
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "REC", "REC12", "rec000001", "REC00000A", "INV000001", "REC000000"] {
            let err = ReceiptNumber::parse(bad).unwrap_err();
            assert!(matches!(err, CoreError::InvalidReceiptNumber { .. }), "{bad}");
        }
    }

    #[test]
    fn test_ordering_follows_sequence() {
        let a = ReceiptNumber::parse("REC000009").unwrap();
        let b = ReceiptNumber::parse("REC000010").unwrap();
        assert!(a < b);
        assert_eq!(a.next(), b);
    }

    #[test]
    fn test_serde_as_string() {
        let receipt = ReceiptNumber::from_sequence(3).unwrap();
        assert_eq!(serde_json::to_string(&receipt).unwrap(), "\"REC000003\"");
        let back: ReceiptNumber = serde_json::from_str("\"REC000003\"").unwrap();
        assert_eq!(back, receipt);
        assert!(serde_json::from_str::<ReceiptNumber>("\"X1\"").is_err());
    }
}
