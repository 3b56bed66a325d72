//! # Domain Types
//!
//! Core domain types used throughout Bursar.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Class       │   │    Student      │   │      Fee        │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  class_id       │   │  student_id     │   │  fee_id         │       │
//! │  │  class_name     │◄──│  class_descr.   │──►│  class_descr.   │       │
//! │  │  class_descr.   │   │  guardians      │   │  fee_type       │       │
//! │  └─────────────────┘   │  contact, email │   │  total_amount   │       │
//! │                        └────────┬────────┘   └────────┬────────┘       │
//! │                                 │                     │                 │
//! │                                 ▼                     ▼                 │
//! │                        ┌─────────────────────────────────────┐         │
//! │                        │              Payment                │         │
//! │                        │  payment_id, fee_id, student_id     │         │
//! │                        │  payment_date, mode, amount_paid    │         │
//! │                        │  receipt_number (REC000001...)      │         │
//! │                        └─────────────────────────────────────┘         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Students and fees are linked through the class label
//! (`class_description`), compared trimmed and case-insensitively.
//!
//! Read models (`PaymentRecord`, `PendingFee`, ...) are the joined rows the
//! API hands out; they are never written back.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::{ANNUAL_FEE, MONTHLY_FEE};

// =============================================================================
// Class
// =============================================================================

/// A school class (reference data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Class {
    pub class_id: i64,
    /// Short name, e.g. "5".
    pub class_name: String,
    /// Label students and fees refer to, e.g. "Class 5".
    pub class_description: String,
}

// =============================================================================
// Student
// =============================================================================

/// An enrolled student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Student {
    pub student_id: i64,
    pub name: String,
    /// Class label, matched against `Fee::class_description`.
    pub class_description: String,
    pub father_name: String,
    pub mother_name: String,
    pub village: String,
    pub contact_info: String,
    pub email: String,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

/// Validated input for creating or replacing a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub class_description: String,
    pub father_name: String,
    pub mother_name: String,
    pub village: String,
    pub contact_info: String,
    pub email: String,
}

// =============================================================================
// Fee
// =============================================================================

/// Recognized fee categories.
///
/// Fee types are free text; only two labels drive balance calculations.
/// Matching is trimmed and case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum FeeKind {
    #[serde(rename = "Annual Fee")]
    Annual,
    #[serde(rename = "Monthly Fee")]
    Monthly,
    #[default]
    Other,
}

impl FeeKind {
    /// Classifies a free-text fee type.
    ///
    /// ## Example
    /// ```rust
    /// use bursar_core::FeeKind;
    ///
    /// assert_eq!(FeeKind::classify(" annual fee "), FeeKind::Annual);
    /// assert_eq!(FeeKind::classify("Bus Fee"), FeeKind::Other);
    /// ```
    pub fn classify(fee_type: &str) -> Self {
        let fee_type = fee_type.trim();
        if fee_type.eq_ignore_ascii_case(ANNUAL_FEE) {
            FeeKind::Annual
        } else if fee_type.eq_ignore_ascii_case(MONTHLY_FEE) {
            FeeKind::Monthly
        } else {
            FeeKind::Other
        }
    }

    /// Canonical label as stored in the `fees.fee_type` column.
    pub fn label(&self) -> &'static str {
        match self {
            FeeKind::Annual => ANNUAL_FEE,
            FeeKind::Monthly => MONTHLY_FEE,
            FeeKind::Other => "Other",
        }
    }
}

/// An amount owed by every student of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Fee {
    pub fee_id: i64,
    pub class_description: String,
    pub fee_type: String,
    /// For a Monthly Fee this is the amount due per month.
    pub total_amount_cents: i64,
}

impl Fee {
    /// Returns the amount due as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Returns the recognized category of this fee.
    #[inline]
    pub fn kind(&self) -> FeeKind {
        FeeKind::classify(&self.fee_type)
    }
}

/// Validated input for defining a fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFee {
    pub class_description: String,
    pub fee_type: String,
    pub total_amount: Money,
}

// =============================================================================
// Payment
// =============================================================================

/// A single settlement against a fee by a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub payment_id: i64,
    pub fee_id: i64,
    pub student_id: i64,
    #[ts(as = "String")]
    pub payment_date: NaiveDate,
    pub payment_mode: String,
    pub amount_paid_cents: i64,
    pub receipt_number: String,
    #[ts(as = "String")]
    pub created_at: NaiveDateTime,
}

impl Payment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }
}

/// Validated input for recording a payment.
///
/// The receipt number is not part of the input: the store assigns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub fee_id: i64,
    pub student_id: i64,
    pub payment_date: NaiveDate,
    pub payment_mode: String,
    pub amount_paid: Money,
}

// =============================================================================
// Read Models
// =============================================================================

/// A payment joined with the student and fee it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentRecord {
    pub payment_id: i64,
    pub fee_id: i64,
    pub student_id: i64,
    #[ts(as = "String")]
    pub payment_date: NaiveDate,
    pub payment_mode: String,
    pub amount_paid_cents: i64,
    pub receipt_number: String,
    pub student_name: String,
    pub class_description: String,
    pub contact_info: String,
    pub fee_type: String,
}

/// One of a student's payments with the fee category resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StudentPayment {
    pub payment_id: i64,
    pub receipt_number: String,
    #[ts(as = "String")]
    pub payment_date: NaiveDate,
    pub payment_mode: String,
    pub amount_paid_cents: i64,
    pub fee_type: String,
    pub total_amount_cents: i64,
    /// Filled from `fee_type` after the row is read.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub fee_category: FeeKind,
}

/// Everything printed on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ReceiptDetails {
    pub payment_id: i64,
    pub receipt_number: String,
    #[ts(as = "String")]
    pub payment_date: NaiveDate,
    pub payment_mode: String,
    pub amount_paid_cents: i64,
    pub fee_type: String,
    pub total_amount_cents: i64,
    pub student_name: String,
    pub class_description: String,
}

impl ReceiptDetails {
    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }

    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

/// A (student, fee) pair with money still owed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PendingFee {
    pub student_id: i64,
    pub student_name: String,
    pub class_name: String,
    pub fee_id: i64,
    pub fee_type: String,
    pub total_amount_cents: i64,
    pub paid_cents: i64,
    pub pending_cents: i64,
}

/// Collections and outstanding dues for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ClassBreakdown {
    pub class_name: String,
    pub total_collected_cents: i64,
    pub total_pending_cents: i64,
}

/// A student who should receive a pending-fee reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ReminderTarget {
    pub student_id: i64,
    pub student_name: String,
    pub email: String,
    pub class_description: String,
    pub pending_cents: i64,
}

impl ReminderTarget {
    #[inline]
    pub fn pending(&self) -> Money {
        Money::from_cents(self.pending_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_kind_classify() {
        assert_eq!(FeeKind::classify("Annual Fee"), FeeKind::Annual);
        assert_eq!(FeeKind::classify("MONTHLY FEE"), FeeKind::Monthly);
        assert_eq!(FeeKind::classify("  monthly fee"), FeeKind::Monthly);
        assert_eq!(FeeKind::classify("Exam Fee"), FeeKind::Other);
        assert_eq!(FeeKind::classify(""), FeeKind::Other);
    }

    #[test]
    fn test_fee_kind_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&FeeKind::Annual).unwrap(),
            "\"Annual Fee\""
        );
        assert_eq!(FeeKind::Monthly.label(), MONTHLY_FEE);
    }

    #[test]
    fn test_fee_accessors() {
        let fee = Fee {
            fee_id: 1,
            class_description: "Class 5".to_string(),
            fee_type: "Annual Fee".to_string(),
            total_amount_cents: 500_000,
        };
        assert_eq!(fee.total_amount().to_string(), "5000.00");
        assert_eq!(fee.kind(), FeeKind::Annual);
    }
}
