//! # Validation Module
//!
//! Input validation for Bursar requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: axum extractors                                              │
//! │  └── JSON / query shape (rejections → 400)                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── required fields, trimming, length limits                          │
//! │  ├── email shape, payment date format                                  │
//! │  └── amount signs (fees >= 0, payments > 0)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  ├── CHECK constraints on amounts                                      │
//! │  ├── UNIQUE indexes (students, fees, receipt numbers)                  │
//! │  └── Foreign keys (payments → fees, students)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bursar_core::validation::{parse_payment_date, validate_payment_amount};
//!
//! assert!(parse_payment_date("2024-04-01").is_ok());
//! assert!(validate_payment_amount(0).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NewFee, NewPayment, NewStudent};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted free-text field.
pub const MAX_TEXT_LEN: usize = 255;

/// Largest fee or payment amount accepted, in cents (one billion).
///
/// Keeps sums over any realistic number of rows inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

/// Accepted payment date format.
pub const PAYMENT_DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// String Validators
// =============================================================================

/// Trims a required text field and checks its length.
///
/// ## Example
/// ```rust
/// use bursar_core::validation::required_text;
///
/// assert_eq!(required_text("name", Some("  Asha ")).unwrap(), "Asha");
/// assert!(required_text("name", Some("   ")).is_err());
/// assert!(required_text("name", None).is_err());
/// ```
pub fn required_text(field: &str, value: Option<&str>) -> ValidationResult<String> {
    let value = value.map(str::trim).unwrap_or_default();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    optional_text(field, Some(value))
}

/// Trims an optional text field; missing becomes the empty string.
pub fn optional_text(field: &str, value: Option<&str>) -> ValidationResult<String> {
    let value = value.map(str::trim).unwrap_or_default();

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(value.to_string())
}

/// Validates an email address (shape only, no delivery check).
///
/// ## Rules
/// - exactly one `@`, with a non-empty local part
/// - the domain contains a dot that is neither first nor last
/// - no whitespace
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("missing @"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("expected name@domain"));
    }

    match domain.find('.') {
        Some(pos) if pos > 0 && !domain.ends_with('.') => Ok(()),
        _ => Err(invalid("domain must contain a dot")),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a fee amount: zero up to [`MAX_AMOUNT_CENTS`].
pub fn validate_fee_amount(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_AMOUNT_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "total_amount_cents".to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Validates a payment amount: strictly positive, at most [`MAX_AMOUNT_CENTS`].
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount_paid_cents".to_string(),
        });
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "amount_paid_cents".to_string(),
            min: 1,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Validates a row id taken from a request body or path.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Dates
// =============================================================================

/// Parses a `YYYY-MM-DD` payment date.
pub fn parse_payment_date(value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), PAYMENT_DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidFormat {
            field: "payment_date".to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        }
    })
}

// =============================================================================
// Entity Builders
// =============================================================================

/// Raw student fields as they arrive from a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct StudentFields<'a> {
    pub name: Option<&'a str>,
    pub class_description: Option<&'a str>,
    pub father_name: Option<&'a str>,
    pub mother_name: Option<&'a str>,
    pub village: Option<&'a str>,
    pub contact_info: Option<&'a str>,
    pub email: Option<&'a str>,
}

/// Validates and normalizes student input.
///
/// Every field is required except `village`, which defaults to empty.
pub fn new_student(fields: StudentFields<'_>) -> ValidationResult<NewStudent> {
    let email = required_text("email", fields.email)?;
    validate_email(&email)?;

    Ok(NewStudent {
        name: required_text("name", fields.name)?,
        class_description: required_text("class_description", fields.class_description)?,
        father_name: required_text("father_name", fields.father_name)?,
        mother_name: required_text("mother_name", fields.mother_name)?,
        village: optional_text("village", fields.village)?,
        contact_info: required_text("contact_info", fields.contact_info)?,
        email,
    })
}

/// Validates fee input.
pub fn new_fee(
    class_description: Option<&str>,
    fee_type: Option<&str>,
    total_amount_cents: Option<i64>,
) -> ValidationResult<NewFee> {
    let class_description = required_text("class_description", class_description)?;
    let fee_type = required_text("fee_type", fee_type)?;
    let cents = total_amount_cents.ok_or_else(|| ValidationError::required("total_amount_cents"))?;
    validate_fee_amount(cents)?;

    Ok(NewFee {
        class_description,
        fee_type,
        total_amount: Money::from_cents(cents),
    })
}

/// Raw payment fields as they arrive from a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentFields<'a> {
    pub fee_id: Option<i64>,
    pub student_id: Option<i64>,
    pub payment_date: Option<&'a str>,
    pub payment_mode: Option<&'a str>,
    pub amount_paid_cents: Option<i64>,
}

/// Validates payment input.
pub fn new_payment(fields: PaymentFields<'_>) -> ValidationResult<NewPayment> {
    let fee_id = fields
        .fee_id
        .ok_or_else(|| ValidationError::required("fee_id"))?;
    validate_id("fee_id", fee_id)?;

    let student_id = fields
        .student_id
        .ok_or_else(|| ValidationError::required("student_id"))?;
    validate_id("student_id", student_id)?;

    let payment_date = parse_payment_date(&required_text("payment_date", fields.payment_date)?)?;
    let payment_mode = required_text("payment_mode", fields.payment_mode)?;

    let cents = fields
        .amount_paid_cents
        .ok_or_else(|| ValidationError::required("amount_paid_cents"))?;
    validate_payment_amount(cents)?;

    Ok(NewPayment {
        fee_id,
        student_id,
        payment_date,
        payment_mode,
        amount_paid: Money::from_cents(cents),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn student_fields() -> StudentFields<'static> {
        StudentFields {
            name: Some(" Asha Rao "),
            class_description: Some("Class 5"),
            father_name: Some("Ravi Rao"),
            mother_name: Some("Meena Rao"),
            village: None,
            contact_info: Some("9876543210"),
            email: Some("asha@example.com"),
        }
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("name", Some(" x ")).unwrap(), "x");
        assert!(matches!(
            required_text("name", Some("")),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            required_text("name", Some("a".repeat(MAX_TEXT_LEN + 1).as_str())),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("first.last@school.edu.in").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@b.co").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("a@.com").is_err());
        assert!(validate_email("a@b.com.").is_err());
        assert!(validate_email("a b@c.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn test_amounts() {
        assert!(validate_fee_amount(0).is_ok());
        assert!(validate_fee_amount(-1).is_err());
        assert!(validate_payment_amount(1).is_ok());
        assert!(validate_payment_amount(0).is_err());
        assert!(validate_payment_amount(-100).is_err());
    }

    #[test]
    fn test_amount_upper_bound() {
        assert!(validate_fee_amount(MAX_AMOUNT_CENTS).is_ok());
        assert!(matches!(
            validate_fee_amount(MAX_AMOUNT_CENTS + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_payment_amount(MAX_AMOUNT_CENTS).is_ok());
        assert!(matches!(
            validate_payment_amount(i64::MAX),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "amount_paid_cents"
        ));
    }

    #[test]
    fn test_parse_payment_date() {
        let date = parse_payment_date("2024-04-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert!(parse_payment_date("01/04/2024").is_err());
        assert!(parse_payment_date("2024-02-30").is_err());
    }

    #[test]
    fn test_new_student_trims_and_defaults_village() {
        let student = new_student(student_fields()).unwrap();
        assert_eq!(student.name, "Asha Rao");
        assert_eq!(student.village, "");
    }

    #[test]
    fn test_new_student_requires_fields() {
        let mut fields = student_fields();
        fields.father_name = None;
        let err = new_student(fields).unwrap_err();
        assert_eq!(err.to_string(), "father_name is required");

        let mut fields = student_fields();
        fields.email = Some("not-an-email");
        assert!(matches!(
            new_student(fields),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_new_fee() {
        let fee = new_fee(Some("Class 5"), Some("Annual Fee"), Some(500_000)).unwrap();
        assert_eq!(fee.total_amount.cents(), 500_000);
        assert!(new_fee(Some("Class 5"), Some("Annual Fee"), None).is_err());
        assert!(new_fee(Some("Class 5"), Some(" "), Some(1)).is_err());
        assert!(new_fee(Some("Class 5"), Some("Bus Fee"), Some(-5)).is_err());
    }

    #[test]
    fn test_new_payment() {
        let fields = PaymentFields {
            fee_id: Some(1),
            student_id: Some(2),
            payment_date: Some("2024-04-10"),
            payment_mode: Some("Cash"),
            amount_paid_cents: Some(30_000),
        };
        let payment = new_payment(fields).unwrap();
        assert_eq!(payment.amount_paid.cents(), 30_000);
        assert_eq!(payment.payment_mode, "Cash");

        let missing = PaymentFields {
            payment_mode: None,
            ..fields
        };
        assert_eq!(
            new_payment(missing).unwrap_err().to_string(),
            "payment_mode is required"
        );

        let zero = PaymentFields {
            amount_paid_cents: Some(0),
            ..fields
        };
        assert!(matches!(
            new_payment(zero),
            Err(ValidationError::MustBePositive { .. })
        ));
    }
}
