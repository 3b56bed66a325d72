//! # Repository Module
//!
//! Database repository implementations for Bursar.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  axum handler                                                          │
//! │       │                                                                 │
//! │       │  db.payments().create(&payment)                                │
//! │       ▼                                                                 │
//! │  PaymentRepository                                                     │
//! │  ├── create(&self, payment)        ← assigns the receipt number        │
//! │  ├── list_for_student(&self, id)                                       │
//! │  └── receipt_by_number(&self, rec)                                     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Students and fees meet on the class label. Every join and lookup on that
//! label goes through `lower(trim(..))`.
//!
//! ## Available Repositories
//!
//! - [`class::ClassRepository`] - Class reference data
//! - [`student::StudentRepository`] - Student CRUD and lookup
//! - [`fee::FeeRepository`] - Fee definitions
//! - [`payment::PaymentRepository`] - Payments and receipt numbering
//! - [`ledger::LedgerRepository`] - Annual and monthly balances
//! - [`dashboard::DashboardRepository`] - Collection and pending aggregates

pub mod class;
pub mod dashboard;
pub mod fee;
pub mod ledger;
pub mod payment;
pub mod student;

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the repository tests.

    use bursar_core::validation::{self, PaymentFields, StudentFields};
    use bursar_core::{NewFee, NewPayment, NewStudent};

    use crate::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn student(name: &str, class: &str) -> NewStudent {
        validation::new_student(StudentFields {
            name: Some(name),
            class_description: Some(class),
            father_name: Some("Father"),
            mother_name: Some("Mother"),
            village: Some("Village"),
            contact_info: Some("9000000000"),
            email: Some("family@example.com"),
        })
        .unwrap()
    }

    pub fn fee(class: &str, fee_type: &str, cents: i64) -> NewFee {
        validation::new_fee(Some(class), Some(fee_type), Some(cents)).unwrap()
    }

    pub fn payment(fee_id: i64, student_id: i64, date: &str, cents: i64) -> NewPayment {
        validation::new_payment(PaymentFields {
            fee_id: Some(fee_id),
            student_id: Some(student_id),
            payment_date: Some(date),
            payment_mode: Some("Cash"),
            amount_paid_cents: Some(cents),
        })
        .unwrap()
    }
}
