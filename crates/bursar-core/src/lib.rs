//! # bursar-core: Pure Fee Ledger Logic for Bursar
//!
//! This crate is the **heart** of Bursar. It contains the fee ledger rules
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Bursar Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  bursar-api (axum routes)                       │   │
//! │  │   /students  /fees  /payments  /dashboard  /notifications       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  bursar-db (repositories)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ rows                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bursar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  ledger   │  │  receipt  │  │   │
//! │  │   │  Student  │  │   Money   │  │  Annual   │  │  REC0001  │  │   │
//! │  │   │  Fee      │  │           │  │  Monthly  │  │  numbering│  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Student, Fee, Payment, read models)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`ledger`] - Annual balance and twelve-month fee allocation
//! - [`receipt`] - Receipt number format and sequencing
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use bursar_core::ledger::annual_balance;
//! use bursar_core::money::Money;
//!
//! let due = Some(Money::from_major_minor(5000, 0));
//! let paid = Some(Money::from_major_minor(3000, 0));
//!
//! let balance = annual_balance(due, paid);
//! assert_eq!(balance.balance_display(), "2000.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use ledger::{AnnualBalance, LedgerPayment, MonthBucket, MonthlyBreakdown, OverflowPolicy};
pub use money::Money;
pub use receipt::ReceiptNumber;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Fee type label for the once-a-year admission/annual fee.
pub const ANNUAL_FEE: &str = "Annual Fee";

/// Fee type label for the recurring monthly tuition fee.
pub const MONTHLY_FEE: &str = "Monthly Fee";

/// Number of monthly buckets in a fee year.
pub const MONTHS_PER_YEAR: usize = 12;
