//! # bursar-db: Database Layer for Bursar
//!
//! SQLite storage for classes, students, fees and payments, with sqlx for
//! async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bursar Data Flow                                 │
//! │                                                                         │
//! │  axum handler (POST /payments)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bursar-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ Student  Fee  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Payment Class │    │ 0001_initial │  │   │
//! │  │   │               │    │ Ledger  Dash. │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bursar_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("bursar.db")).await?;
//! let created = db.payments().create(&new_payment).await?;
//! println!("{}", created.receipt_number); // REC000001
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};

pub use repository::class::ClassRepository;
pub use repository::dashboard::DashboardRepository;
pub use repository::fee::FeeRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::payment::{CreatedPayment, PaymentRepository};
pub use repository::student::{StudentFilter, StudentRepository};
