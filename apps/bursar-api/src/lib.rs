//! # Bursar API
//!
//! HTTP server for the school fee ledger.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Bursar API                                    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  /students     │  │  /fees         │  │  /payments                 ││
//! │  │  /classes      │  │                │  │  /receipts                 ││
//! │  │                │  │ • define/amend │  │ • record + receipt number  ││
//! │  │ • enrol/edit   │  │ • resolve id   │  │ • annual / monthly balance ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │  /dashboard    │  │ /notifications │                                │
//! │  │                │  │                │                                │
//! │  │ • collections  │  │ • reminders    │                                │
//! │  │ • pending fees │  │   (per-student │                                │
//! │  │ • per class    │  │    outcomes)   │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │  SQLite (bursar-db)   PDF receipts (printpdf)   SMTP (lettre)     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]. Environment variables use the `BURSAR_` prefix:
//! - `BURSAR_PORT` - HTTP port (default: 5000)
//! - `BURSAR_DATABASE_PATH` - SQLite file (default: bursar.db)
//! - `BURSAR_MONTHLY_OVERFLOW` - `surface` or `discard`
//! - `BURSAR_SMTP__HOST`, `BURSAR_SMTP__USERNAME`, ... - reminder mail relay

pub mod config;
pub mod error;
pub mod mailer;
pub mod receipt;
pub mod reminders;
pub mod routes;

use std::sync::Arc;

use bursar_db::Database;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::build_router;

use crate::mailer::Mailer;
use crate::receipt::ReceiptRenderer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub mailer: Arc<dyn Mailer>,
    pub receipts: Arc<ReceiptRenderer>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, mailer: Arc<dyn Mailer>, config: ApiConfig) -> Self {
        AppState {
            db,
            mailer,
            receipts: Arc::new(ReceiptRenderer::new(config.school_name.clone())),
            config: Arc::new(config),
        }
    }
}
