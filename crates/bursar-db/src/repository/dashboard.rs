//! # Dashboard Repository
//!
//! School-wide aggregates: collections, pending fees, per-class totals and
//! the list of students to remind.
//!
//! ## Pending Amounts
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  students s ──(class label, trimmed, any case)──► fees f               │
//! │       │                                              │                  │
//! │       └──────────── payments p (same student, same fee) ◄┘             │
//! │                                                                         │
//! │  one row per (s, f):  pending = f.total − Σ p.amount                   │
//! │                                                                         │
//! │  pending-fees      rows with pending > 0                               │
//! │  class breakdown   Σ positive pending per class                        │
//! │  reminders         Σ positive pending per student                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Overpaying one fee never offsets another: only positive amounts are summed.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bursar_core::{ClassBreakdown, Money, PendingFee, ReminderTarget};

/// Per (student, fee of the student's class) pending amounts.
const PAIR_PENDING: &str = r#"
    SELECT s.student_id,
           s.name AS student_name,
           s.class_description,
           s.email,
           f.fee_id,
           f.fee_type,
           f.total_amount_cents,
           COALESCE(SUM(p.amount_paid_cents), 0) AS paid_cents,
           f.total_amount_cents - COALESCE(SUM(p.amount_paid_cents), 0) AS pending_cents
    FROM students s
    JOIN fees f
      ON lower(trim(f.class_description)) = lower(trim(s.class_description))
    LEFT JOIN payments p
      ON p.fee_id = f.fee_id AND p.student_id = s.student_id
    GROUP BY s.student_id, f.fee_id
"#;

/// Repository for dashboard aggregations.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    /// Creates a new DashboardRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Sum of every payment ever recorded.
    pub async fn total_collections(&self) -> DbResult<Money> {
        let cents = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount_paid_cents), 0) FROM payments",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(cents))
    }

    /// Every (student, fee) pair that still has money owed.
    pub async fn pending_fees(&self) -> DbResult<Vec<PendingFee>> {
        let sql = format!(
            r#"
            WITH pairs AS ({PAIR_PENDING})
            SELECT student_id, student_name, class_description AS class_name,
                   fee_id, fee_type, total_amount_cents, paid_cents, pending_cents
            FROM pairs
            WHERE pending_cents > 0
            ORDER BY student_id, fee_id
            "#
        );

        let rows = sqlx::query_as::<_, PendingFee>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Pending fee rows");
        Ok(rows)
    }

    /// Collected and pending totals for every class.
    pub async fn class_breakdown(&self) -> DbResult<Vec<ClassBreakdown>> {
        let sql = format!(
            r#"
            WITH pairs AS ({PAIR_PENDING}),
            pending AS (
                SELECT lower(trim(class_description)) AS class_key,
                       SUM(CASE WHEN pending_cents > 0 THEN pending_cents ELSE 0 END) AS total
                FROM pairs
                GROUP BY lower(trim(class_description))
            ),
            collected AS (
                SELECT lower(trim(s.class_description)) AS class_key,
                       SUM(p.amount_paid_cents) AS total
                FROM payments p
                JOIN students s ON s.student_id = p.student_id
                GROUP BY lower(trim(s.class_description))
            )
            SELECT c.class_description AS class_name,
                   COALESCE(col.total, 0) AS total_collected_cents,
                   COALESCE(pen.total, 0) AS total_pending_cents
            FROM classes c
            LEFT JOIN collected col ON col.class_key = lower(trim(c.class_description))
            LEFT JOIN pending pen ON pen.class_key = lower(trim(c.class_description))
            ORDER BY c.class_id
            "#
        );

        let rows = sqlx::query_as::<_, ClassBreakdown>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Students with a positive total pending amount and an email address.
    pub async fn reminder_targets(&self) -> DbResult<Vec<ReminderTarget>> {
        let sql = format!(
            r#"
            WITH pairs AS ({PAIR_PENDING})
            SELECT student_id, student_name, email, class_description,
                   SUM(pending_cents) AS pending_cents
            FROM pairs
            WHERE pending_cents > 0
              AND trim(email) <> ''
            GROUP BY student_id
            ORDER BY student_id
            "#
        );

        let rows = sqlx::query_as::<_, ReminderTarget>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Reminder targets");
        Ok(rows)
    }
}
