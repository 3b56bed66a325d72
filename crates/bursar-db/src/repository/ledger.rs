//! # Ledger Repository
//!
//! Fetches the rows behind a student's annual and monthly balances and hands
//! them to `bursar_core::ledger` for the arithmetic.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bursar_core::ledger::{self, LedgerPayment};
use bursar_core::{AnnualBalance, Money, MonthlyBreakdown, OverflowPolicy, ANNUAL_FEE, MONTHLY_FEE};

/// Repository for balance queries.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Annual fee position of a student.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no student with this id
    pub async fn annual_balance(&self, student_id: i64) -> DbResult<AnnualBalance> {
        let class = self.student_class(student_id).await?;

        let due = self.class_fee(&class, ANNUAL_FEE).await?;

        let paid = sqlx::query_scalar::<_, Option<i64>>(
            r#"
            SELECT SUM(p.amount_paid_cents)
            FROM payments p
            JOIN fees f ON f.fee_id = p.fee_id
            WHERE p.student_id = ?1
              AND lower(trim(f.fee_type)) = lower(?2)
            "#,
        )
        .bind(student_id)
        .bind(ANNUAL_FEE)
        .fetch_one(&self.pool)
        .await?
        .map(Money::from_cents);

        debug!(student_id, due = ?due, paid = ?paid, "Annual balance inputs");
        Ok(ledger::annual_balance(due, paid))
    }

    /// Month-by-month allocation of a student's Monthly-Fee payments.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no student with this id
    pub async fn monthly_breakdown(
        &self,
        student_id: i64,
        policy: OverflowPolicy,
    ) -> DbResult<MonthlyBreakdown> {
        let class = self.student_class(student_id).await?;

        let monthly_due = self.class_fee(&class, MONTHLY_FEE).await?;

        let payments = sqlx::query_as::<_, LedgerPayment>(
            r#"
            SELECT p.payment_id, p.payment_date, p.amount_paid_cents
            FROM payments p
            JOIN fees f ON f.fee_id = p.fee_id
            WHERE p.student_id = ?1
              AND lower(trim(f.fee_type)) = lower(?2)
            ORDER BY p.payment_date, p.payment_id
            "#,
        )
        .bind(student_id)
        .bind(MONTHLY_FEE)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            student_id,
            monthly_due = ?monthly_due,
            payments = payments.len(),
            "Monthly breakdown inputs"
        );
        Ok(ledger::allocate_monthly(monthly_due, &payments, policy))
    }

    async fn student_class(&self, student_id: i64) -> DbResult<String> {
        sqlx::query_scalar::<_, String>(
            "SELECT class_description FROM students WHERE student_id = ?1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Student", student_id))
    }

    async fn class_fee(&self, class_description: &str, fee_type: &str) -> DbResult<Option<Money>> {
        let cents = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT total_amount_cents
            FROM fees
            WHERE lower(trim(class_description)) = lower(trim(?1))
              AND lower(trim(fee_type)) = lower(?2)
            ORDER BY fee_id
            LIMIT 1
            "#,
        )
        .bind(class_description)
        .bind(fee_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cents.map(Money::from_cents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{fee, payment, student, test_db};

    #[tokio::test]
    async fn test_annual_balance() {
        let db = test_db().await;
        let student_id = db.students().insert(&student("Asha", "Class 5")).await.unwrap();
        let annual = db.fees().insert(&fee("Class 5", "Annual Fee", 500_000)).await.unwrap();
        let bus = db.fees().insert(&fee("Class 5", "Bus Fee", 90_000)).await.unwrap();

        let repo = db.payments();
        repo.create(&payment(annual, student_id, "2024-04-01", 200_000)).await.unwrap();
        repo.create(&payment(annual, student_id, "2024-05-01", 100_000)).await.unwrap();
        repo.create(&payment(bus, student_id, "2024-05-01", 90_000)).await.unwrap();

        let balance = db.ledger().annual_balance(student_id).await.unwrap();
        assert_eq!(balance.total_due.cents(), 500_000);
        assert_eq!(balance.total_paid.cents(), 300_000);
        assert_eq!(balance.balance_display(), "2000.00");
    }

    #[tokio::test]
    async fn test_annual_balance_without_fee_or_payments() {
        let db = test_db().await;
        let student_id = db.students().insert(&student("Asha", "Class 5")).await.unwrap();

        let balance = db.ledger().annual_balance(student_id).await.unwrap();
        assert!(balance.total_due.is_zero());
        assert!(balance.total_paid.is_zero());
        assert_eq!(balance.balance_display(), "0.00");
    }

    #[tokio::test]
    async fn test_unknown_student_is_not_found() {
        let db = test_db().await;

        let err = db.ledger().annual_balance(42).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = db
            .ledger()
            .monthly_breakdown(42, OverflowPolicy::Surface)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_monthly_breakdown_in_date_order() {
        let db = test_db().await;
        let student_id = db.students().insert(&student("Asha", "Class 5")).await.unwrap();
        let monthly = db.fees().insert(&fee("class 5 ", "Monthly Fee", 50_000)).await.unwrap();

        // Recorded out of order; the earlier date is applied first.
        let repo = db.payments();
        repo.create(&payment(monthly, student_id, "2024-05-01", 30_000)).await.unwrap();
        repo.create(&payment(monthly, student_id, "2024-04-01", 30_000)).await.unwrap();

        let breakdown = db
            .ledger()
            .monthly_breakdown(student_id, OverflowPolicy::Surface)
            .await
            .unwrap();

        assert_eq!(breakdown.months.len(), 12);
        assert_eq!(breakdown.months[0].paid.cents(), 50_000);
        assert_eq!(breakdown.months[0].balance.cents(), 0);
        assert_eq!(breakdown.months[1].paid.cents(), 10_000);
        assert_eq!(breakdown.months[1].balance.cents(), 40_000);
        assert!(breakdown.months[2].paid.is_zero());
        assert!(breakdown.unapplied.is_zero());
    }

    #[tokio::test]
    async fn test_monthly_overflow_follows_policy() {
        let db = test_db().await;
        let student_id = db.students().insert(&student("Asha", "Class 5")).await.unwrap();
        let monthly = db.fees().insert(&fee("Class 5", "Monthly Fee", 1_000)).await.unwrap();
        db.payments()
            .create(&payment(monthly, student_id, "2024-04-01", 12_500))
            .await
            .unwrap();

        let surfaced = db
            .ledger()
            .monthly_breakdown(student_id, OverflowPolicy::Surface)
            .await
            .unwrap();
        assert_eq!(surfaced.unapplied.cents(), 500);

        let discarded = db
            .ledger()
            .monthly_breakdown(student_id, OverflowPolicy::Discard)
            .await
            .unwrap();
        assert!(discarded.unapplied.is_zero());
        assert_eq!(discarded.total_paid().cents(), 12_000);
    }
}
