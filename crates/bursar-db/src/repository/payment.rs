//! # Payment Repository
//!
//! Payments, payment listings and receipt lookups.
//!
//! ## Receipt Numbering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    UPDATE receipt_sequence                    ◄── takes the write lock  │
//! │       SET last_value = MAX(last_value, max REC suffix in payments) + 1 │
//! │       RETURNING last_value                     → 8                     │
//! │    fee exists?      no → NotFound (rollback, sequence untouched)       │
//! │    student exists?  no → NotFound (rollback, sequence untouched)       │
//! │    INSERT INTO payments (..., 'REC000008')     UNIQUE receipt_number   │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Two concurrent submissions: the second UPDATE waits on the lock       │
//! │  (busy_timeout), then reads 8 and returns 9.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use bursar_core::{FeeKind, NewPayment, PaymentRecord, ReceiptDetails, ReceiptNumber, StudentPayment};

const RECORD_SELECT: &str = r#"
    SELECT p.payment_id, p.fee_id, p.student_id, p.payment_date, p.payment_mode,
           p.amount_paid_cents, p.receipt_number,
           s.name AS student_name, s.class_description, s.contact_info,
           f.fee_type
    FROM payments p
    JOIN students s ON s.student_id = p.student_id
    JOIN fees f ON f.fee_id = p.fee_id
"#;

const RECEIPT_SELECT: &str = r#"
    SELECT p.payment_id, p.receipt_number, p.payment_date, p.payment_mode,
           p.amount_paid_cents, f.fee_type, f.total_amount_cents,
           s.name AS student_name, s.class_description
    FROM payments p
    JOIN fees f ON f.fee_id = p.fee_id
    JOIN students s ON s.student_id = p.student_id
"#;

/// Id and receipt number of a freshly recorded payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPayment {
    pub payment_id: i64,
    pub receipt_number: ReceiptNumber,
}

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Lists every payment, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<PaymentRecord>> {
        let sql = format!("{RECORD_SELECT} ORDER BY p.payment_date DESC, p.payment_id DESC");

        let payments = sqlx::query_as::<_, PaymentRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = payments.len(), "Listed payments");
        Ok(payments)
    }

    /// Lists payments dated on the given day.
    pub async fn list_for_date(&self, date: NaiveDate) -> DbResult<Vec<PaymentRecord>> {
        let sql = format!("{RECORD_SELECT} WHERE p.payment_date = ?1 ORDER BY p.payment_id");

        let payments = sqlx::query_as::<_, PaymentRecord>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        debug!(%date, count = payments.len(), "Listed payments for date");
        Ok(payments)
    }

    /// Lists one student's payments with the fee category resolved.
    pub async fn list_for_student(&self, student_id: i64) -> DbResult<Vec<StudentPayment>> {
        let mut payments = sqlx::query_as::<_, StudentPayment>(
            r#"
            SELECT p.payment_id, p.receipt_number, p.payment_date, p.payment_mode,
                   p.amount_paid_cents, f.fee_type, f.total_amount_cents
            FROM payments p
            JOIN fees f ON f.fee_id = p.fee_id
            WHERE p.student_id = ?1
            ORDER BY p.payment_date, p.payment_id
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        for payment in &mut payments {
            payment.fee_category = FeeKind::classify(&payment.fee_type);
        }

        Ok(payments)
    }

    /// Records a payment and assigns its receipt number.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - the fee or the student does not exist
    pub async fn create(&self, payment: &NewPayment) -> DbResult<CreatedPayment> {
        let mut tx = self.pool.begin().await?;

        // Write first, so the transaction holds the write lock before it reads.
        let sequence = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE receipt_sequence
            SET last_value = MAX(
                last_value,
                (SELECT COALESCE(MAX(CAST(SUBSTR(receipt_number, 4) AS INTEGER)), 0)
                 FROM payments
                 WHERE receipt_number LIKE 'REC%')
            ) + 1
            WHERE id = 1
            RETURNING last_value
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let fee_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM fees WHERE fee_id = ?1)",
        )
        .bind(payment.fee_id)
        .fetch_one(&mut *tx)
        .await?;
        if !fee_exists {
            return Err(DbError::not_found("Fee", payment.fee_id));
        }

        let student_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM students WHERE student_id = ?1)",
        )
        .bind(payment.student_id)
        .fetch_one(&mut *tx)
        .await?;
        if !student_exists {
            return Err(DbError::not_found("Student", payment.student_id));
        }

        let sequence = u64::try_from(sequence)
            .map_err(|_| DbError::Internal(format!("negative receipt sequence {sequence}")))?;
        let receipt_number = ReceiptNumber::from_sequence(sequence)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        let payment_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO payments (
                fee_id, student_id, payment_date, payment_mode,
                amount_paid_cents, receipt_number
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING payment_id
            "#,
        )
        .bind(payment.fee_id)
        .bind(payment.student_id)
        .bind(payment.payment_date)
        .bind(&payment.payment_mode)
        .bind(payment.amount_paid.cents())
        .bind(receipt_number.to_string())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            payment_id,
            receipt_number = %receipt_number,
            student_id = payment.student_id,
            amount = %payment.amount_paid,
            "Payment recorded"
        );

        Ok(CreatedPayment {
            payment_id,
            receipt_number,
        })
    }

    /// Loads what a receipt shows, by receipt number.
    pub async fn receipt_by_number(
        &self,
        receipt_number: &ReceiptNumber,
    ) -> DbResult<Option<ReceiptDetails>> {
        let sql = format!("{RECEIPT_SELECT} WHERE p.receipt_number = ?1");

        let receipt = sqlx::query_as::<_, ReceiptDetails>(&sql)
            .bind(receipt_number.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(receipt)
    }

    /// Loads what a receipt shows, by payment id.
    pub async fn receipt_by_payment_id(&self, payment_id: i64) -> DbResult<Option<ReceiptDetails>> {
        let sql = format!("{RECEIPT_SELECT} WHERE p.payment_id = ?1");

        let receipt = sqlx::query_as::<_, ReceiptDetails>(&sql)
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{fee, payment, student, test_db};
    use crate::{Database, DbConfig};
    use std::collections::HashSet;

    async fn fixture(db: &Database) -> (i64, i64) {
        let student_id = db.students().insert(&student("Asha", "Class 5")).await.unwrap();
        let fee_id = db.fees().insert(&fee("Class 5", "Annual Fee", 500_000)).await.unwrap();
        (fee_id, student_id)
    }

    #[tokio::test]
    async fn test_first_receipt_number() {
        let db = test_db().await;
        let (fee_id, student_id) = fixture(&db).await;

        let created = db
            .payments()
            .create(&payment(fee_id, student_id, "2024-04-01", 100_000))
            .await
            .unwrap();
        assert_eq!(created.receipt_number.to_string(), "REC000001");

        let second = db
            .payments()
            .create(&payment(fee_id, student_id, "2024-04-02", 100_000))
            .await
            .unwrap();
        assert_eq!(second.receipt_number.to_string(), "REC000002");
    }

    #[tokio::test]
    async fn test_receipt_continues_after_imported_rows() {
        let db = test_db().await;
        let (fee_id, student_id) = fixture(&db).await;

        sqlx::query(
            r#"
            INSERT INTO payments (fee_id, student_id, payment_date, payment_mode,
                                  amount_paid_cents, receipt_number)
            VALUES (?1, ?2, '2024-03-01', 'Cash', 500, 'REC000007')
            "#,
        )
        .bind(fee_id)
        .bind(student_id)
        .execute(db.pool())
        .await
        .unwrap();

        let created = db
            .payments()
            .create(&payment(fee_id, student_id, "2024-04-01", 500))
            .await
            .unwrap();
        assert_eq!(created.receipt_number.to_string(), "REC000008");
    }

    #[tokio::test]
    async fn test_missing_references_are_not_found() {
        let db = test_db().await;
        let (fee_id, student_id) = fixture(&db).await;

        let err = db
            .payments()
            .create(&payment(fee_id + 50, student_id, "2024-04-01", 500))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Fee"));

        let err = db
            .payments()
            .create(&payment(fee_id, student_id + 50, "2024-04-01", 500))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Student"));

        // Rolled back: the failed attempts did not consume receipt numbers.
        let created = db
            .payments()
            .create(&payment(fee_id, student_id, "2024-04-01", 500))
            .await
            .unwrap();
        assert_eq!(created.receipt_number.to_string(), "REC000001");
    }

    #[tokio::test]
    async fn test_listings() {
        let db = test_db().await;
        let (annual_id, student_id) = fixture(&db).await;
        let monthly_id = db.fees().insert(&fee("Class 5", "Monthly Fee", 50_000)).await.unwrap();
        let bus_id = db.fees().insert(&fee("Class 5", "Bus Fee", 10_000)).await.unwrap();

        let repo = db.payments();
        repo.create(&payment(annual_id, student_id, "2024-04-01", 100_000)).await.unwrap();
        repo.create(&payment(monthly_id, student_id, "2024-04-02", 50_000)).await.unwrap();
        repo.create(&payment(bus_id, student_id, "2024-04-02", 10_000)).await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].payment_date.to_string(), "2024-04-02");
        assert_eq!(all[0].student_name, "Asha");

        let day = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        assert_eq!(repo.list_for_date(day).await.unwrap().len(), 2);

        let mine = repo.list_for_student(student_id).await.unwrap();
        let categories: Vec<FeeKind> = mine.iter().map(|p| p.fee_category).collect();
        assert_eq!(categories, vec![FeeKind::Annual, FeeKind::Monthly, FeeKind::Other]);

        assert!(repo.list_for_student(student_id + 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_receipt_lookup() {
        let db = test_db().await;
        let (fee_id, student_id) = fixture(&db).await;
        let created = db
            .payments()
            .create(&payment(fee_id, student_id, "2024-04-01", 123_450))
            .await
            .unwrap();

        let by_number = db
            .payments()
            .receipt_by_number(&created.receipt_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_number.student_name, "Asha");
        assert_eq!(by_number.fee_type, "Annual Fee");
        assert_eq!(by_number.amount_paid().to_string(), "1234.50");

        let by_id = db
            .payments()
            .receipt_by_payment_id(created.payment_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_id, by_number);

        let missing = ReceiptNumber::parse("REC000099").unwrap();
        assert!(db.payments().receipt_by_number(&missing).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_payments_get_distinct_receipts() {
        let path = std::env::temp_dir().join(format!("bursar-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(
            DbConfig::new(&path)
                .max_connections(8)
                .busy_timeout(std::time::Duration::from_secs(30)),
        )
        .await
        .unwrap();
        let (fee_id, student_id) = fixture(&db).await;

        let mut handles = Vec::new();
        for i in 0..24 {
            let repo = db.payments();
            handles.push(tokio::spawn(async move {
                repo.create(&payment(fee_id, student_id, "2024-04-01", 100 + i))
                    .await
                    .unwrap()
                    .receipt_number
            }));
        }

        let mut receipts = HashSet::new();
        for handle in handles {
            receipts.insert(handle.await.unwrap().to_string());
        }

        assert_eq!(receipts.len(), 24);
        for seq in 1..=24u64 {
            let expected = ReceiptNumber::from_sequence(seq).unwrap().to_string();
            assert!(receipts.contains(&expected), "missing {expected}");
        }

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }
}
