//! # Fee Repository
//!
//! Fee definitions: one amount per (class, fee type), unique ignoring case.
//! Lookups by class and type trim and ignore case on both sides.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use bursar_core::{Fee, Money, NewFee};

/// Repository for fee database operations.
#[derive(Debug, Clone)]
pub struct FeeRepository {
    pool: SqlitePool,
}

impl FeeRepository {
    /// Creates a new FeeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FeeRepository { pool }
    }

    /// Lists all fees grouped by class.
    pub async fn list(&self) -> DbResult<Vec<Fee>> {
        let fees = sqlx::query_as::<_, Fee>(
            r#"
            SELECT fee_id, class_description, fee_type, total_amount_cents
            FROM fees
            ORDER BY class_description, fee_type
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(fees)
    }

    /// Gets a fee by id.
    pub async fn get_by_id(&self, fee_id: i64) -> DbResult<Option<Fee>> {
        let fee = sqlx::query_as::<_, Fee>(
            r#"
            SELECT fee_id, class_description, fee_type, total_amount_cents
            FROM fees
            WHERE fee_id = ?1
            "#,
        )
        .bind(fee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fee)
    }

    /// Defines a fee and returns its id.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - the class already has a fee of this type
    pub async fn insert(&self, fee: &NewFee) -> DbResult<i64> {
        debug!(
            class = %fee.class_description,
            fee_type = %fee.fee_type,
            "Inserting fee"
        );

        let fee_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO fees (class_description, fee_type, total_amount_cents)
            VALUES (?1, ?2, ?3)
            RETURNING fee_id
            "#,
        )
        .bind(&fee.class_description)
        .bind(&fee.fee_type)
        .bind(fee.total_amount.cents())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate(
                "fee",
                format!("{} / {}", fee.class_description, fee.fee_type),
            ),
            other => other,
        })?;

        info!(fee_id, "Fee added");
        Ok(fee_id)
    }

    /// Finds the fee for a class and type.
    pub async fn find(&self, class_description: &str, fee_type: &str) -> DbResult<Option<Fee>> {
        let fee = sqlx::query_as::<_, Fee>(
            r#"
            SELECT fee_id, class_description, fee_type, total_amount_cents
            FROM fees
            WHERE lower(trim(class_description)) = lower(trim(?1))
              AND lower(trim(fee_type)) = lower(trim(?2))
            LIMIT 1
            "#,
        )
        .bind(class_description)
        .bind(fee_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fee)
    }

    /// Resolves the id of the fee for a class and type.
    pub async fn resolve_id(&self, class_description: &str, fee_type: &str) -> DbResult<Option<i64>> {
        Ok(self
            .find(class_description, fee_type)
            .await?
            .map(|fee| fee.fee_id))
    }

    /// Changes the amount of an existing fee.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no fee for this class and type
    pub async fn update_amount(
        &self,
        class_description: &str,
        fee_type: &str,
        amount: Money,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE fees
            SET total_amount_cents = ?3
            WHERE lower(trim(class_description)) = lower(trim(?1))
              AND lower(trim(fee_type)) = lower(trim(?2))
            "#,
        )
        .bind(class_description)
        .bind(fee_type)
        .bind(amount.cents())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "Fee",
                format!("{class_description} / {fee_type}"),
            ));
        }

        info!(class = %class_description, fee_type = %fee_type, amount = %amount, "Fee updated");
        Ok(())
    }

    /// Deletes the fee for a class and type.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no fee for this class and type
    /// * `DbError::ForeignKeyViolation` - payments were made against the fee
    pub async fn delete(&self, class_description: &str, fee_type: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM fees
            WHERE lower(trim(class_description)) = lower(trim(?1))
              AND lower(trim(fee_type)) = lower(trim(?2))
            "#,
        )
        .bind(class_description)
        .bind(fee_type)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "Fee",
                format!("{class_description} / {fee_type}"),
            ));
        }

        info!(class = %class_description, fee_type = %fee_type, "Fee deleted");
        Ok(())
    }

    /// Distinct fee type labels, alphabetically.
    pub async fn distinct_types(&self) -> DbResult<Vec<String>> {
        let types = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT fee_type FROM fees ORDER BY fee_type",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(types)
    }
}
