//! # Class Repository
//!
//! Read access to the class list, plus insert for the seed tool and tests.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bursar_core::Class;

/// Repository for class reference data.
#[derive(Debug, Clone)]
pub struct ClassRepository {
    pool: SqlitePool,
}

impl ClassRepository {
    /// Creates a new ClassRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClassRepository { pool }
    }

    /// Lists all classes in insertion order.
    pub async fn list(&self) -> DbResult<Vec<Class>> {
        let classes = sqlx::query_as::<_, Class>(
            r#"
            SELECT class_id, class_name, class_description
            FROM classes
            ORDER BY class_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = classes.len(), "Listed classes");
        Ok(classes)
    }

    /// Gets a class by id.
    pub async fn get_by_id(&self, class_id: i64) -> DbResult<Option<Class>> {
        let class = sqlx::query_as::<_, Class>(
            r#"
            SELECT class_id, class_name, class_description
            FROM classes
            WHERE class_id = ?1
            "#,
        )
        .bind(class_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(class)
    }

    /// Inserts a class. The description is unique, ignoring case.
    pub async fn insert(&self, class_name: &str, class_description: &str) -> DbResult<Class> {
        debug!(class_description = %class_description, "Inserting class");

        let class = sqlx::query_as::<_, Class>(
            r#"
            INSERT INTO classes (class_name, class_description)
            VALUES (?1, ?2)
            RETURNING class_id, class_name, class_description
            "#,
        )
        .bind(class_name.trim())
        .bind(class_description.trim())
        .fetch_one(&self.pool)
        .await?;

        Ok(class)
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::test_db;
    use crate::DbError;

    #[tokio::test]
    async fn test_insert_list_get() {
        let db = test_db().await;
        let repo = db.classes();

        let five = repo.insert("5", "Class 5").await.unwrap();
        repo.insert("6", "Class 6").await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].class_description, "Class 5");

        let found = repo.get_by_id(five.class_id).await.unwrap().unwrap();
        assert_eq!(found, five);
        assert!(repo.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_description_ignores_case() {
        let db = test_db().await;
        let repo = db.classes();

        repo.insert("5", "Class 5").await.unwrap();
        let err = repo.insert("5", "CLASS 5").await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
