use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
SELECT id, "type"
FROM categories
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Inserts or renames categories by id, leaving the others untouched.
///
/// Runs on the caller's connection so an import can share one transaction.
pub async fn import_categories(
    conn: &mut SqliteConnection,
    categories: Vec<Category>,
) -> sqlx::Result<()> {
    for category in categories {
        sqlx::query(
            r#"
INSERT INTO categories (id, "type") VALUES (?1, ?2)
ON CONFLICT (id) DO UPDATE SET "type" = excluded."type"
            "#,
        )
        .bind(category.id)
        .bind(category.kind)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
