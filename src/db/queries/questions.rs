use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty
FROM questions
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty
FROM questions
WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty
FROM questions
WHERE questions.category = ?1
ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

/// Questions whose text contains `term`. Relies on `case_sensitive_like`
/// being enabled on the connection; `%` and `_` inside `term` stay wildcards.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty
FROM questions
WHERE questions.question LIKE '%' || ?1 || '%'
ORDER BY id
        "#,
    )
    .bind(term)
    .fetch_all(pool)
    .await
}

/// Missing columns are bound as NULL and rejected by the schema.
pub async fn create_question(
    pool: &SqlitePool,
    question: &str,
    answer: Option<&str>,
    category: Option<i64>,
    difficulty: Option<i64>,
) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(question)
    .bind(answer)
    .bind(category)
    .bind(difficulty)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Returns `false` when no row had that id.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    let affected = sqlx::query(
        r#"
DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();
    Ok(affected > 0)
}

pub async fn import_questions(
    conn: &mut SqliteConnection,
    questions: Vec<Question>,
) -> sqlx::Result<()> {
    for question in questions {
        sqlx::query(
            r#"
INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (id) DO UPDATE SET
    question = excluded.question,
    answer = excluded.answer,
    category = excluded.category,
    difficulty = excluded.difficulty
            "#,
        )
        .bind(question.id)
        .bind(question.question)
        .bind(question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_in_memory, run_migrations};

    async fn pool_with(questions: &[(&str, &str, i64)]) -> SqlitePool {
        let pool = establish_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        for (question, answer, category) in questions {
            create_question(&pool, question, Some(*answer), Some(*category), Some(1))
                .await
                .unwrap();
        }
        pool
    }

    #[tokio::test]
    async fn create_then_fetch() {
        let pool = pool_with(&[]).await;
        let id = create_question(&pool, "Who painted the Mona Lisa?", Some("Da Vinci"), Some(2), Some(3))
            .await
            .unwrap();

        let question = get_question_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(question.question, "Who painted the Mona Lisa?");
        assert_eq!(question.category, 2);
        assert_eq!(question.difficulty, 3);
    }

    #[tokio::test]
    async fn create_without_answer_fails() {
        let pool = pool_with(&[]).await;
        let result = create_question(&pool, "Orphan question", None, Some(1), Some(1)).await;
        assert!(result.is_err());
        assert!(get_all_questions(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_missing_rows() {
        let pool = pool_with(&[("What is H2O?", "Water", 1)]).await;
        let id = get_all_questions(&pool).await.unwrap()[0].id;

        assert!(delete_question(&pool, id).await.unwrap());
        assert!(!delete_question(&pool, id).await.unwrap());
        assert!(get_question_by_id(&pool, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_is_case_sensitive_substring() {
        let pool = pool_with(&[
            ("Which is the longest river, the Nile?", "Yes", 3),
            ("Is the nile wet?", "Yes", 3),
            ("What is the capital of France?", "Paris", 3),
        ])
        .await;

        let found = search_questions(&pool, "Nile").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].question.contains("Nile"));

        assert_eq!(search_questions(&pool, "").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn filter_by_category() {
        let pool = pool_with(&[
            ("Q1", "A1", 1),
            ("Q2", "A2", 4),
            ("Q3", "A3", 1),
        ])
        .await;

        let science = get_questions_for_category(&pool, 1).await.unwrap();
        assert_eq!(science.len(), 2);
        assert!(science.iter().all(|q| q.category == 1));
        assert!(get_questions_for_category(&pool, 6).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn import_keeps_ids() {
        let pool = pool_with(&[("Old", "Old", 1)]).await;
        let mut tx = pool.begin().await.unwrap();
        import_questions(
            &mut tx,
            vec![
                Question {
                    id: 1,
                    question: "New".to_owned(),
                    answer: "New".to_owned(),
                    category: 2,
                    difficulty: 4,
                },
                Question {
                    id: 42,
                    question: "Forty two".to_owned(),
                    answer: "Yes".to_owned(),
                    category: 5,
                    difficulty: 1,
                },
            ],
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let questions = get_all_questions(&pool).await.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question, "New");
        assert_eq!(questions[1].id, 42);
    }
}
