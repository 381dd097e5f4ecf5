use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::{StoreError, StoreResult};

#[derive(Serialize, Deserialize, sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub difficulty: i64,
    pub category: i64,
}

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_questions_page(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        ORDER BY id LIMIT ?1 OFFSET ?2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_questions(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM questions
        "#,
    )
    .fetch_one(pool)
    .await
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> StoreResult<Question> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(StoreError::NotFound {
        entity: "question",
        id,
    })
}

pub async fn create_question(pool: &SqlitePool, new_question: &NewQuestion) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, difficulty, category) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&new_question.question)
    .bind(&new_question.answer)
    .bind(new_question.difficulty)
    .bind(new_question.category)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn delete_question(pool: &SqlitePool, id: i64) -> StoreResult<()> {
    let deleted = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if deleted == 0 {
        return Err(StoreError::NotFound {
            entity: "question",
            id,
        });
    }
    Ok(())
}

/// Questions whose text contains `term`, ignoring case. The term is matched
/// literally, `%` and `_` carry no wildcard meaning.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    // SQLite's lower() only folds ASCII, so matching happens here
    let term = term.to_lowercase();
    let mut found = get_all_questions(pool).await?;
    found.retain(|q| q.question.to_lowercase().contains(&term));
    Ok(found)
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE questions.category = ?1
        ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

/// Questions not yet served in a quiz, optionally restricted to one category.
pub async fn get_unserved_questions(
    pool: &SqlitePool,
    category: Option<i64>,
    previous: &[i64],
) -> sqlx::Result<Vec<Question>> {
    let mut candidates = match category {
        Some(category) => get_questions_for_category(pool, category).await?,
        None => get_all_questions(pool).await?,
    };
    // Served ids stay out of the SQL, a long quiz would exceed the bind limit
    let served: HashSet<i64> = previous.iter().copied().collect();
    candidates.retain(|q| !served.contains(&q.id));
    Ok(candidates)
}

pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for question in questions {
        sqlx::query(
            r#"
            INSERT INTO questions (id, question, answer, difficulty, category)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                question = excluded.question,
                answer = excluded.answer,
                difficulty = excluded.difficulty,
                category = excluded.category
            "#,
        )
        .bind(question.id)
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.difficulty)
        .bind(question.category)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::memory_pool;

    fn new_question(text: &str, category: i64) -> NewQuestion {
        NewQuestion {
            question: text.to_owned(),
            answer: "answer".to_owned(),
            difficulty: 1,
            category,
        }
    }

    #[tokio::test]
    async fn create_then_fetch_by_id() {
        let pool = memory_pool().await;
        let id = create_question(&pool, &new_question("What is the capital of Peru?", 3))
            .await
            .unwrap();

        let question = get_question_by_id(&pool, id).await.unwrap();
        assert_eq!(question.question, "What is the capital of Peru?");
        assert_eq!(question.category, 3);
        assert_eq!(count_questions(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_missing_question_is_not_found() {
        let pool = memory_pool().await;
        let err = delete_question(&pool, 666).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 666, .. }));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_literal() {
        let pool = memory_pool().await;
        create_question(&pool, &new_question("Whose autobiography is Tim Burton's?", 5))
            .await
            .unwrap();
        create_question(&pool, &new_question("What is 50% of 10?", 1))
            .await
            .unwrap();
        create_question(&pool, &new_question("Which planet is largest?", 1))
            .await
            .unwrap();

        let found = search_questions(&pool, "burton").await.unwrap();
        assert_eq!(found.len(), 1);

        let found = search_questions(&pool, "%").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].question, "What is 50% of 10?");
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let pool = memory_pool().await;
        create_question(&pool, &new_question("Who painted ÉCOLE d'Athènes?", 2))
            .await
            .unwrap();
        create_question(&pool, &new_question("Which city hosts the Louvre?", 3))
            .await
            .unwrap();

        let found = search_questions(&pool, "école").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].question, "Who painted ÉCOLE d'Athènes?");

        let found = search_questions(&pool, "ATHÈNES").await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn page_window_is_ordered_by_id() {
        let pool = memory_pool().await;
        for n in 0..12 {
            create_question(&pool, &new_question(&format!("question {n}"), 1))
                .await
                .unwrap();
        }
        let page = get_questions_page(&pool, 10, 10).await.unwrap();
        let texts: Vec<&str> = page.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(texts, ["question 10", "question 11"]);
    }

    #[tokio::test]
    async fn unserved_questions_skip_previous_and_other_categories() {
        let pool = memory_pool().await;
        let mut sports = vec![];
        for n in 0..3 {
            sports.push(
                create_question(&pool, &new_question(&format!("sports {n}"), 6))
                    .await
                    .unwrap(),
            );
        }
        create_question(&pool, &new_question("science", 1))
            .await
            .unwrap();

        let left = get_unserved_questions(&pool, Some(6), &sports[..2])
            .await
            .unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, sports[2]);

        let everything = get_unserved_questions(&pool, None, &[]).await.unwrap();
        assert_eq!(everything.len(), 4);
    }

    #[tokio::test]
    async fn long_served_lists_do_not_hit_the_bind_limit() {
        let pool = memory_pool().await;
        let first = create_question(&pool, &new_question("first", 1))
            .await
            .unwrap();
        let second = create_question(&pool, &new_question("second", 1))
            .await
            .unwrap();

        let mut previous: Vec<i64> = (1000..41_000).collect();
        previous.push(first);
        previous.push(first);

        let left = get_unserved_questions(&pool, None, &previous).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, second);
    }
}
