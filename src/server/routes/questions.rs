use std::collections::BTreeMap;

use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        NewQuestion, Question,
    },
    server::{
        app::AppState,
        error::{ApiError, StoreResultExt},
        extract::{ApiJson, ApiPath, ApiQuery},
        pagination::Pagination,
    },
};

use super::ApiResponse;

#[derive(Deserialize, Debug)]
struct CreateQuestion {
    question: String,
    answer: String,
    // the trivia frontend posts numbers as strings
    #[serde(deserialize_with = "deserialize_number_from_string")]
    difficulty: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    category: i64,
}

impl From<CreateQuestion> for NewQuestion {
    fn from(value: CreateQuestion) -> Self {
        NewQuestion {
            question: value.question,
            answer: value.answer,
            difficulty: value.difficulty,
            category: value.category,
        }
    }
}

#[derive(Deserialize, Debug)]
struct SearchRequest {
    #[serde(rename = "searchTerm")]
    search_term: String,
}

impl SearchRequest {
    fn validated_term(&self) -> Result<&str, ApiError> {
        if self.search_term.trim().is_empty() {
            return Err(ApiError::Validation {
                field: "searchTerm",
                reason: "must not be blank".to_owned(),
            });
        }
        Ok(&self.search_term)
    }
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
struct QuestionCreated {
    success: bool,
    created: i64,
    question: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
struct QuestionDeleted {
    success: bool,
    deleted: i64,
    question: Vec<Question>,
    total_questions: i64,
}

async fn page_with_total(
    pool: &SqlitePool,
    pagination: Pagination,
) -> sqlx::Result<(Vec<Question>, i64)> {
    let page =
        questions::get_questions_page(pool, pagination.limit(), pagination.offset()).await?;
    let total = questions::count_questions(pool).await?;
    Ok((page, total))
}

async fn get_questions(
    State(pool): State<SqlitePool>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResponse<QuestionsPage> {
    let (page, total_questions) = page_with_total(&pool, pagination).await.or_not_found()?;
    if page.is_empty() {
        return Err(ApiError::NotFound(format!(
            "page {} of questions",
            pagination.page
        )));
    }
    let categories = categories::get_category_labels(&pool)
        .await
        .or_not_found()?;

    Ok(Json(QuestionsPage {
        success: true,
        questions: page,
        total_questions,
        categories,
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    ApiQuery(pagination): ApiQuery<Pagination>,
    ApiJson(body): ApiJson<CreateQuestion>,
) -> ApiResponse<QuestionCreated> {
    let created = questions::create_question(&pool, &body.into())
        .await
        .or_unprocessable()?;
    tracing::info!("Created question {created}");
    let (page, total_questions) = page_with_total(&pool, pagination)
        .await
        .or_unprocessable()?;

    Ok(Json(QuestionCreated {
        success: true,
        created,
        question: page,
        total_questions,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResponse<QuestionDeleted> {
    questions::delete_question(&pool, id)
        .await
        .or_unprocessable()?;
    tracing::info!("Deleted question {id}");
    let (page, total_questions) = page_with_total(&pool, pagination)
        .await
        .or_unprocessable()?;

    Ok(Json(QuestionDeleted {
        success: true,
        deleted: id,
        question: page,
        total_questions,
    }))
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    ApiQuery(pagination): ApiQuery<Pagination>,
    ApiJson(body): ApiJson<SearchRequest>,
) -> ApiResponse<SearchResults> {
    let term = body.validated_term()?;
    let found = questions::search_questions(&pool, term)
        .await
        .or_unprocessable()?;
    let total_questions = found.len();

    Ok(Json(SearchResults {
        success: true,
        questions: pagination.slice(found),
        total_questions,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(get_questions).post(create_question))
        .route("/questions/{id}", delete(delete_question))
        .route("/search", post(search_questions))
        .with_state(state)
}
