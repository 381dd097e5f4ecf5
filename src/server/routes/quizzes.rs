use axum::{extract::State, routing::post, Json, Router};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        Question, StoreError,
    },
    server::{
        app::AppState,
        error::{unprocessable, ApiError, StoreResultExt},
        extract::ApiJson,
    },
    telemetry::record_quiz_question,
};

use super::ApiResponse;

/// Category id that lifts the category restriction.
const ALL_CATEGORIES: i64 = 0;

#[derive(Deserialize, Debug)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

impl QuizCategory {
    fn restriction(&self) -> Option<i64> {
        (self.id != ALL_CATEGORIES).then_some(self.id)
    }
}

#[derive(Deserialize, Debug)]
struct QuizRequest {
    quiz_category: QuizCategory,
    previous_questions: Vec<i64>,
}

#[derive(Serialize)]
struct NextQuestion {
    success: bool,
    /// `None` once every eligible question has been served
    question: Option<Question>,
}

async fn next_question(
    State(pool): State<SqlitePool>,
    ApiJson(body): ApiJson<QuizRequest>,
) -> ApiResponse<NextQuestion> {
    let category = body.quiz_category.restriction();
    if let Some(id) = category {
        match categories::get_category(&pool, id).await {
            Ok(_) => {}
            // an unknown category is a 400, never an empty quiz
            Err(StoreError::NotFound { .. }) => {
                return Err(ApiError::BadRequest(format!("unknown quiz category {id}")))
            }
            Err(err) => return Err(unprocessable(err)),
        }
    }

    let candidates = questions::get_unserved_questions(&pool, category, &body.previous_questions)
        .await
        .or_unprocessable()?;
    let question = candidates.choose(&mut rand::thread_rng()).cloned();
    match &question {
        Some(question) => {
            record_quiz_question(category);
            tracing::debug!(
                "Serving question {} out of {} candidates",
                question.id,
                candidates.len()
            );
        }
        None => tracing::debug!("Quiz exhausted for category {category:?}"),
    }

    Ok(Json(NextQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .with_state(state)
}
